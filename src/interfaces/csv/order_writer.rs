use crate::domain::order::{Money, Order, OrderId, OrderStatus, RequesterId};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Flat CSV row for the final order report; `proofs` is the proof count.
#[derive(Serialize)]
struct OrderRow<'a> {
    id: OrderId,
    requester: &'a RequesterId,
    order_no: &'a str,
    status: OrderStatus,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    amount: Money,
    proofs: usize,
}

impl<'a> From<&'a Order> for OrderRow<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            id: order.id,
            requester: &order.requester,
            order_no: &order.order_no,
            status: order.status,
            start_time: order.start_time,
            end_time: order.end_time,
            amount: order.amount,
            proofs: order.proofs.len(),
        }
    }
}

/// Writes the order book as CSV to any `Write` target.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(target: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(target),
        }
    }

    pub fn write_orders(&mut self, orders: &[Order]) -> Result<()> {
        for order in orders {
            self.writer.serialize(OrderRow::from(order))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
