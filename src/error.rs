use crate::domain::order::{OrderId, OrderStatus};
use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BookingError>;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("no slot exists at {0}")]
    SlotNotFound(DateTime<Utc>),
    #[error("slot at {0} is unavailable")]
    SlotUnavailable(DateTime<Utc>),
    #[error("order {0} not found")]
    OrderNotFound(OrderId),
    #[error("order {id} cannot transition out of status '{status}'")]
    InvalidTransition { id: OrderId, status: OrderStatus },
    #[error("an active reservation already exists (order {0})")]
    ActiveReservationExists(OrderId),
    #[error("proof submission requires at least one proof")]
    EmptyProofSet,
    #[error("validation error: {0}")]
    Validation(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage error: {0}")]
    Storage(String),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for BookingError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
