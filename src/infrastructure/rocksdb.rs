use crate::domain::order::{Order, OrderId, RequesterId};
use crate::domain::ports::{OrderStore, SlotStore};
use crate::domain::slot::Slot;
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for the slot inventory, keyed by slot start timestamp.
pub const CF_SLOTS: &str = "slots";
/// Column Family for orders, keyed by order id.
pub const CF_ORDERS: &str = "orders";
/// Column Family for bookkeeping (the order id sequence).
pub const CF_META: &str = "meta";

const ORDER_SEQ_KEY: &[u8] = b"order_seq";

/// A persistent store implementation using RocksDB.
///
/// One store implements both `SlotStore` and `OrderStore`; entities live in
/// separate Column Families with JSON values and big-endian keys so iteration
/// order matches the domain's ordering (slots by start, orders by id).
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
/// Check-then-write sequences (`mark_held`, `release`, `next_id`) serialize on
/// an internal mutex so the compare-and-set contract holds at the store level.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    mutations: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring the
    /// required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_slots = ColumnFamilyDescriptor::new(CF_SLOTS, Options::default());
        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let cf_meta = ColumnFamilyDescriptor::new(CF_META, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_slots, cf_orders, cf_meta])?;

        Ok(Self {
            db: Arc::new(db),
            mutations: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| BookingError::Storage(format!("column family not found: {name}")))
    }

    fn load_slot(&self, start: DateTime<Utc>) -> Result<Option<Slot>> {
        let cf = self.cf(CF_SLOTS)?;
        match self.db.get_cf(cf, slot_key(start))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_slot(&self, slot: &Slot) -> Result<()> {
        let cf = self.cf(CF_SLOTS)?;
        self.db
            .put_cf(cf, slot_key(slot.start_time), serde_json::to_vec(slot)?)?;
        Ok(())
    }

    fn scan_orders(&self) -> Result<Vec<Order>> {
        let cf = self.cf(CF_ORDERS)?;
        let mut orders = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            orders.push(serde_json::from_slice(&value)?);
        }
        Ok(orders)
    }
}

fn slot_key(start: DateTime<Utc>) -> [u8; 8] {
    start.timestamp().to_be_bytes()
}

#[async_trait]
impl SlotStore for RocksDBStore {
    async fn replace_all(&self, slots: Vec<Slot>) -> Result<()> {
        let _guard = self.mutations.lock().await;
        let cf = self.cf(CF_SLOTS)?;

        let mut stale = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _value) = item?;
            stale.push(key.to_vec());
        }
        for key in stale {
            self.db.delete_cf(cf, key)?;
        }
        for slot in &slots {
            self.put_slot(slot)?;
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Slot>> {
        let cf = self.cf(CF_SLOTS)?;
        let mut slots = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            slots.push(serde_json::from_slice(&value)?);
        }
        Ok(slots)
    }

    async fn mark_held(&self, start: DateTime<Utc>, holder: &RequesterId) -> Result<()> {
        let _guard = self.mutations.lock().await;
        let mut slot = self
            .load_slot(start)?
            .ok_or(BookingError::SlotUnavailable(start))?;
        if !slot.available {
            return Err(BookingError::SlotUnavailable(start));
        }
        slot.available = false;
        slot.holder = Some(holder.clone());
        self.put_slot(&slot)
    }

    async fn release(&self, start: DateTime<Utc>) -> Result<()> {
        let _guard = self.mutations.lock().await;
        let mut slot = self
            .load_slot(start)?
            .ok_or(BookingError::SlotNotFound(start))?;
        if slot.holder.take().is_some() {
            slot.available = true;
            self.put_slot(&slot)?;
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn next_id(&self) -> Result<OrderId> {
        let _guard = self.mutations.lock().await;
        let cf = self.cf(CF_META)?;
        let current = self
            .db
            .get_cf(cf, ORDER_SEQ_KEY)?
            .and_then(|bytes| <[u8; 8]>::try_from(bytes.as_slice()).ok())
            .map(u64::from_be_bytes)
            .unwrap_or(0);
        let next = current + 1;
        self.db.put_cf(cf, ORDER_SEQ_KEY, next.to_be_bytes())?;
        Ok(OrderId(next))
    }

    async fn store(&self, order: Order) -> Result<()> {
        let cf = self.cf(CF_ORDERS)?;
        self.db
            .put_cf(cf, order.id.0.to_be_bytes(), serde_json::to_vec(&order)?)?;
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let cf = self.cf(CF_ORDERS)?;
        match self.db.get_cf(cf, id.0.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn all(&self) -> Result<Vec<Order>> {
        self.scan_orders()
    }

    async fn list_for(&self, requester: &RequesterId) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .scan_orders()?
            .into_iter()
            .filter(|order| &order.requester == requester)
            .collect();
        orders.reverse();
        Ok(orders)
    }

    async fn active_for(&self, requester: &RequesterId) -> Result<Option<Order>> {
        Ok(self
            .scan_orders()?
            .into_iter()
            .rev()
            .find(|order| &order.requester == requester && order.is_active()))
    }

    async fn due_pending(&self, now: DateTime<Utc>) -> Result<Vec<Order>> {
        Ok(self
            .scan_orders()?
            .into_iter()
            .filter(|order| order.is_due(now))
            .collect())
    }
}
