use super::order::{Order, OrderId, RequesterId};
use super::settings::BookingSettings;
use super::slot::Slot;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Owns the rolling inventory of bookable slots.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Replaces the whole window; used when the horizon anchor advances.
    async fn replace_all(&self, slots: Vec<Slot>) -> Result<()>;

    /// Snapshot of the inventory ordered by `start_time` ascending.
    async fn list(&self) -> Result<Vec<Slot>>;

    /// Claims a slot for `holder`. Compare-and-set: exactly one concurrent
    /// caller can win a given start; everyone else gets `SlotUnavailable`.
    async fn mark_held(&self, start: DateTime<Utc>, holder: &RequesterId) -> Result<()>;

    /// Releases a held slot. `SlotNotFound` when the slot does not exist;
    /// a no-op when nothing holds it.
    async fn release(&self, start: DateTime<Utc>) -> Result<()>;
}

/// Owns order records and assigns their identifiers.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Next monotonic order id; never returned twice.
    async fn next_id(&self) -> Result<OrderId>;

    async fn store(&self, order: Order) -> Result<()>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Every order, ascending by id.
    async fn all(&self) -> Result<Vec<Order>>;

    /// A requester's orders, most recent first.
    async fn list_for(&self, requester: &RequesterId) -> Result<Vec<Order>>;

    /// The requester's non-terminal order, if one exists.
    async fn active_for(&self, requester: &RequesterId) -> Result<Option<Order>>;

    /// Pending orders whose hold deadline is at or before `now`.
    async fn due_pending(&self, now: DateTime<Utc>) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn get(&self) -> Result<BookingSettings>;
}

/// External source consulted once per slot at generation time.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    async fn is_bookable(&self, start: DateTime<Utc>) -> bool;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type SlotStoreBox = Box<dyn SlotStore>;
pub type OrderStoreBox = Box<dyn OrderStore>;
pub type SettingsProviderBox = Box<dyn SettingsProvider>;
pub type AvailabilitySourceBox = Box<dyn AvailabilitySource>;
pub type ClockBox = Box<dyn Clock>;
