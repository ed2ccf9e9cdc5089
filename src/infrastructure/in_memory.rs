use crate::domain::order::{Order, OrderId, RequesterId};
use crate::domain::ports::{
    AvailabilitySource, Clock, OrderStore, SettingsProvider, SlotStore,
};
use crate::domain::settings::BookingSettings;
use crate::domain::slot::Slot;
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory slot inventory.
///
/// Slots are keyed by `start_time` in a `BTreeMap`, so listing comes out in
/// ascending order for free. `mark_held` checks and claims under the same
/// write lock, which makes the claim a compare-and-set across concurrent
/// callers.
#[derive(Default, Clone)]
pub struct InMemorySlotStore {
    slots: Arc<RwLock<BTreeMap<DateTime<Utc>, Slot>>>,
}

impl InMemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotStore for InMemorySlotStore {
    async fn replace_all(&self, new_slots: Vec<Slot>) -> Result<()> {
        let mut slots = self.slots.write().await;
        *slots = new_slots
            .into_iter()
            .map(|slot| (slot.start_time, slot))
            .collect();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Slot>> {
        let slots = self.slots.read().await;
        Ok(slots.values().cloned().collect())
    }

    async fn mark_held(&self, start: DateTime<Utc>, holder: &RequesterId) -> Result<()> {
        let mut slots = self.slots.write().await;
        let slot = slots
            .get_mut(&start)
            .ok_or(BookingError::SlotUnavailable(start))?;
        if !slot.available {
            return Err(BookingError::SlotUnavailable(start));
        }
        slot.available = false;
        slot.holder = Some(holder.clone());
        Ok(())
    }

    async fn release(&self, start: DateTime<Utc>) -> Result<()> {
        let mut slots = self.slots.write().await;
        let slot = slots
            .get_mut(&start)
            .ok_or(BookingError::SlotNotFound(start))?;
        // Only an actual hold is cleared; a slot blocked at generation time
        // (no holder) stays unavailable.
        if slot.holder.take().is_some() {
            slot.available = true;
        }
        Ok(())
    }
}

struct OrderState {
    orders: BTreeMap<u64, Order>,
    next_id: u64,
}

/// A thread-safe in-memory order store with a monotonic id sequence.
#[derive(Clone)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<OrderState>>,
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self {
            state: Arc::new(RwLock::new(OrderState {
                orders: BTreeMap::new(),
                next_id: 0,
            })),
        }
    }
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn next_id(&self) -> Result<OrderId> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        Ok(OrderId(state.next_id))
    }

    async fn store(&self, order: Order) -> Result<()> {
        let mut state = self.state.write().await;
        state.orders.insert(order.id.0, order);
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        Ok(state.orders.get(&id.0).cloned())
    }

    async fn all(&self) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        Ok(state.orders.values().cloned().collect())
    }

    async fn list_for(&self, requester: &RequesterId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        // Ids are monotonic, so descending id order is most-recent-first.
        Ok(state
            .orders
            .values()
            .rev()
            .filter(|order| &order.requester == requester)
            .cloned()
            .collect())
    }

    async fn active_for(&self, requester: &RequesterId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .values()
            .rev()
            .find(|order| &order.requester == requester && order.is_active())
            .cloned())
    }

    async fn due_pending(&self, now: DateTime<Utc>) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .values()
            .filter(|order| order.is_due(now))
            .cloned()
            .collect())
    }
}

/// Settings provider backed by a fixed value; the CLI wires flags into it.
#[derive(Clone)]
pub struct StaticSettings {
    settings: BookingSettings,
}

impl StaticSettings {
    pub fn new(settings: BookingSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SettingsProvider for StaticSettings {
    async fn get(&self) -> Result<BookingSettings> {
        Ok(self.settings.clone())
    }
}

/// Availability source that never blocks a slot.
#[derive(Default, Clone)]
pub struct OpenAvailability;

#[async_trait]
impl AvailabilitySource for OpenAvailability {
    async fn is_bookable(&self, _start: DateTime<Utc>) -> bool {
        true
    }
}

/// Wall-clock time.
#[derive(Default, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// An advanceable clock for deterministic tests. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<std::sync::RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(std::sync::RwLock::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        *now = *now + by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        *now = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}
