use crate::domain::order::{Order, OrderId, Proof, RequesterId};
use crate::domain::ports::{
    AvailabilitySourceBox, ClockBox, OrderStoreBox, SettingsProviderBox, SlotStoreBox,
};
use crate::domain::slot::{Slot, SlotView};
use crate::domain::time;
use crate::error::{BookingError, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Forward horizon of the slot inventory, in hours.
pub const DEFAULT_HORIZON_HOURS: u32 = 72;

/// The reservation allocator and order lifecycle manager.
///
/// `BookingEngine` owns the storage ports and is shared (`Arc`) between
/// request tasks and the hold-expiry sweeper. Every mutating operation runs
/// under one mutex, so the check-then-claim sequence in `reserve` and the
/// transition-then-release sequences in `cancel`/`expire_due` are atomic with
/// respect to each other. Sub-writes are ordered so a slot is never observable
/// as free while a non-terminal order holds it: the slot is claimed before the
/// order is inserted, and a terminal order is persisted before its slot is
/// released.
pub struct BookingEngine {
    slot_store: SlotStoreBox,
    order_store: OrderStoreBox,
    settings: SettingsProviderBox,
    availability: AvailabilitySourceBox,
    clock: ClockBox,
    horizon_hours: u32,
    write_lock: Mutex<()>,
}

impl BookingEngine {
    pub fn new(
        slot_store: SlotStoreBox,
        order_store: OrderStoreBox,
        settings: SettingsProviderBox,
        availability: AvailabilitySourceBox,
        clock: ClockBox,
    ) -> Self {
        Self {
            slot_store,
            order_store,
            settings,
            availability,
            clock,
            horizon_hours: DEFAULT_HORIZON_HOURS,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_horizon(mut self, horizon_hours: u32) -> Self {
        self.horizon_hours = horizon_hours;
        self
    }

    /// Makes sure the slot inventory covers the full horizon from the next
    /// full hour. Invoked lazily by `list_slots` and `reserve`.
    pub async fn ensure_horizon(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.rebuild_window().await
    }

    /// Rebuilds the slot window when the anchor hour has advanced. Caller
    /// must hold the write lock.
    ///
    /// Existing slot records are carried over untouched; the availability
    /// source is consulted only for starts entering the window. Afterwards
    /// every start held by a live order is re-marked, reconciling the
    /// inventory against the order store rather than recomputing it.
    async fn rebuild_window(&self) -> Result<()> {
        let anchor = time::next_full_hour(self.clock.now());
        let existing = self.slot_store.list().await?;
        if existing.len() == self.horizon_hours as usize
            && existing.first().map(|slot| slot.start_time) == Some(anchor)
        {
            return Ok(());
        }

        let mut carried: BTreeMap<DateTime<Utc>, Slot> = existing
            .into_iter()
            .map(|slot| (slot.start_time, slot))
            .collect();

        let mut slots = Vec::with_capacity(self.horizon_hours as usize);
        for start in time::grid_starts(anchor, self.horizon_hours) {
            let slot = match carried.remove(&start) {
                Some(slot) => slot,
                None => Slot::new(start, self.availability.is_bookable(start).await),
            };
            slots.push(slot);
        }

        for order in self.order_store.all().await? {
            if !order.is_active() {
                continue;
            }
            if let Some(slot) = slots
                .iter_mut()
                .find(|slot| slot.start_time == order.start_time)
            {
                slot.available = false;
                slot.holder = Some(order.requester.clone());
            }
        }

        tracing::debug!(%anchor, horizon_hours = self.horizon_hours, "slot window rebuilt");
        self.slot_store.replace_all(slots).await
    }

    /// Claims the slot at `start_time` and creates a pending order for it.
    ///
    /// Fails with `ActiveReservationExists` when the requester already has a
    /// non-terminal order, and with `SlotUnavailable` when the slot is
    /// unknown or already held. Exactly one of any set of concurrent callers
    /// targeting the same slot wins.
    pub async fn reserve(&self, requester: RequesterId, start_time: DateTime<Utc>) -> Result<Order> {
        let _guard = self.write_lock.lock().await;
        self.rebuild_window().await?;

        if let Some(active) = self.order_store.active_for(&requester).await? {
            return Err(BookingError::ActiveReservationExists(active.id));
        }

        let settings = self.settings.get().await?;
        self.slot_store.mark_held(start_time, &requester).await?;

        let now = self.clock.now();
        let end_time = time::slot_end(start_time);
        let hours = (end_time - start_time).num_hours();
        let id = self.order_store.next_id().await?;
        let order = Order::new(
            id,
            requester,
            start_time,
            end_time,
            settings.price_per_hour.times(hours),
            settings.pay_qr_url.clone(),
            now,
            settings.hold_window(),
        );
        self.order_store.store(order.clone()).await?;

        tracing::info!(
            order = %order.id,
            order_no = %order.order_no,
            requester = %order.requester,
            start = %order.start_time,
            "reservation created"
        );
        Ok(order)
    }

    /// Cancels a non-terminal order and releases its slot.
    pub async fn cancel(&self, order_id: OrderId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut order = self
            .order_store
            .get(order_id)
            .await?
            .ok_or(BookingError::OrderNotFound(order_id))?;
        order.cancel(self.clock.now())?;
        self.order_store.store(order.clone()).await?;
        self.release_claimed(order.start_time).await?;

        tracing::info!(order = %order.id, "reservation cancelled");
        Ok(())
    }

    /// Attaches payment proofs to a pending order, suspending its expiry.
    pub async fn submit_proof(&self, order_id: OrderId, proofs: Vec<Proof>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut order = self
            .order_store
            .get(order_id)
            .await?
            .ok_or(BookingError::OrderNotFound(order_id))?;
        order.submit_proof(proofs, self.clock.now())?;
        self.order_store.store(order.clone()).await?;

        tracing::info!(order = %order.id, proofs = order.proofs.len(), "payment proof submitted");
        Ok(())
    }

    /// Expires every pending order whose hold deadline has passed, releasing
    /// its slot, and returns how many were expired.
    ///
    /// Each order is re-read and re-checked under the write lock before the
    /// transition, so an order that was cancelled or confirmed in the
    /// meantime is skipped rather than expired. A single order's race never
    /// aborts the sweep.
    pub async fn expire_due(&self) -> Result<usize> {
        let now = self.clock.now();
        let due = self.order_store.due_pending(now).await?;
        let mut expired = 0;

        for candidate in due {
            let _guard = self.write_lock.lock().await;
            let Some(mut order) = self.order_store.get(candidate.id).await? else {
                continue;
            };
            if !order.is_due(now) {
                tracing::debug!(order = %order.id, status = %order.status, "skipping, order left pending");
                continue;
            }
            if order.expire(now).is_err() {
                continue;
            }
            self.order_store.store(order.clone()).await?;
            self.release_claimed(order.start_time).await?;
            expired += 1;
            tracing::info!(order = %order.id, "hold expired");
        }

        Ok(expired)
    }

    /// Releases a slot, tolerating one that already aged out of the window.
    async fn release_claimed(&self, start: DateTime<Utc>) -> Result<()> {
        match self.slot_store.release(start).await {
            Err(BookingError::SlotNotFound(_)) => {
                tracing::debug!(%start, "slot aged out of the booking window before release");
                Ok(())
            }
            other => other,
        }
    }

    /// Current slot inventory ordered by start time. `viewer` drives the
    /// `mine` projection on each slot.
    pub async fn list_slots(&self, viewer: Option<&RequesterId>) -> Result<Vec<SlotView>> {
        self.ensure_horizon().await?;
        let slots = self.slot_store.list().await?;
        Ok(slots.iter().map(|slot| slot.view(viewer)).collect())
    }

    /// A requester's orders, most recent first.
    pub async fn list_orders(&self, requester: &RequesterId) -> Result<Vec<Order>> {
        self.order_store.list_for(requester).await
    }

    pub async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        self.order_store.get(order_id).await
    }

    /// The requester's current non-terminal order, if any.
    pub async fn active_order(&self, requester: &RequesterId) -> Result<Option<Order>> {
        self.order_store.active_for(requester).await
    }

    /// Every order ever created, ascending by id.
    pub async fn order_book(&self) -> Result<Vec<Order>> {
        self.order_store.all().await
    }
}
