use super::order::RequesterId;
use super::time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A one-hour bookable window as stored by the inventory.
///
/// `available` is false either because an active order holds the slot
/// (`holder` is set) or because the availability source blocked it at
/// generation time (`holder` stays `None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub available: bool,
    pub holder: Option<RequesterId>,
}

impl Slot {
    pub fn new(start_time: DateTime<Utc>, available: bool) -> Self {
        Self {
            start_time,
            end_time: time::slot_end(start_time),
            available,
            holder: None,
        }
    }

    /// Projects the stored record into the per-viewer read model.
    pub fn view(&self, viewer: Option<&RequesterId>) -> SlotView {
        let mine = match (viewer, &self.holder) {
            (Some(viewer), Some(holder)) => viewer == holder,
            _ => false,
        };
        SlotView {
            start_time: self.start_time,
            end_time: self.end_time,
            available: self.available,
            mine,
        }
    }
}

/// The slot shape callers see: availability plus the "mine" flag for the
/// requesting viewer. Field names are the wire shape UI collaborators expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotView {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub available: bool,
    pub mine: bool,
}
