use crate::error::{BookingError, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned, monotonically increasing order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identity of the party making a reservation.
///
/// Supplied by an external authentication collaborator; the engine only
/// compares it, never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequesterId(pub String);

impl RequesterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RequesterId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A monetary value. Zero when pricing is disabled.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn times(&self, hours: i64) -> Self {
        Self(self.0 * Decimal::from(hours))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    ProofSubmitted,
    Cancelled,
    Expired,
}

impl OrderStatus {
    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Expired)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::ProofSubmitted => "proof_submitted",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        };
        write!(f, "{label}")
    }
}

/// Payment evidence attached to an order on submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    pub image_url: String,
    pub note: String,
}

/// A reservation order and its hold on one slot.
///
/// The state machine lives here: `cancel`, `submit_proof` and `expire` validate
/// the current status before mutating, so an order can never leave a terminal
/// state and expiry can never fire on an order that already moved on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub requester: RequesterId,
    /// Human-readable number derived from the creation instant.
    pub order_no: String,
    pub status: OrderStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub amount: Money,
    pub pay_qr_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Hold deadline; meaningful only while the order is pending.
    pub expire_at: DateTime<Utc>,
    pub proofs: Vec<Proof>,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: OrderId,
        requester: RequesterId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        amount: Money,
        pay_qr_url: String,
        now: DateTime<Utc>,
        hold: Duration,
    ) -> Self {
        let order_no = format!("BK{}-{}", now.format("%Y%m%d%H%M%S"), id);
        Self {
            id,
            requester,
            order_no,
            status: OrderStatus::Pending,
            start_time,
            end_time,
            amount,
            pay_qr_url,
            created_at: now,
            updated_at: now,
            expire_at: now + hold,
            proofs: Vec::new(),
        }
    }

    /// An order is active while its status is non-terminal.
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// A pending order whose hold deadline has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == OrderStatus::Pending && self.expire_at <= now
    }

    /// Cancels the order; legal from any non-terminal status.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.status.is_terminal() {
            return Err(BookingError::InvalidTransition {
                id: self.id,
                status: self.status,
            });
        }
        self.status = OrderStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    /// Attaches payment proofs and marks the order as submitted.
    ///
    /// Re-submission while still pending overwrites the previous proofs;
    /// anything else is an invalid transition. An empty proof set is rejected
    /// before any mutation.
    pub fn submit_proof(&mut self, proofs: Vec<Proof>, now: DateTime<Utc>) -> Result<()> {
        if proofs.is_empty() {
            return Err(BookingError::EmptyProofSet);
        }
        if self.status != OrderStatus::Pending {
            return Err(BookingError::InvalidTransition {
                id: self.id,
                status: self.status,
            });
        }
        self.proofs = proofs;
        self.status = OrderStatus::ProofSubmitted;
        self.updated_at = now;
        Ok(())
    }

    /// Expires a stale hold; legal only from `Pending`.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.status != OrderStatus::Pending {
            return Err(BookingError::InvalidTransition {
                id: self.id,
                status: self.status,
            });
        }
        self.status = OrderStatus::Expired;
        self.updated_at = now;
        Ok(())
    }
}
