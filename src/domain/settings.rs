use super::order::Money;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Read-only booking configuration supplied by the settings provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSettings {
    /// Minutes an unconfirmed reservation is held before it expires.
    pub hold_minutes: u32,
    /// Flat hourly rate; zero disables pricing.
    pub price_per_hour: Money,
    /// Opaque reference to the payment QR artifact.
    pub pay_qr_url: String,
}

impl BookingSettings {
    pub fn hold_window(&self) -> Duration {
        Duration::minutes(self.hold_minutes as i64)
    }
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            hold_minutes: 15,
            price_per_hour: Money::ZERO,
            pay_qr_url: String::new(),
        }
    }
}
