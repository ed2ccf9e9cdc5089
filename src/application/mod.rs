//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `BookingEngine`, the single entry point for
//! reserving slots and driving order lifecycles, and the `HoldExpirySweeper`
//! that reverts stale holds in the background.

pub mod engine;
pub mod scheduler;
