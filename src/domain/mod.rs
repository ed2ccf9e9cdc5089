//! Domain layer: the booking entities, their state machines, and the ports
//! the application layer drives them through.

pub mod order;
pub mod ports;
pub mod settings;
pub mod slot;
pub mod time;
