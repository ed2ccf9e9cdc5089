//! Interface adapters: the CSV command stream and the order report.

pub mod csv;
