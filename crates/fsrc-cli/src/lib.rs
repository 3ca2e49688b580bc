//! CLI library components for the forced-source ingester.

pub mod logging;
