//! HTTP middleware: Prometheus request metrics.
//!
//! Authentication lives in [`crate::auth`]; this module holds the
//! cross-cutting layers that wrap it.

pub mod metrics;
