//! Background jobs.

pub mod offline_watch;

pub use offline_watch::OfflineWatch;
