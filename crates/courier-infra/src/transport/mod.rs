//! Transport adapters.

pub mod offline;

pub use offline::{OfflineFixture, OfflineSession, OfflineTransport, OutboxRecord, read_outbox};
