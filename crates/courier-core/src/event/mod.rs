//! Notification channel for Courier services.
//!
//! Provides an `EventBus` that distributes `CourierEvent` messages to all
//! subscribers via a `tokio::sync::broadcast` channel. The bus is created by
//! the caller and handed to each service; there is no global instance.

pub mod bus;

pub use bus::EventBus;
