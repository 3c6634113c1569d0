//! Dialog lookup across connected accounts.

pub mod resolver;

pub use resolver::{DialogResolver, DialogSearch};
