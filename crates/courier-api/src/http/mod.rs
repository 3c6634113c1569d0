//! HTTP/REST API layer for Courier.
//!
//! Axum-based REST API at `/api/v1/` with the envelope response format,
//! server-sent events, and CORS support.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
