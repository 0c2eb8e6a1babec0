//! Background services that run alongside the HTTP server.
//!
//! - `sessions` - Idle session eviction

pub mod sessions;
