//! Cartwheel CLI library.
//!
//! Client, load generator and catalog tooling, exposed as a library so the
//! integration tests can drive them against an in-process server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod commands;
