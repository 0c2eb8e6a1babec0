//! Cartwheel storefront library.
//!
//! This crate provides the cart HTTP service as a library, allowing it to be
//! tested in-process and served by the binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
