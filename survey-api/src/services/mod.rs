//! Service Layer
//!
//! Business logic between the HTTP routes and the record store. Routes stay
//! thin: they extract, call a service, and map the result.

mod record_service;

pub use record_service::*;
