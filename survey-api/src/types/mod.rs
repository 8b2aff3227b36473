//! API Request and Response Types
//!
//! Wire shapes for the record endpoints. Record bodies are open-ended, so
//! requests are taken as raw JSON and flattened by the relationship
//! normalizer; only responses and query parameters are typed here.

mod dump;
mod list;
mod record;

pub use dump::*;
pub use list::*;
pub use record::*;
