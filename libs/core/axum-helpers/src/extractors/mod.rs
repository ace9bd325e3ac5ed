//! Request extractors that validate input before a handler runs.
//!
//! Rejections are rendered as the standard envelope with a 400 status.

pub mod validated_json;
pub mod validated_query;

pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
