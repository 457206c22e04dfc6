//! Query parsing: target site detection and intent analysis

mod intent;
mod target;

pub use intent::QueryIntent;
pub use target::{extract_target, normalize_query};
