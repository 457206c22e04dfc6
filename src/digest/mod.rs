//! Digest formatting for downstream prompts

mod formatter;

pub use formatter::{Digest, DigestFormatter, DEFAULT_MAX_CHARS};
