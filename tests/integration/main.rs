//! Integration tests for Site-Digest
//!
//! These tests run crawls and full retrievals against wiremock servers.

mod common;
mod crawl_tests;
mod engine_tests;
