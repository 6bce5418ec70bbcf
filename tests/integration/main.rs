//! Integration tests for the harvester
//!
//! These tests use wiremock to stand up mock catalog sites and exercise
//! fetching, pagination, whole sessions and the load stage end-to-end.

mod fetch_tests;
mod load_tests;
mod pagination_tests;
mod session_tests;
