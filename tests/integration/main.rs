//! Integration tests against a local wiremock server

mod fetch_tests;
mod search_tests;
