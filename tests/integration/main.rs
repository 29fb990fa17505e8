//! Integration tests
//!
//! `api_tests` drive the router in-process over the memory store;
//! `live_tests` need a running server and are ignored by default.

mod api_tests;
mod live_tests;
