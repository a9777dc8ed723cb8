//! Integration tests against an in-process console server

mod api_contract;
mod common;
mod console_flow;
