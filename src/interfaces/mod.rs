//! Inbound adapters that translate external requests into service calls.

pub mod http;
