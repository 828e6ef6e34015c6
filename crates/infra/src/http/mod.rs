//! HTTP transport for stored-procedure endpoints

pub mod client;

pub use client::{HttpTransport, HttpTransportBuilder};
