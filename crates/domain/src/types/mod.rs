//! Domain types for the stored-procedure protocol

pub mod rpc;
pub mod tenant;

pub use rpc::*;
pub use tenant::*;
