mod conversions;

pub use conversions::{connection_error, InfraError};
