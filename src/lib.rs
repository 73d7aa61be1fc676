pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{ConsoleError, ConsoleResult, DomainError, TransportError, TransportErrorKind, ValidationError};
