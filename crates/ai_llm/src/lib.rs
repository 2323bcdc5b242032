mod auth;
mod client;
mod error;
pub mod mock;
mod provider;
pub mod retry;
pub mod sse;
pub mod types;

pub use auth::Token;
pub use client::{Client, parse_chunk};
pub use error::Error;
pub use provider::{DeltaStream, Provider};
