pub mod conversation;
pub mod delta;
pub mod demo;
pub mod error;
pub mod transcript;
pub mod turn;

pub use conversation::{Applied, Conversation};
pub use delta::Delta;
pub use demo::{Demo, DemoManifest, Source};
pub use error::Error;
pub use turn::{Role, Turn};
