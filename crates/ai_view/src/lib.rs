//! Projection of a conversation into a renderable view, and the renderers
//! that consume it.

mod error;
pub mod html;
mod projector;
mod render;
mod tree;

pub use error::Error;
pub use projector::Projector;
pub use render::{Recorder, Renderer, TerminalRenderer};
pub use tree::{Entry, ViewTree};
