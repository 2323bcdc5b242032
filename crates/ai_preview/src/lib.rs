//! Sandboxed previews of generated code, memoized by content.

mod cache;
mod extract;
mod preview;

pub use cache::{CacheStats, RenderCache};
pub use extract::{CodeBlock, first_code_block};
pub use preview::Preview;
