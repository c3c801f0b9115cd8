//! Block-specific types that own their delimiters.
//!
//! All block syntax knowledge lives here; the classifier and segmenter only
//! call these helpers.

pub mod block_quote;
pub mod code_fence;
pub mod heading;
pub mod list;
pub mod rule;
pub mod table;

pub use block_quote::BlockQuote;
pub use code_fence::{CodeFence, FenceKind, FenceOpen, FenceSig};
pub use heading::Heading;
pub use list::ListMarker;
pub use rule::ThematicBreak;
pub use table::TableRow;
