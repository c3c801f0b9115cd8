//! # Inline Kinds
//!
//! Inline constructs that own their syntax. Each kind exposes the pattern the
//! parser scans for; the parser itself never hardcodes a delimiter.
//!
//! Scanning precedence (highest first): image, link, code span, bold, italic,
//! strikethrough.

pub mod code_span;
pub mod emphasis;
pub mod link;

pub use code_span::CodeSpan;
pub use emphasis::{Bold, Italic, Strikethrough};
pub use link::{Image, Link};
