//! # Inline Parsing
//!
//! Turns one line or paragraph into a [`RichText`](crate::models::RichText).
//!
//! ## Modules
//!
//! - **`kinds`**: Inline constructs that own their patterns (image, link,
//!   code span, bold, italic, strikethrough)
//! - **`links`**: Link target validation and normalization
//! - **`types`**: `InlineMatch` / `InlineKind` produced by the precedence scan
//! - **`parser`**: `parse_rich_text()` main entry point
//!
//! ## Precedence
//!
//! Image > link > code > bold > italic > strikethrough. A lower class never
//! matches across a higher one, and nesting is flattened rather than modelled:
//! the only combination produced is bold-around-a-single-link.

pub mod kinds;
pub mod links;
pub mod parser;
pub mod types;

pub use links::{is_absolute_url, normalize_link_target};
pub use parser::parse_rich_text;
pub use types::{InlineKind, InlineMatch};
