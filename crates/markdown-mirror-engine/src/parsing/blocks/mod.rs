//! # Block Segmentation
//!
//! Two-phase splitting of a document into sections.
//!
//! ## Parsing Phases
//!
//! 1. **Line Classification** (`classify`): each line is classified into a
//!    `LineClass` from local facts only
//! 2. **Segmentation** (`segment`): a `BlockSegmenter` state machine groups
//!    classified lines into `Section`s, honouring fence opacity
//!
//! ## Modules
//!
//! - **`kinds`**: Block syntax with owned delimiters (fence, heading, list,
//!   table, quote, rule)
//! - **`classify`**: `MarkdownLineClassifier` produces `LineClass` per line
//! - **`segment`**: `BlockSegmenter` builds sections
//! - **`types`**: `Section` / `SectionKind`

pub mod classify;
pub mod kinds;
pub mod segment;
pub mod types;

pub use classify::{LineClass, LineKind, MarkdownLineClassifier};
pub use segment::BlockSegmenter;
pub use types::{Section, SectionKind};
