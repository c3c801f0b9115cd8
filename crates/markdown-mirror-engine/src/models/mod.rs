pub mod block;
pub mod rich_text;
pub mod source_file;

pub use block::{Block, ListKind, MediaKind};
pub use rich_text::{Annotations, RichText, TextSpan};
pub use source_file::SourceFile;
