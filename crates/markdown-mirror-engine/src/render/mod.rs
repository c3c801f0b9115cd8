//! Destination-specific serialization of [`Block`]s.
//!
//! Nothing in the sync core depends on this module; remote clients and the
//! CLI pick a renderer for the destination they talk to.

pub mod language;
pub mod notion;

use crate::models::Block;

pub use notion::NotionRenderer;

pub trait Renderer {
    type Output;

    fn render_block(&self, block: &Block) -> Self::Output;

    fn render_blocks(&self, blocks: &[Block]) -> Vec<Self::Output> {
        blocks.iter().map(|block| self.render_block(block)).collect()
    }
}
