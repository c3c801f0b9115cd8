//! Markdown front half: line classification, segmentation and inline
//! parsing. Conversion of sections into blocks lives in [`crate::convert`].

pub mod blocks;
pub mod inline;
pub mod rope;

use xi_rope::Rope;

use blocks::{BlockSegmenter, MarkdownLineClassifier, Section};
use rope::lines_with_spans;

/// Splits a whole document into ordered sections.
pub fn segment_document(text: &str) -> Vec<Section> {
    let rope = Rope::from(text);
    let classifier = MarkdownLineClassifier;
    let mut segmenter = BlockSegmenter::new();

    for lr in lines_with_spans(&rope) {
        let lc = classifier.classify(&lr);
        segmenter.push(&lc);
    }

    segmenter.finish()
}
