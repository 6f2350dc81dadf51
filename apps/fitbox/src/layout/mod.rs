// Reference rendering substrate: metric tables, greedy wrap, ellipsis
// truncation and the in-memory document that ties them together.

pub mod document;
pub mod ellipsis;
pub mod font_metrics;
pub mod wrap;

pub use document::{Document, Style};
pub use font_metrics::FontFamily;
