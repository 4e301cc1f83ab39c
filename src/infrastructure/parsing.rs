//! HTML parsing for retailer listing pages

pub mod selector_extractor;

pub use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
pub use selector_extractor::SelectorExtractor;
