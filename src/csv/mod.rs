//! CSV record tokenizing

mod parser;

pub use parser::ParserConfig;
