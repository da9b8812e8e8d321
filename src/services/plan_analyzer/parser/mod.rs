//! Plan parser module
//!
//! Turns serialized execution-plan documents into the typed plan model.

pub mod error;
pub mod explain_parser;
pub mod value_parser;

// Re-export commonly used items
pub use error::{ParseError, ParseResult};
pub use explain_parser::ExplainParser;
pub use value_parser::ValueParser;
