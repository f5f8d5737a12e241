//! Low level lexical helpers shared by the template parser.

pub mod keyword;
pub mod string_tokenizer;

pub use keyword::{Directive, WordOperator};
pub use string_tokenizer::{StringTokenizer, TokenizerError};
