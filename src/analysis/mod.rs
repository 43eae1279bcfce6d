//! Lexical analysis of Dawn documents
//!
//! Everything here is synchronous and stateless: results are derived fresh
//! from a document snapshot and the session's framework table.

pub mod legend;
pub mod tokens;
pub mod variables;

pub use legend::{TokenModifier, TokenType, encode_modifiers, legend};
pub use tokens::{Classification, SpanLengthMode, Token, classify, classify_word};
pub use variables::extract_variables;
