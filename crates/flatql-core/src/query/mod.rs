//! Tokenizing and keyword classification.

/// Command and type keyword lookup
pub mod classifier;
/// Query lexer
pub mod lexer;

// Re-export main types
pub use classifier::{classify_query, classify_type, QueryType};
pub use lexer::{tokenize, Lexer, Operator, ParseError, Token};
