//! Eidos source handling: tokens, the lexer, and an error-tolerant parser.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::tokenize;
pub use token::{Token, TokenKind};
