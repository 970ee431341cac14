pub mod lexer;
pub mod macros;
pub mod parser;
pub mod syntax;
pub mod token;

pub use macros::PairMacros;
pub use parser::{ErrorKind, ParseError, ParseResult, Parser};
pub use syntax::Syntax;
pub use token::{MarkupTokenKind, Token, TopTokenKind};
