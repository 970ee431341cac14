pub mod balance;
pub mod error;

pub use error::{ErrorKind, ParseError};

use crate::lexer::{Lexer, markup};
use crate::macros::PairMacros;
use crate::syntax::Syntax;
use crate::token::{MarkupTokenKind, Token, TopTokenKind};

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
    pair_macros: PairMacros,
    syntax: Syntax,
}

/// Everything a parse produced: tokens of both levels and all diagnostics.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
    pub tokens: Vec<Token<TopTokenKind>>,
    /// Tokens of every macro body, in source order.
    pub markup: Vec<Token<MarkupTokenKind>>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn markup_tokens(&self) -> impl Iterator<Item = &Token<MarkupTokenKind>> {
        self.markup.iter()
    }
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser {
            source,
            file_id,
            pair_macros: PairMacros::default(),
            syntax: Syntax::default(),
        }
    }

    pub fn with_pair_macros(mut self, pair_macros: PairMacros) -> Self {
        self.pair_macros = pair_macros;
        self
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Lex the template and check macro balance.
    pub fn parse(&self) -> ParseResult {
        let lexed = Lexer::new(&self.source, self.file_id)
            .with_syntax(self.syntax)
            .tokenize();

        let markup: Vec<Token<MarkupTokenKind>> = lexed
            .tokens
            .iter()
            .filter(|token| token.is(TopTokenKind::Latte))
            .flat_map(|token| markup::tokenize(&token.text, token.span.start))
            .collect();

        let mut errors = lexed.errors;
        errors.extend(balance::scan(&markup, &self.pair_macros, self.file_id));

        tracing::debug!(
            file_id = self.file_id,
            tokens = lexed.tokens.len(),
            macros = markup.iter().filter(|t| t.kind.is_macro()).count(),
            errors = errors.len(),
            "parsed template"
        );

        ParseResult {
            source_id: self.file_id,
            tokens: lexed.tokens,
            markup,
            errors,
        }
    }
}
