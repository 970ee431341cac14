//! Template lexer.
//!
//! Splits a Latte template into HTML text and tags (`{macro ...}`, `{* comment *}`),
//! following `{syntax ...}` switches. Macro bodies are broken down further by
//! [`markup::tokenize`].

pub mod markup;

use crate::parser::error::{ErrorKind, ParseError};
use crate::syntax::Syntax;
use crate::token::{Token, TopTokenKind};

/// Terminator recognised while the syntax is switched off.
const OFF_TERMINATOR: &str = "{/syntax}";

/// Result of lexing a whole template.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    pub tokens: Vec<Token<TopTokenKind>>,
    pub errors: Vec<ParseError>,
}

pub struct Lexer<'a> {
    source: &'a str,
    file_id: usize,
    pos: usize,
    /// Active syntaxes. The bottom entry is never popped.
    syntax_stack: Vec<Syntax>,
    /// Start of pending HTML text not yet emitted.
    html_start: Option<usize>,
    tokens: Vec<Token<TopTokenKind>>,
    errors: Vec<ParseError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file_id: usize) -> Self {
        Lexer {
            source,
            file_id,
            pos: 0,
            syntax_stack: vec![Syntax::default()],
            html_start: None,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax_stack = vec![syntax];
        self
    }

    pub fn tokenize(mut self) -> Lexed {
        while self.pos < self.source.len() {
            let syntax = self.syntax();

            if syntax == Syntax::Off {
                self.lex_syntax_off();
                continue;
            }

            match self.tag_delimiters(syntax) {
                Some((open, close)) => {
                    self.flush_html();
                    if self.source[self.pos + open.len()..].starts_with('*') {
                        self.lex_comment(open, close);
                    } else {
                        self.lex_macro(open, close, syntax);
                    }
                }
                None => self.bump_html(),
            }
        }
        self.flush_html();

        Lexed {
            tokens: self.tokens,
            errors: self.errors,
        }
    }

    fn syntax(&self) -> Syntax {
        *self.syntax_stack.last().unwrap_or(&Syntax::Latte)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// The delimiter pair opening a tag at the current position, if any.
    fn tag_delimiters(&self, syntax: Syntax) -> Option<(&'static str, &'static str)> {
        let rest = self.rest();
        syntax.delimiters().iter().copied().find(|&(open, close)| {
            let Some(after) = rest.strip_prefix(open) else {
                return false;
            };
            let Some(next) = after.chars().next() else {
                return false;
            };
            if after.starts_with(close) || next == '\'' || next == '"' {
                return false;
            }
            // `{ ... }` with a space is inline JavaScript or CSS, not a macro.
            if syntax == Syntax::Latte && (next.is_whitespace() || next == '{') {
                return false;
            }
            true
        })
    }

    fn push(&mut self, kind: TopTokenKind, start: usize, end: usize) {
        self.tokens
            .push(Token::new(kind, &self.source[start..end], start..end));
    }

    fn bump_html(&mut self) {
        if self.html_start.is_none() {
            self.html_start = Some(self.pos);
        }
        let step = self.rest().chars().next().map_or(1, char::len_utf8);
        self.pos += step;
    }

    fn flush_html(&mut self) {
        if let Some(start) = self.html_start.take() {
            if start < self.pos {
                self.push(TopTokenKind::Html, start, self.pos);
            }
        }
    }

    fn lex_syntax_off(&mut self) {
        match self.rest().find(OFF_TERMINATOR) {
            Some(offset) => {
                if self.html_start.is_none() && offset > 0 {
                    self.html_start = Some(self.pos);
                }
                self.pos += offset;
                self.flush_html();

                let start = self.pos;
                self.push(TopTokenKind::OpenDelimiter, start, start + 1);
                self.push(
                    TopTokenKind::Latte,
                    start + 1,
                    start + OFF_TERMINATOR.len() - 1,
                );
                self.push(
                    TopTokenKind::CloseDelimiter,
                    start + OFF_TERMINATOR.len() - 1,
                    start + OFF_TERMINATOR.len(),
                );
                self.pos += OFF_TERMINATOR.len();
                self.pop_syntax();
            }
            None => {
                if self.html_start.is_none() {
                    self.html_start = Some(self.pos);
                }
                self.pos = self.source.len();
                self.flush_html();
            }
        }
    }

    fn lex_comment(&mut self, open: &str, close: &str) {
        let start = self.pos;
        let body_start = start + open.len() + 1;
        let terminator = format!("*{}", close);

        match self.source[body_start..].find(&terminator) {
            Some(offset) => {
                let body_end = body_start + offset;
                let end = body_end + terminator.len();
                self.push(TopTokenKind::CommentDelimiter, start, body_start);
                if body_start < body_end {
                    self.push(TopTokenKind::Comment, body_start, body_end);
                }
                self.push(TopTokenKind::CommentDelimiter, body_end, end);
                self.pos = end;
            }
            None => {
                self.push(TopTokenKind::Error, start, self.source.len());
                self.errors.push(
                    ParseError::error(
                        ErrorKind::UnterminatedComment,
                        "unterminated comment",
                        start..body_start,
                        self.file_id,
                    )
                    .with_note(format!("close the comment with `{}`", terminator)),
                );
                self.pos = self.source.len();
            }
        }
    }

    fn lex_macro(&mut self, open: &str, close: &str, syntax: Syntax) {
        let source = self.source;
        let start = self.pos;
        let body_start = start + open.len();

        match find_close(&source[body_start..], close, syntax.balances_braces()) {
            Some(offset) => {
                let body_end = body_start + offset;
                let end = body_end + close.len();
                self.push(TopTokenKind::OpenDelimiter, start, body_start);
                self.push(TopTokenKind::Latte, body_start, body_end);
                self.push(TopTokenKind::CloseDelimiter, body_end, end);
                self.pos = end;
                self.switch_syntax(&source[body_start..body_end]);
            }
            None => {
                self.push(TopTokenKind::Error, start, self.source.len());
                self.errors.push(
                    ParseError::error(
                        ErrorKind::UnterminatedMacro,
                        "unterminated macro",
                        start..body_start,
                        self.file_id,
                    )
                    .with_note(format!("close the macro with `{}`", close)),
                );
                self.pos = self.source.len();
            }
        }
    }

    /// Follow `{syntax NAME}` and `{/syntax}` tags.
    fn switch_syntax(&mut self, body: &str) {
        let body = body.trim();
        if body == "/syntax" {
            self.pop_syntax();
            return;
        }
        let Some(args) = body.strip_prefix("syntax") else {
            return;
        };
        if !args.starts_with(char::is_whitespace) {
            return;
        }
        let name = args.split_whitespace().next().unwrap_or_default();
        match Syntax::from_name(name) {
            Some(syntax) => {
                tracing::trace!(syntax = syntax.name(), offset = self.pos, "syntax switched");
                self.syntax_stack.push(syntax);
            }
            None => {
                tracing::debug!(name, offset = self.pos, "unknown syntax, keeping current");
            }
        }
    }

    fn pop_syntax(&mut self) {
        if self.syntax_stack.len() > 1 {
            self.syntax_stack.pop();
            tracing::trace!(syntax = self.syntax().name(), offset = self.pos, "syntax restored");
        }
    }
}

/// Offset of the close delimiter in a macro body, skipping quoted strings and,
/// when `balance` is set, nested `{...}` pairs.
fn find_close(body: &str, close: &str, balance: bool) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut chars = body.char_indices();

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '{' if balance => depth += 1,
            '}' if balance && depth > 0 => depth -= 1,
            _ if depth == 0 && body[i..].starts_with(close) => return Some(i),
            _ => {}
        }
    }
    None
}
