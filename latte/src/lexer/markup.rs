use crate::token::{MarkupTokenKind, Token};

const KEYWORDS: &[&str] = &[
    "as",
    "and",
    "or",
    "not",
    "xor",
    "true",
    "false",
    "null",
    "instanceof",
    "new",
    "clone",
];

const CASTS: &[&str] = &[
    "int", "integer", "float", "double", "string", "bool", "boolean", "array", "object",
];

/// Tokenize a macro body (the text between the delimiters).
///
/// `base` is the body's byte offset in the template, so token spans point into
/// the original source.
pub fn tokenize(body: &str, base: usize) -> Vec<Token<MarkupTokenKind>> {
    let mut lexer = MarkupLexer {
        body,
        base,
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.lex_whitespace();
    lexer.lex_macro_name();
    while lexer.pos < body.len() {
        lexer.lex_next();
    }
    lexer.tokens
}

struct MarkupLexer<'a> {
    body: &'a str,
    base: usize,
    pos: usize,
    tokens: Vec<Token<MarkupTokenKind>>,
}

impl<'a> MarkupLexer<'a> {
    fn rest(&self) -> &'a str {
        &self.body[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn emit(&mut self, kind: MarkupTokenKind, len: usize) {
        let start = self.pos;
        let end = start + len;
        self.tokens.push(Token::new(
            kind,
            &self.body[start..end],
            self.base + start..self.base + end,
        ));
        self.pos = end;
    }

    fn lex_whitespace(&mut self) {
        let len = prefix_len(self.rest(), char::is_whitespace);
        if len > 0 {
            self.emit(MarkupTokenKind::Whitespace, len);
        }
    }

    /// The directive name right after the open delimiter.
    fn lex_macro_name(&mut self) {
        let rest = self.rest();
        match self.peek() {
            Some('/') => {
                let len = macro_name_len(&rest[1..]).unwrap_or(0);
                self.emit(MarkupTokenKind::MacroEnd, 1 + len);
            }
            Some('=' | '?') => self.emit(MarkupTokenKind::MacroStart, 1),
            Some(c) if is_ident_start(c) => {
                // `{foo()}` or `{Foo::bar}` prints an expression instead of opening a macro.
                if let Some(len) = macro_name_len(rest) {
                    self.emit(MarkupTokenKind::MacroStart, len);
                }
            }
            _ => {}
        }
    }

    fn lex_next(&mut self) {
        let rest = self.rest();
        let Some(c) = self.peek() else {
            return;
        };
        let cast = if c == '(' { cast_len(rest) } else { None };

        if c.is_whitespace() {
            self.lex_whitespace();
        } else if c == '$' {
            let len = prefix_len(&rest[1..], is_ident_char);
            if len > 0 {
                self.emit(MarkupTokenKind::Variable, 1 + len);
            } else {
                self.emit(MarkupTokenKind::Char, 1);
            }
        } else if c.is_ascii_digit() {
            self.emit(MarkupTokenKind::Number, number_len(rest));
        } else if c == '\'' || c == '"' {
            match string_len(rest, c) {
                Some(len) => self.emit(MarkupTokenKind::String, len),
                None => self.emit(MarkupTokenKind::Error, rest.len()),
            }
        } else if let Some(len) = cast {
            self.emit(MarkupTokenKind::Cast, len);
        } else if is_ident_start(c) {
            let len = prefix_len(rest, is_ident_char);
            let kind = if KEYWORDS.contains(&rest[..len].to_ascii_lowercase().as_str()) {
                MarkupTokenKind::Keyword
            } else {
                MarkupTokenKind::Symbol
            };
            self.emit(kind, len);
        } else {
            self.emit(MarkupTokenKind::Char, c.len_utf8());
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte length of the longest prefix whose chars satisfy `pred`.
fn prefix_len(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(s.len(), |(i, _)| i)
}

/// Length of a macro name such as `if`, `ifCurrent` or `form.label`, or `None`
/// when the word is followed by `(`, `::` or `\` and is really an expression.
fn macro_name_len(s: &str) -> Option<usize> {
    if !s.chars().next().is_some_and(is_ident_start) {
        return None;
    }
    let mut len = prefix_len(s, is_ident_char);
    loop {
        let rest = &s[len..];
        let after_sep = rest.strip_prefix('.').or_else(|| {
            if rest.starts_with("::") {
                None
            } else {
                rest.strip_prefix(':')
            }
        });
        match after_sep {
            Some(tail) if tail.chars().next().is_some_and(is_ident_char) => {
                len += 1 + prefix_len(tail, is_ident_char);
            }
            _ => break,
        }
    }
    let rest = &s[len..];
    if rest.starts_with('(') || rest.starts_with("::") || rest.starts_with('\\') {
        return None;
    }
    Some(len)
}

fn number_len(s: &str) -> usize {
    let int = prefix_len(s, |c| c.is_ascii_digit());
    let rest = &s[int..];
    match rest.strip_prefix('.') {
        Some(frac) if frac.starts_with(|c: char| c.is_ascii_digit()) => {
            int + 1 + prefix_len(frac, |c| c.is_ascii_digit())
        }
        _ => int,
    }
}

/// Length of a quoted string including both quotes, or `None` if it never closes.
fn string_len(s: &str, quote: char) -> Option<usize> {
    let mut chars = s.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            return Some(i + c.len_utf8());
        }
    }
    None
}

fn cast_len(s: &str) -> Option<usize> {
    let inner = s.strip_prefix('(')?;
    let word = prefix_len(inner, |c| c.is_ascii_alphabetic());
    if !inner[word..].starts_with(')') {
        return None;
    }
    CASTS
        .contains(&inner[..word].to_ascii_lowercase().as_str())
        .then_some(word + 2)
}
