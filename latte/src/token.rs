use std::fmt;
use std::ops::Range;

/// A classified span of template source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<K> {
    pub kind: K,
    /// The source text covered by `span`.
    pub text: String,
    /// Byte span in the original template source.
    pub span: Range<usize>,
}

impl<K: Copy + PartialEq> Token<K> {
    pub fn new(kind: K, text: impl Into<String>, span: Range<usize>) -> Self {
        Token {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn is(&self, kind: K) -> bool {
        self.kind == kind
    }
}

/// Template-level token kinds: HTML text and the Latte tags embedded in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopTokenKind {
    /// Plain text outside any tag.
    Html,
    /// `{` (or the active syntax's open delimiter) starting a macro tag.
    OpenDelimiter,
    /// `}` (or the active syntax's close delimiter) ending a macro tag.
    CloseDelimiter,
    /// The macro body between the delimiters.
    Latte,
    /// `{*` or `*}` around a comment.
    CommentDelimiter,
    Comment,
    /// An unterminated tag or comment, up to the end of input.
    Error,
}

/// Token kinds inside a macro body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkupTokenKind {
    /// Name of an opening macro: `if` in `{if $x}`.
    MacroStart,
    /// Name of a closing macro including the slash: `/if` in `{/if}`, or a bare `/`.
    MacroEnd,
    Variable,
    Number,
    String,
    Keyword,
    /// `(int)`, `(string)` and friends.
    Cast,
    Symbol,
    Char,
    Whitespace,
    Error,
}

impl MarkupTokenKind {
    pub fn is_macro(self) -> bool {
        matches!(self, MarkupTokenKind::MacroStart | MarkupTokenKind::MacroEnd)
    }
}

impl fmt::Display for TopTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TopTokenKind::Html => "HTML",
            TopTokenKind::OpenDelimiter => "OPEN_DELIMITER",
            TopTokenKind::CloseDelimiter => "CLOSE_DELIMITER",
            TopTokenKind::Latte => "LATTE",
            TopTokenKind::CommentDelimiter => "COMMENT_DELIMITER",
            TopTokenKind::Comment => "COMMENT",
            TopTokenKind::Error => "ERROR",
        };
        f.write_str(name)
    }
}

impl fmt::Display for MarkupTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarkupTokenKind::MacroStart => "MACRO_START",
            MarkupTokenKind::MacroEnd => "MACRO_END",
            MarkupTokenKind::Variable => "VARIABLE",
            MarkupTokenKind::Number => "NUMBER",
            MarkupTokenKind::String => "STRING",
            MarkupTokenKind::Keyword => "KEYWORD",
            MarkupTokenKind::Cast => "CAST",
            MarkupTokenKind::Symbol => "SYMBOL",
            MarkupTokenKind::Char => "CHAR",
            MarkupTokenKind::Whitespace => "WHITESPACE",
            MarkupTokenKind::Error => "ERROR",
        };
        f.write_str(name)
    }
}
