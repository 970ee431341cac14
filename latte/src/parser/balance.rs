use std::ops::Range;

use crate::macros::{GENERIC_END, PairMacros, end_matches};
use crate::parser::error::ParseError;
use crate::token::{MarkupTokenKind, Token};

/// An open pair macro waiting for its close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: String,
    pub offset: usize,
    pub length: usize,
}

impl Macro {
    fn span(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// Check that every pair macro in `tokens` is opened and closed in nested order.
///
/// Never fails: mismatches become diagnostics and scanning continues to the end.
pub fn scan(
    tokens: &[Token<MarkupTokenKind>],
    pair_macros: &PairMacros,
    file_id: usize,
) -> Vec<ParseError> {
    let mut stack: Vec<Macro> = Vec::new();
    let mut errors = Vec::new();

    for token in tokens {
        match token.kind {
            MarkupTokenKind::MacroStart if pair_macros.contains(&token.text) => {
                tracing::trace!(name = %token.text, offset = token.span.start, "push macro");
                stack.push(Macro {
                    name: token.text.clone(),
                    offset: token.span.start,
                    length: token.span.len(),
                });
            }
            MarkupTokenKind::MacroEnd if pair_macros.accepts_end(&token.text) => {
                close_macro(&mut stack, token, file_id, &mut errors);
            }
            _ => {}
        }
    }

    for unclosed in &stack {
        errors.push(ParseError::unclosed_macro(
            &unclosed.name,
            unclosed.span(),
            file_id,
        ));
    }

    errors
}

fn close_macro(
    stack: &mut Vec<Macro>,
    token: &Token<MarkupTokenKind>,
    file_id: usize,
    errors: &mut Vec<ParseError>,
) {
    let end_text = token.text.as_str();

    let Some(top) = stack.pop() else {
        if end_text != GENERIC_END {
            let name = end_text.trim_start_matches('/');
            errors.push(ParseError::unopened_macro(name, token.span.clone(), file_id));
        }
        return;
    };
    tracing::trace!(name = %top.name, end = end_text, "pop macro");

    if end_matches(&top.name, end_text) {
        return;
    }

    errors.push(ParseError::unclosed_macro(&top.name, top.span(), file_id));

    // One level of recovery: `{foreach}{if}{/foreach}` loses only the `if`.
    if stack
        .last()
        .is_some_and(|next| end_matches(&next.name, end_text))
    {
        stack.pop();
    }
}
