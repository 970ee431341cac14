use std::collections::BTreeSet;

/// Macros that must be closed with a matching `{/name}` unless configured otherwise.
pub const DEFAULT_PAIR_MACROS: &[&str] = &[
    "if",
    "ifset",
    "ifCurrent",
    "ifchanged",
    "ifcontent",
    "for",
    "foreach",
    "while",
    "first",
    "last",
    "sep",
    "capture",
    "cache",
    "syntax",
    "block",
    "define",
    "snippet",
    "snippetArea",
    "form",
    "spaceless",
    "switch",
];

/// The generic closing sign, `{/}`.
pub const GENERIC_END: &str = "/";

/// The set of directive names that require an explicit close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairMacros {
    names: BTreeSet<String>,
}

impl Default for PairMacros {
    fn default() -> Self {
        PairMacros {
            names: DEFAULT_PAIR_MACROS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PairMacros {
    pub fn empty() -> Self {
        PairMacros {
            names: BTreeSet::new(),
        }
    }

    pub fn with<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn without<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.names.remove(name.as_ref());
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether a `MacroEnd` token text (`/if`, `/`) takes part in balancing.
    pub fn accepts_end(&self, text: &str) -> bool {
        text == GENERIC_END || text.strip_prefix('/').is_some_and(|name| self.contains(name))
    }
}

/// A close token matches an open macro when `/name` ends with the close text,
/// so the generic closing sign matches every macro.
pub fn end_matches(name: &str, end_text: &str) -> bool {
    let closing = format!("/{}", name);
    closing.ends_with(end_text)
}
