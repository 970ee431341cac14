/// Delimiter syntax of a template, switchable with `{syntax NAME}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    /// `{macro}`
    #[default]
    Latte,
    /// `{{macro}}`
    Double,
    /// `<%macro%>`
    Asp,
    /// `{%macro%}` and `{{macro}}`
    Python,
    /// No macros until `{/syntax}`.
    Off,
}

impl Syntax {
    pub fn from_name(name: &str) -> Option<Syntax> {
        match name.to_ascii_lowercase().as_str() {
            "latte" => Some(Syntax::Latte),
            "double" => Some(Syntax::Double),
            "asp" => Some(Syntax::Asp),
            "python" => Some(Syntax::Python),
            "off" => Some(Syntax::Off),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Syntax::Latte => "latte",
            Syntax::Double => "double",
            Syntax::Asp => "asp",
            Syntax::Python => "python",
            Syntax::Off => "off",
        }
    }

    /// Open/close delimiter pairs, longest open delimiter first.
    pub fn delimiters(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Syntax::Latte => &[("{", "}")],
            Syntax::Double => &[("{{", "}}")],
            Syntax::Asp => &[("<%", "%>")],
            Syntax::Python => &[("{%", "%}"), ("{{", "}}")],
            Syntax::Off => &[],
        }
    }

    /// Nested `{...}` pairs inside a macro body are skipped only with single braces.
    pub(crate) fn balances_braces(self) -> bool {
        self == Syntax::Latte
    }
}
