use latte::lexer::{Lexer, markup};
use latte::{ErrorKind, MarkupTokenKind, Syntax, Token, TopTokenKind};

fn lex(source: &str) -> Vec<(TopTokenKind, String)> {
    lex_with(source, Syntax::Latte)
}

fn lex_with(source: &str, syntax: Syntax) -> Vec<(TopTokenKind, String)> {
    Lexer::new(source, 0)
        .with_syntax(syntax)
        .tokenize()
        .tokens
        .into_iter()
        .map(|t| (t.kind, t.text))
        .collect()
}

fn bodies(source: &str, syntax: Syntax) -> Vec<String> {
    lex_with(source, syntax)
        .into_iter()
        .filter(|(kind, _)| *kind == TopTokenKind::Latte)
        .map(|(_, text)| text)
        .collect()
}

fn markup_kinds(body: &str) -> Vec<(MarkupTokenKind, String)> {
    markup::tokenize(body, 0)
        .into_iter()
        .map(|t| (t.kind, t.text))
        .collect()
}

fn t(kind: TopTokenKind, text: &str) -> (TopTokenKind, String) {
    (kind, text.to_string())
}

fn m(kind: MarkupTokenKind, text: &str) -> (MarkupTokenKind, String) {
    (kind, text.to_string())
}

#[test]
fn html_and_macros() {
    use TopTokenKind::*;
    assert_eq!(
        lex("a {if $x}b{/if}"),
        vec![
            t(Html, "a "),
            t(OpenDelimiter, "{"),
            t(Latte, "if $x"),
            t(CloseDelimiter, "}"),
            t(Html, "b"),
            t(OpenDelimiter, "{"),
            t(Latte, "/if"),
            t(CloseDelimiter, "}"),
        ]
    );
}

#[test]
fn spans_point_into_source() {
    let source = "ab{foreach $items as $item}";
    let tokens = Lexer::new(source, 0).tokenize().tokens;
    for token in &tokens {
        assert_eq!(&source[token.span.clone()], token.text);
    }
    assert_eq!(tokens[2].span, 3..26);
}

#[test]
fn braces_followed_by_whitespace_are_html() {
    let source = "<script>function f() { return { a: 1 }; }</script>";
    assert_eq!(lex(source), vec![t(TopTokenKind::Html, source)]);
}

#[test]
fn empty_braces_and_quotes_are_html() {
    assert_eq!(lex("{}"), vec![t(TopTokenKind::Html, "{}")]);
    assert_eq!(lex("{'a'}"), vec![t(TopTokenKind::Html, "{'a'}")]);
    assert_eq!(lex("x{"), vec![t(TopTokenKind::Html, "x{")]);
}

#[test]
fn comments() {
    use TopTokenKind::*;
    assert_eq!(
        lex("{* {if} *}x"),
        vec![
            t(CommentDelimiter, "{*"),
            t(Comment, " {if} "),
            t(CommentDelimiter, "*}"),
            t(Html, "x"),
        ]
    );
    assert_eq!(
        lex("{**}"),
        vec![t(CommentDelimiter, "{*"), t(CommentDelimiter, "*}")]
    );
}

#[test]
fn unterminated_comment() {
    let lexed = Lexer::new("ok{* never", 0).tokenize();
    assert_eq!(
        lexed.tokens.last().map(|t| (t.kind, t.text.as_str())),
        Some((TopTokenKind::Error, "{* never"))
    );
    assert_eq!(lexed.errors.len(), 1);
    assert_eq!(lexed.errors[0].kind, ErrorKind::UnterminatedComment);
    assert_eq!(lexed.errors[0].span, 2..4);
}

#[test]
fn unterminated_macro() {
    let lexed = Lexer::new("{if $x", 4).tokenize();
    assert_eq!(lexed.tokens.len(), 1);
    assert!(lexed.tokens[0].is(TopTokenKind::Error));
    assert_eq!(lexed.errors.len(), 1);
    assert_eq!(lexed.errors[0].kind, ErrorKind::UnterminatedMacro);
    assert_eq!(lexed.errors[0].span, 0..1);
    assert_eq!(lexed.errors[0].file_id, 4);
}

#[test]
fn close_delimiter_inside_string_does_not_end_tag() {
    assert_eq!(
        bodies(r#"{if $a == "}"}ok{/if}"#, Syntax::Latte),
        vec![r#"if $a == "}""#, "/if"]
    );
    assert_eq!(
        bodies(r"{=  'it\'s }'}", Syntax::Latte),
        vec![r"=  'it\'s }'"]
    );
}

#[test]
fn nested_braces_inside_tag() {
    assert_eq!(bodies("{foo {bar}}x", Syntax::Latte), vec!["foo {bar}"]);
}

#[test]
fn double_syntax_switch() {
    let source = "{syntax double}{{if $x}}{$y}{{/if}}{{/syntax}}{$z}";
    assert_eq!(
        bodies(source, Syntax::Latte),
        vec!["syntax double", "if $x", "/if", "/syntax", "$z"]
    );
    assert!(lex(source).contains(&t(TopTokenKind::Html, "{$y}")));
}

#[test]
fn syntax_off_until_terminator() {
    let source = "{syntax off}{if}{/syntax}{if}";
    assert_eq!(
        bodies(source, Syntax::Latte),
        vec!["syntax off", "/syntax", "if"]
    );
    assert!(lex(source).contains(&t(TopTokenKind::Html, "{if}")));
}

#[test]
fn syntax_off_without_terminator() {
    assert_eq!(
        lex("{syntax off}{if}"),
        vec![
            t(TopTokenKind::OpenDelimiter, "{"),
            t(TopTokenKind::Latte, "syntax off"),
            t(TopTokenKind::CloseDelimiter, "}"),
            t(TopTokenKind::Html, "{if}"),
        ]
    );
}

#[test]
fn unknown_syntax_keeps_current() {
    assert_eq!(
        bodies("{syntax klingon}{if}{/if}", Syntax::Latte),
        vec!["syntax klingon", "if", "/if"]
    );
}

#[test]
fn initial_syntax_is_never_popped() {
    assert_eq!(
        bodies("{{/syntax}}{{if}}", Syntax::Double),
        vec!["/syntax", "if"]
    );
}

#[test]
fn asp_and_python_syntaxes() {
    assert_eq!(bodies("<%if $a%>x<%/if%>", Syntax::Asp), vec!["if $a", "/if"]);
    assert_eq!(
        bodies("{% if $a %}{{ $a }}{% /if %}", Syntax::Python),
        vec![" if $a ", " $a ", " /if "]
    );
}

#[test]
fn markup_macro_start_and_operands() {
    use MarkupTokenKind::*;
    assert_eq!(
        markup_kinds("if $x > 1.5"),
        vec![
            m(MacroStart, "if"),
            m(Whitespace, " "),
            m(Variable, "$x"),
            m(Whitespace, " "),
            m(Char, ">"),
            m(Whitespace, " "),
            m(Number, "1.5"),
        ]
    );
}

#[test]
fn markup_macro_end_forms() {
    use MarkupTokenKind::*;
    assert_eq!(markup_kinds("/foreach"), vec![m(MacroEnd, "/foreach")]);
    assert_eq!(markup_kinds("/"), vec![m(MacroEnd, "/")]);
    assert_eq!(markup_kinds(" /if "), vec![
        m(Whitespace, " "),
        m(MacroEnd, "/if"),
        m(Whitespace, " "),
    ]);
}

#[test]
fn markup_print_shortcuts() {
    use MarkupTokenKind::*;
    assert_eq!(
        markup_kinds("$var|upper"),
        vec![m(Variable, "$var"), m(Char, "|"), m(Symbol, "upper")]
    );
    assert_eq!(
        markup_kinds("foo()"),
        vec![m(Symbol, "foo"), m(Char, "("), m(Char, ")")]
    );
    assert_eq!(markup_kinds("=$a"), vec![m(MacroStart, "="), m(Variable, "$a")]);
    assert_eq!(
        markup_kinds("_'Hello'"),
        vec![m(MacroStart, "_"), m(String, "'Hello'")]
    );
}

#[test]
fn markup_dotted_macro_names() {
    assert_eq!(
        markup_kinds("ifCurrent 'Page:'")[0],
        m(MarkupTokenKind::MacroStart, "ifCurrent")
    );
    assert_eq!(
        markup_kinds("form.label x")[0],
        m(MarkupTokenKind::MacroStart, "form.label")
    );
}

#[test]
fn markup_keywords_casts_and_errors() {
    use MarkupTokenKind::*;
    assert_eq!(
        markup_kinds("if (int) $a and TRUE"),
        vec![
            m(MacroStart, "if"),
            m(Whitespace, " "),
            m(Cast, "(int)"),
            m(Whitespace, " "),
            m(Variable, "$a"),
            m(Whitespace, " "),
            m(Keyword, "and"),
            m(Whitespace, " "),
            m(Keyword, "TRUE"),
        ]
    );
    assert_eq!(
        markup_kinds("= 'open"),
        vec![m(MacroStart, "="), m(Whitespace, " "), m(Error, "'open")]
    );
}

#[test]
fn markup_offsets_are_absolute() {
    let tokens: Vec<Token<MarkupTokenKind>> = markup::tokenize("/if", 11);
    assert_eq!(tokens[0].span, 11..14);
}
