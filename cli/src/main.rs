mod config;
mod error;
mod report;
mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;

use latte::lexer::{Lexer, markup};
use latte::{ParseError, TopTokenKind};

use crate::config::Config;
use crate::error::CliError;
use crate::report::Format;

const SUBCOMMANDS: &[&str] = &["check", "tokens", "test", "help"];

#[derive(Parser)]
#[command(name = "latte-check", version, about = "Latte template macro balance checker")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Config file (default: ./latte-check.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check macro balance in templates
    Check(CheckArgs),

    /// Dump the token stream of a template
    Tokens(TokensArgs),

    /// Run .test.latte fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Template files to check
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Human)]
    format: Format,

    /// Initial delimiter syntax (latte, double, asp, python, off)
    #[arg(long)]
    syntax: Option<String>,
}

#[derive(clap::Args)]
struct TokensArgs {
    /// Template file to tokenize
    file: PathBuf,

    /// Also break macro bodies into markup tokens
    #[arg(long)]
    markup: bool,

    /// Initial delimiter syntax
    #[arg(long)]
    syntax: Option<String>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.latte file or directory containing them
    path: PathBuf,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // `latte-check page.latte` works like `latte-check check page.latte`.
    let mut args: Vec<String> = std::env::args().collect();
    inject_default_subcommand(&mut args);

    let cli = Cli::parse_from(&args);
    init_logging(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let exit_code = match cli.command {
        Command::Check(check_args) => do_check(check_args, &config, cli.no_color),
        Command::Tokens(tokens_args) => do_tokens(tokens_args, &config),
        Command::Test(test_args) => {
            if test_args.list_categories {
                test_runner::list_categories(&test_args.path);
                0
            } else {
                test_runner::run_tests(
                    &test_args.path,
                    cli.no_color,
                    &test_args.category,
                    &config,
                )
            }
        }
    };
    process::exit(exit_code);
}

/// Insert `check` before the first positional argument unless it is already a subcommand.
fn inject_default_subcommand(args: &mut Vec<String>) {
    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        if arg == "--config" {
            i += 2;
            continue;
        }
        if arg.starts_with('-') {
            i += 1;
            continue;
        }
        if !SUBCOMMANDS.contains(&arg) {
            args.insert(i, "check".to_string());
        }
        return;
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn do_check(args: CheckArgs, config: &Config, no_color: bool) -> i32 {
    let syntax = match config.syntax(args.syntax.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };
    let pair_macros = config.pair_macros();

    let mut files = SimpleFiles::new();
    let mut errors: Vec<ParseError> = Vec::new();
    let mut unreadable = 0usize;

    for path in &args.files {
        let source = match read_source(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {}", e);
                unreadable += 1;
                continue;
            }
        };
        let file_id = files.add(path.display().to_string(), source.clone());

        let result = latte::Parser::new(source, file_id)
            .with_syntax(syntax)
            .with_pair_macros(pair_macros.clone())
            .parse();
        tracing::info!(
            file = %path.display(),
            errors = result.errors.len(),
            "checked"
        );
        errors.extend(result.errors);
    }

    match args.format {
        Format::Human => {
            let color_choice = if no_color {
                ColorChoice::Never
            } else {
                ColorChoice::Auto
            };
            let writer = StandardStream::stderr(color_choice);
            report::emit_human(&writer, &term::Config::default(), &files, &errors);
            if errors.is_empty() && unreadable == 0 {
                eprintln!("ok: {} file(s) checked", args.files.len());
            }
        }
        Format::Json => {
            let json = report::to_json(&files, &errors);
            match serde_json::to_string_pretty(&json) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("error: cannot serialize diagnostics: {}", e);
                    return 1;
                }
            }
        }
    }

    if errors.is_empty() && unreadable == 0 { 0 } else { 1 }
}

fn do_tokens(args: TokensArgs, config: &Config) -> i32 {
    let syntax = match config.syntax(args.syntax.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };
    let source = match read_source(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };

    let lexed = Lexer::new(&source, 0).with_syntax(syntax).tokenize();
    for token in &lexed.tokens {
        println!(
            "{:<18} {}..{} {:?}",
            token.kind.to_string(),
            token.span.start,
            token.span.end,
            token.text
        );
        if args.markup && token.is(TopTokenKind::Latte) {
            for inner in markup::tokenize(&token.text, token.span.start) {
                println!(
                    "    {:<14} {}..{} {:?}",
                    inner.kind.to_string(),
                    inner.span.start,
                    inner.span.end,
                    inner.text
                );
            }
        }
    }
    for error in &lexed.errors {
        eprintln!("error: {}", error);
    }
    0
}

fn read_source(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))
}
