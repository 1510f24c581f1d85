//! Purpose: `edgeframe` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Commands emit compact JSON on stdout (one document per run).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::net::SocketAddr;

use clap::{Parser, Subcommand, ValueEnum, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};

mod command_dispatch;
mod serve;

use command_dispatch::dispatch_command;
use edgeframe::api::{DEFAULT_PREFIX, Error, ErrorKind, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome { exit_code });
            }
            _ => {
                return Err((usage_error_from_clap(&err), ColorMode::Auto));
            }
        },
    };

    let color_mode = cli.color;
    dispatch_command(cli.command).map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "edgeframe",
    version,
    about = "Edge API scaffold with embedded-context detection and JSON5 parsing"
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Serve the API over HTTP",
        long_about = r#"Serve the API over HTTP.

Answers GET <prefix>/ with {"message":"Hello from API"}; every other path is a JSON 404."#,
        after_help = r#"EXAMPLES
  $ edgeframe serve
  $ edgeframe serve --bind 127.0.0.1:9000 --api-prefix /v1
  $ RUST_LOG=debug edgeframe serve

NOTES
  - Binding a non-loopback address requires --allow-non-loopback"#
    )]
    Serve {
        #[arg(long, default_value = "127.0.0.1:8787", help = "Address to listen on")]
        bind: SocketAddr,
        #[arg(long, default_value = DEFAULT_PREFIX, help = "Path prefix the API is mounted under")]
        api_prefix: String,
        #[arg(long, help = "Permit binding a non-loopback address")]
        allow_non_loopback: bool,
    },
    #[command(
        about = "Parse JSON5 text",
        long_about = r#"Parse permissive JSON (JSON5) text and print it as compact JSON.

Malformed input prints `null` unless --strict is given."#,
        after_help = r#"EXAMPLES
  $ edgeframe parse "{a: 1, b: [2, 3,],}"
  $ echo "// note
  {'x': true}" | edgeframe parse
  $ edgeframe parse --strict "not json""#
    )]
    Parse {
        #[arg(help = "Inline text (reads stdin when omitted)")]
        text: Option<String>,
        #[arg(long, help = "Fail with a usage error instead of printing null")]
        strict: bool,
    },
    #[command(
        about = "Evaluate the device store for a described host",
        long_about = r#"Build a device store over a described host window and print its snapshot.

Use --ssr to evaluate with no window at all (server-side rendering)."#,
        after_help = r#"EXAMPLES
  $ edgeframe device --width 390 --height 844
  $ edgeframe device --nested
  $ edgeframe device --forced
  $ edgeframe device --ssr --forced"#
    )]
    Device {
        #[arg(long, default_value_t = 1280, help = "Viewport width")]
        width: u32,
        #[arg(long, default_value_t = 720, help = "Viewport height")]
        height: u32,
        #[arg(long, help = "Window is nested inside a foreign parent frame")]
        nested: bool,
        #[arg(long, help = "Set the manual embedded override")]
        forced: bool,
        #[arg(
            long,
            conflicts_with_all = ["nested", "width", "height"],
            help = "Evaluate without a host window"
        )]
        ssr: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        after_help = r#"EXAMPLES
  $ edgeframe completion bash > ~/.local/share/bash-completion/completions/edgeframe
  $ edgeframe completion zsh > ~/.zfunc/_edgeframe"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn emit_json(value: &Value) {
    let json = serde_json::to_string(value)
        .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let report = ErrorReport::from_error(err);
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", report.render(color_mode.use_color(is_tty)));
    } else {
        eprintln!("{}", report.to_json());
    }
}

/// Flattened view of an `Error` for stderr: JSON for pipes, labelled lines for terminals.
struct ErrorReport {
    kind: ErrorKind,
    message: String,
    hint: Option<String>,
    causes: Vec<String>,
}

impl ErrorReport {
    fn from_error(err: &Error) -> Self {
        let mut causes = Vec::new();
        let mut next = err.source();
        while let Some(cause) = next {
            causes.push(cause.to_string());
            next = cause.source();
        }
        Self {
            kind: err.kind(),
            message: err
                .message()
                .map_or_else(|| fallback_message(err.kind()).to_string(), str::to_string),
            hint: err.hint().map(str::to_string),
            causes,
        }
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("kind".to_string(), json!(format!("{:?}", self.kind)));
        body.insert("message".to_string(), json!(self.message));
        if let Some(hint) = &self.hint {
            body.insert("hint".to_string(), json!(hint));
        }
        if !self.causes.is_empty() {
            body.insert("causes".to_string(), json!(self.causes));
        }
        json!({ "error": body })
    }

    fn render(&self, use_color: bool) -> String {
        // 31 = red, 33 = yellow.
        let label = |text: &str, code: &str| {
            if use_color {
                format!("\u{1b}[{code}m{text}\u{1b}[0m")
            } else {
                text.to_string()
            }
        };
        let mut out = format!("{} {}", label("edgeframe:", "31"), self.message);
        if let Some(hint) = &self.hint {
            out.push_str(&format!("\n  {} {hint}", label("try:", "33")));
        }
        for cause in &self.causes {
            out.push_str(&format!("\n  {} {cause}", label("because:", "33")));
        }
        out
    }
}

fn fallback_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Internal => "unexpected internal failure",
        ErrorKind::Usage => "invalid arguments",
        ErrorKind::NotFound => "no such route",
        ErrorKind::Io => "input/output failure",
    }
}

/// Convert a clap parse failure into a usage error whose hint points at the
/// subcommand the user was typing, when clap's usage line names one.
fn usage_error_from_clap(err: &clap::Error) -> Error {
    let rendered = err.to_string();
    let summary = rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.strip_prefix("error:").unwrap_or(line).trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string());
    let subcommand = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: edgeframe "))
        .and_then(|rest| rest.split_whitespace().next())
        .filter(|token| !token.starts_with(['-', '<', '[']));
    let hint = match subcommand {
        Some(name) => format!("Run `edgeframe {name} --help` for accepted flags."),
        None => "Run `edgeframe --help` to list commands.".to_string(),
    };
    Error::new(ErrorKind::Usage)
        .with_message(summary)
        .with_hint(hint)
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, ErrorReport, usage_error_from_clap};
    use clap::Parser;
    use edgeframe::api::{Error, ErrorKind};

    #[test]
    fn serve_defaults_to_loopback_and_api_prefix() {
        let cli = Cli::try_parse_from(["edgeframe", "serve"]).expect("parse");
        match cli.command {
            Command::Serve {
                bind,
                api_prefix,
                allow_non_loopback,
            } => {
                assert!(bind.ip().is_loopback());
                assert_eq!(api_prefix, "/api");
                assert!(!allow_non_loopback);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn ssr_conflicts_with_nested() {
        let result = Cli::try_parse_from(["edgeframe", "device", "--ssr", "--nested"]);
        assert!(result.is_err());
    }

    #[test]
    fn error_json_includes_hint_and_causes() {
        let io = std::io::Error::other("boom");
        let err = Error::new(ErrorKind::Io)
            .with_message("failed to read stdin")
            .with_hint("Pass the text inline.")
            .with_source(io);
        let value = ErrorReport::from_error(&err).to_json();
        assert_eq!(value["error"]["kind"], "Io");
        assert_eq!(value["error"]["message"], "failed to read stdin");
        assert_eq!(value["error"]["hint"], "Pass the text inline.");
        assert_eq!(value["error"]["causes"][0], "boom");
    }

    #[test]
    fn plain_render_uses_fallback_message_and_labels() {
        let err = Error::new(ErrorKind::Usage).with_hint("Pass --bind.");
        assert_eq!(
            ErrorReport::from_error(&err).render(false),
            "edgeframe: invalid arguments\n  try: Pass --bind."
        );
    }

    #[test]
    fn clap_failures_hint_at_the_subcommand() {
        let clap_err = Cli::try_parse_from(["edgeframe", "device", "--frobnicate"])
            .err()
            .expect("unknown flag");
        let err = usage_error_from_clap(&clap_err);
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(err.hint(), Some("Run `edgeframe device --help` for accepted flags."));
        assert!(err.message().expect("message").contains("--frobnicate"));
    }
}
