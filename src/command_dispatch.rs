//! Purpose: Hold top-level CLI command dispatch for `edgeframe`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Each command writes at most one JSON document to stdout.

use std::io::Read;

use clap::CommandFactory;
use edgeframe::core::device::DeviceStore;
use edgeframe::core::env::{Environment, ServerEnvironment, Viewport, WindowSnapshot};
use edgeframe::json::{parse_json5, try_parse_json};

use super::*;

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "edgeframe", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Serve {
            bind,
            api_prefix,
            allow_non_loopback,
        } => {
            let config = serve::ServeConfig {
                bind,
                api_prefix,
                allow_non_loopback,
            };
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to start runtime")
                        .with_source(err)
                })?;
            runtime.block_on(serve::serve(config))?;
            Ok(RunOutcome::ok())
        }
        Command::Parse { text, strict } => {
            let text = match text {
                Some(text) => text,
                None => read_stdin()?,
            };
            let value = if strict {
                parse_json5(&text).map_err(|failure| {
                    Error::new(ErrorKind::Usage)
                        .with_message(format!("invalid JSON5 input: {failure}"))
                        .with_hint("Drop --strict to print null for unparseable input.")
                })?
            } else {
                try_parse_json::<Value>(Some(text.as_str())).unwrap_or(Value::Null)
            };
            emit_json(&value);
            Ok(RunOutcome::ok())
        }
        Command::Device {
            width,
            height,
            nested,
            forced,
            ssr,
        } => {
            let env: Box<dyn Environment> = if ssr {
                Box::new(ServerEnvironment)
            } else {
                let viewport = Viewport::new(width, height);
                if nested {
                    Box::new(WindowSnapshot::nested(viewport))
                } else {
                    Box::new(WindowSnapshot::top_level(viewport))
                }
            };
            let mut store = DeviceStore::new(env);
            store.set_forced_embedded(forced);
            let snapshot = serde_json::to_value(store.snapshot()).map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to encode device snapshot")
                    .with_source(err)
            })?;
            emit_json(&snapshot);
            Ok(RunOutcome::ok())
        }
    }
}

fn read_stdin() -> Result<String, Error> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read stdin")
            .with_hint("Pass the text as an argument instead.")
            .with_source(err)
    })?;
    Ok(text)
}
