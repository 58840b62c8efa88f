use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use phpcursor::config::Config;
use phpcursor::errors::{EXIT_FAILURE, EXIT_SUCCESS};
use phpcursor::query::{
    QueryEngine, QueryMode, QueryRequest, Response, ResponseResult, SourceInput,
};

/// Cursor-position queries over PHP source.
///
/// Prints one JSON line `{"success": bool, "result": ...}` on stdout.
#[derive(Parser, Debug)]
#[command(name = "phpcursor", version, about)]
struct Cli {
    /// Configuration file layered over the user configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the constructs enclosing an offset, outermost first
    ScopeChain(ScopeChainArgs),

    /// Describe the innermost call enclosing an offset
    Invocation(SourceArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// PHP file to examine
    #[arg(long, visible_alias = "source")]
    file: Option<PathBuf>,

    /// Read the PHP source from standard input instead of a file
    #[arg(long)]
    stdin: bool,

    /// Byte offset into the source
    #[arg(long)]
    offset: Option<u32>,
}

impl SourceArgs {
    fn source(&self) -> Option<SourceInput> {
        if self.stdin {
            Some(SourceInput::Stdin)
        } else {
            self.file.clone().map(SourceInput::File)
        }
    }
}

#[derive(Args, Debug)]
struct ScopeChainArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Return a single dot-joined selector string instead of a list
    #[arg(long)]
    as_selector: bool,

    /// Treat --offset as a character offset instead of a byte offset
    #[arg(long)]
    charoffset: bool,
}

impl Command {
    fn request(&self) -> QueryRequest {
        match self {
            Command::ScopeChain(args) => QueryRequest {
                mode: Some(QueryMode::ScopeChain),
                source: args.source.source(),
                offset: args.source.offset,
                as_selector: args.as_selector,
                char_offset: args.charoffset,
            },
            Command::Invocation(args) => QueryRequest {
                mode: Some(QueryMode::Invocation),
                source: args.source(),
                offset: args.offset,
                ..QueryRequest::default()
            },
        }
    }
}

fn emit(response: &Response) -> ExitCode {
    match response.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("failed to serialize response: {e}");
            println!("{{}}");
            return ExitCode::from(EXIT_FAILURE as u8);
        }
    }

    let code = if response.success {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    };
    ExitCode::from(code as u8)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            phpcursor::logging::init(&Default::default());
            tracing::error!("{e}");
            return emit(&Response {
                success: false,
                result: ResponseResult::Message(e.to_string()),
            });
        }
    };

    phpcursor::logging::init(&config.logging);

    let engine = QueryEngine::new(config.scan.options());
    let outcome = engine.run(&cli.command.request());
    if let Err(e) = &outcome {
        tracing::warn!("query failed: {e}");
    }

    emit(&Response::from_outcome(outcome))
}
