use std::io::{self, Write};
use std::process::ExitCode;
use std::thread;

use clap::{Parser, ValueEnum};
use snafu::ResultExt;
use stackcc::config::validate_symbol;
use stackcc::error::OutputSnafu;
use stackcc::{CompileResult, Options, Syntax, codegen, parser, tokenizer};
use tracing::Level;

/// Stack for the compiling thread. A single argument tops out near 128 KiB,
/// i.e. a left-leaning chain of about 65 000 operators, and code generation,
/// printing and dropping the tree all recurse once per level.
const COMPILER_STACK_SIZE: usize = 64 * 1024 * 1024;

/// What to print on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
  /// The assembly listing
  Asm,
  /// One token per line
  Tokens,
  /// The parsed tree in prefix form
  Ast,
}

/// Compile a single arithmetic expression into x86-64 stack-machine assembly
#[derive(Debug, Parser)]
#[command(name = "stackcc", version)]
struct Args {
  /// Expression to compile, e.g. "(1+2)*3>=9"
  #[arg(allow_hyphen_values = true)]
  expr: String,

  /// Assembly dialect: intel or att
  #[arg(short, long, default_value_t = Syntax::Intel)]
  syntax: Syntax,

  /// Global symbol the listing is emitted under
  #[arg(short, long, default_value = "main", value_parser = validate_symbol)]
  entry: String,

  /// Output to produce
  #[arg(long, value_enum, default_value_t = Emit::Asm)]
  emit: Emit,

  /// Enable debug logging on stderr
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> ExitCode {
  let args = match Args::try_parse() {
    Ok(args) => args,
    Err(err) => {
      let _ = err.print();
      // --help and --version land here too and are not failures.
      return if err.use_stderr() {
        ExitCode::FAILURE
      } else {
        ExitCode::SUCCESS
      };
    }
  };

  init_logging(args.verbose);

  let compiler = thread::Builder::new()
    .name("compiler".to_string())
    .stack_size(COMPILER_STACK_SIZE)
    .spawn(move || run(&args));
  let handle = match compiler {
    Ok(handle) => handle,
    Err(err) => {
      eprintln!("failed to start compiler thread: {err}");
      return ExitCode::FAILURE;
    }
  };

  match handle.join() {
    Ok(Ok(())) => ExitCode::SUCCESS,
    Ok(Err(err)) => {
      eprintln!("{err}");
      ExitCode::FAILURE
    }
    // The panic hook has already reported it.
    Err(_) => ExitCode::FAILURE,
  }
}

fn init_logging(verbose: bool) {
  let level = if verbose { Level::DEBUG } else { Level::WARN };
  tracing_subscriber::fmt()
    .with_max_level(level)
    .with_writer(io::stderr)
    .with_target(false)
    .without_time()
    .init();
}

fn run(args: &Args) -> CompileResult<()> {
  let options = Options {
    syntax: args.syntax,
    entry: args.entry.clone(),
  };
  tracing::debug!(
    expr = %args.expr,
    syntax = %options.syntax,
    entry = %options.entry,
    "compiling"
  );

  let tokens = tokenizer::tokenize(&args.expr)?;
  let program = parser::parse(tokens.clone(), &args.expr)?;

  let text = match args.emit {
    Emit::Tokens => tokens.iter().map(|token| format!("{token}\n")).collect::<String>(),
    Emit::Ast => format!("{program}\n"),
    Emit::Asm => codegen::render(&codegen::generate(&program), &options),
  };

  let mut stdout = io::stdout().lock();
  stdout.write_all(text.as_bytes()).context(OutputSnafu)?;
  stdout.flush().context(OutputSnafu)
}
