use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use unpack::frontend::{self, ast::Stmt};
use unpack::interpreter::sink::Stdout;
use unpack::{Engine, Error, Result};

#[derive(Parser)]
#[command(name = "unpack")]
#[command(about = "Runs scripts that unpack sequences into variables")]
#[command(version)]
#[command(after_help = "EXAMPLES:
    unpack demos/pair.unp             Run a script
    unpack -e 'x, y = 4, 5; print y'  Run source given on the command line
    unpack --dump-ast demos/nested.unp

Set RUST_LOG (e.g. RUST_LOG=unpack=debug) to override -v.")]
struct Cli {
    /// Scripts to run, in order; each gets a fresh scope
    #[arg(required_unless_present = "eval")]
    files: Vec<PathBuf>,

    /// Run this source text instead of files
    #[arg(short, long, value_name = "SOURCE", conflicts_with = "files")]
    eval: Option<String>,

    /// Print the parsed statements as s-expressions instead of running them
    #[arg(long)]
    dump_ast: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(std::io::stderr)
        .init();

    process::exit(run_all(&cli));
}

/// Runs every requested script in order and returns the exit code
fn run_all(cli: &Cli) -> i32 {
    let sources = match &cli.eval {
        Some(source) => vec![(String::from("<eval>"), Ok(source.clone()))],
        None => cli
            .files
            .iter()
            .map(|path| {
                let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
                    path: path.clone(),
                    source,
                });
                (path.display().to_string(), source)
            })
            .collect(),
    };

    for (filename, source) in sources {
        let source = match source {
            Ok(source) => source,
            Err(err) => {
                eprintln!("{}", err);
                return 1;
            }
        };

        if let Err(err) = run(&filename, &source, cli.dump_ast) {
            debug!(file = %filename, ?err, "script failed");
            eprintln!("{}", err.report(&filename, &source));
            return 1;
        }
    }
    0
}

fn run(filename: &str, source: &str, dump_ast: bool) -> Result<()> {
    if dump_ast {
        let stmts = frontend::parse(source).map_err(Error::Parse)?;
        println!("{}", Stmt::pretty_print(&stmts));
        return Ok(());
    }

    info!(file = %filename, "running");
    Engine::new(Stdout).run(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn exit_code(args: &[&str]) -> i32 {
        let cli = Cli::try_parse_from(std::iter::once("unpack").chain(args.iter().copied()))
            .unwrap();
        run_all(&cli)
    }

    #[test]
    fn demos_exit_codes() {
        assert_eq!(exit_code(&["demos/pair.unp"]), 0);
        assert_eq!(exit_code(&["demos/nested.unp", "demos/string.unp"]), 0);
        assert_eq!(exit_code(&["demos/mismatch.unp"]), 1);
        // the mismatch stops the run before the last file
        assert_eq!(exit_code(&["demos/mismatch.unp", "demos/discard.unp"]), 1);
    }

    #[test]
    fn unreadable_file() {
        assert_eq!(exit_code(&["demos/pair.unp", "demos/missing.unp"]), 1);
    }

    #[test]
    fn eval_source() {
        assert_eq!(exit_code(&["-e", "x, y = 4, 5; print y"]), 0);
        assert_eq!(exit_code(&["--eval", "x, y = 4,"]), 1);
        assert_eq!(exit_code(&["-e", "x = ("]), 1);
    }

    #[test]
    fn dump_ast_does_not_run() {
        assert_eq!(exit_code(&["--dump-ast", "demos/mismatch.unp"]), 0);
        assert_eq!(exit_code(&["--dump-ast", "-e", "x = ]"]), 1);
    }

    #[test]
    fn usage_errors() {
        let err = Cli::try_parse_from(["unpack", "-e", "print 1", "demos/pair.unp"])
            .err()
            .map(|e| e.kind());
        assert_eq!(err, Some(ErrorKind::ArgumentConflict));

        let err = Cli::try_parse_from(["unpack"]).err().map(|e| e.kind());
        assert_eq!(err, Some(ErrorKind::MissingRequiredArgument));

        let cli = Cli::try_parse_from(["unpack", "-vv", "demos/pair.unp"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.dump_ast);
    }
}
