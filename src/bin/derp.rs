//! derp CLI tool
//!
//! Matches an input string against a grammar and prints `true` or `false`.

use clap::Parser;
use derp::{write_dot, GrammarError, MatchConfig, Rules, SUMS};
use log::{debug, LevelFilter};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "derp")]
#[command(about = "Recognize input with parsing with derivatives", long_about = None)]
struct Args {
    /// Text to recognize
    #[arg(value_name = "INPUT")]
    input: String,

    /// Grammar file (defaults to the sums grammar S: "1" | S, "+", S.)
    #[arg(short, long, value_name = "FILE")]
    grammar: Option<PathBuf>,

    /// Rule to start from (defaults to the first rule)
    #[arg(short, long, value_name = "RULE")]
    start: Option<String>,

    /// Write the residual grammar as Graphviz DOT
    #[arg(long, value_name = "FILE")]
    dot: Option<PathBuf>,

    /// Never reclaim orphaned nodes while matching
    #[arg(long)]
    no_collect: bool,

    /// Log grammar sizes at every step (needs -v)
    #[arg(long)]
    trace_sizes: bool,

    /// More output per occurrence (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

fn run(args: &Args) -> Result<bool, CliError> {
    let mut rules = match &args.grammar {
        Some(path) => {
            let src = fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            Rules::parse(&src)?
        }
        None => Rules::parse(SUMS)?,
    };

    let start = match &args.start {
        Some(name) => rules
            .rule(name)
            .ok_or_else(|| GrammarError::UnknownStart(name.clone()))?,
        None => rules.start(),
    };

    let mut config = MatchConfig::new().with_trace_sizes(args.trace_sizes);
    if args.no_collect {
        config = config.with_collect_threshold(None);
    }

    let m = rules
        .grammar_mut()
        .match_str_with(&config, start, &args.input);
    debug!("residual grammar is {}", m.residual);

    if let Some(path) = &args.dot {
        let io_err = |source| CliError::Io {
            path: path.clone(),
            source,
        };
        let mut w = BufWriter::new(File::create(path).map_err(io_err)?);
        write_dot(rules.grammar(), m.residual, &mut w).map_err(io_err)?;
        w.flush().map_err(io_err)?;
    }

    Ok(m.accepted)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(&args) {
        Ok(accepted) => {
            println!("{}", accepted);
            if accepted {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}
