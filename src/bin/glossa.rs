//! `glossa` CLI front end: reads a source file, compiles it under a selected language's keyword
//! table, and runs it to completion.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use log::{error, Level, LevelFilter};

use glossa::pipeline;
use glossa::vm::InputProvider;

#[derive(ClapParser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// The path to the source file to run.
    #[arg(index = 1, required_unless_present = "list_languages")]
    file: Option<PathBuf>,

    /// Language code to lex and compile keywords under (see `--list-languages`).
    #[arg(short, long, default_value = "en")]
    lang: String,

    /// Print every registered language code and name, then exit.
    #[arg(long = "list-languages")]
    list_languages: bool,

    /// Stop execution after this many instructions rather than letting a runaway loop spin
    /// forever.
    #[arg(long)]
    budget: Option<usize>,

    /// Increase logging verbosity. May be repeated (`-v`, `-vv`).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Reads one line at a time from process stdin for the `INPUT` instruction.
struct StdinInput {
    stdin: io::Stdin,
}

impl InputProvider for StdinInput {
    fn next_line(&mut self) -> String {
        let mut line = String::new();
        match self.stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => String::new(),
            Ok(_) => line.trim_end_matches(['\n', '\r']).to_string(),
        }
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let level = match args.verbose {
        0 => Level::Warn,
        1 => Level::Info,
        _ => Level::Trace,
    };
    simple_logger::init_with_level(level).expect("logger should only be initialized once");
    log::set_max_level(LevelFilter::Trace);

    if args.list_languages {
        for entry in pipeline::list_languages() {
            println!("{}\t{}", entry.code, entry.name);
        }
        return ExitCode::SUCCESS;
    }

    let file = args.file.expect("clap enforces file unless --list-languages is set");
    let source = match std::fs::read_to_string(&file) {
        Ok(source) => source,
        Err(e) => {
            error!("could not read file '{}': {e}", file.display());
            return ExitCode::FAILURE;
        }
    };

    let program = match pipeline::compile(&source, &args.lang) {
        Ok(program) => program,
        Err(diagnostic) => {
            error!("{diagnostic}");
            return ExitCode::FAILURE;
        }
    };

    let mut io = StdinInput { stdin: io::stdin() };
    let result = match args.budget {
        Some(budget) => pipeline::run_with_budget(&program, &mut io, budget),
        None => pipeline::run(&program, &mut io),
    };

    match result {
        Ok(result) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            for line in result.output_lines {
                let _ = writeln!(handle, "{line}");
            }
            ExitCode::SUCCESS
        }
        Err(runtime_error) => {
            error!("{runtime_error}");
            ExitCode::FAILURE
        }
    }
}
