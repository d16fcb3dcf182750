//! Jack Compiler CLI
//!
//! Command-line interface for compiling .jack sources to VM bytecode.
//! Accepts a single file or a directory; for a directory every immediate
//! `*.jack` child is compiled and a failure on one file does not stop the
//! rest.

use clap::{CommandFactory, Parser as ClapParser, error::ErrorKind};
use clap_complete::{Shell, generate};
use std::io;
use std::path::{Path, PathBuf};
use std::process;

#[derive(ClapParser)]
#[command(name = "jackc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Jack compiler - compile .jack sources to VM bytecode", long_about = None)]
struct Cli {
    /// Input .jack file or directory of .jack files
    path: Option<PathBuf>,

    /// Also write each file's token stream as XML markup next to it
    #[arg(long)]
    dump_tokens: bool,

    /// Generate a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        run_completions(shell);
        return;
    }

    let Some(path) = cli.path else {
        Cli::command()
            .error(ErrorKind::MissingRequiredArgument, "PATH is required")
            .exit();
    };

    process::exit(run(&path, cli.dump_tokens));
}

fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "jackc", &mut io::stdout());
}

fn run(path: &Path, dump_tokens: bool) -> i32 {
    if path.is_dir() {
        let files = match jackc::collect_jack_files(path) {
            Ok(files) => files,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                return 1;
            }
        };
        if files.is_empty() {
            eprintln!("warning: no .jack files in {}", path.display());
            return 0;
        }
        let mut failures = 0;
        for file in &files {
            if !compile_one(file, dump_tokens) {
                failures += 1;
            }
        }
        if failures > 0 { 1 } else { 0 }
    } else if compile_one(path, dump_tokens) {
        0
    } else {
        1
    }
}

/// Compile one file, reporting the outcome. Returns false on failure.
fn compile_one(path: &Path, dump_tokens: bool) -> bool {
    if dump_tokens {
        match jackc::dump_tokens_file(path) {
            Ok(output) => println!("Tokens {} -> {}", path.display(), output.display()),
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                return false;
            }
        }
    }
    match jackc::compile_file(path) {
        Ok(output) => {
            println!("Compiled {} -> {}", path.display(), output.display());
            true
        }
        Err(e) => {
            eprintln!("{}: {}", path.display(), e);
            false
        }
    }
}
