//! Jack Compiler Library
//!
//! Provides compilation from .jack source to Hack VM bytecode. One class
//! per file; the output is a `.vm` text file next to its source.
//!
//! ```rust,ignore
//! use std::path::Path;
//!
//! let written = jackc::compile_file(Path::new("Main.jack"))?;
//! println!("wrote {}", written.display());
//! ```

pub mod cursor;
pub mod engine;
pub mod error;
pub mod symbols;
pub mod tokenizer;
pub mod writer;
pub mod xml;

pub use cursor::TokenCursor;
pub use engine::CompilationEngine;
pub use error::CompileError;
pub use symbols::{Symbol, SymbolKind, SymbolTable};
pub use tokenizer::{Token, TokenKind, tokenize};
pub use writer::{Arithmetic, Segment, VmWriter};

use std::fs;
use std::path::{Path, PathBuf};

/// Compile one class from source text to VM command text.
pub fn compile_source(source: &str) -> Result<String, CompileError> {
    let tokens = tokenize(source)?;
    CompilationEngine::new(tokens).compile()
}

/// Compile a `.jack` file and write the `.vm` file next to it.
///
/// The bytecode is buffered in memory and only written after the whole
/// class compiled, so a failed compilation leaves no partial output.
/// Returns the path of the written file.
pub fn compile_file(source_path: &Path) -> Result<PathBuf, CompileError> {
    let source = fs::read_to_string(source_path)?;
    let bytecode = compile_source(&source)?;
    let output_path = source_path.with_extension("vm");
    fs::write(&output_path, bytecode)?;
    Ok(output_path)
}

/// Write the token stream of a `.jack` file as XML markup next to it.
///
/// Debug pass, independent of code generation.
pub fn dump_tokens_file(source_path: &Path) -> Result<PathBuf, CompileError> {
    let source = fs::read_to_string(source_path)?;
    let tokens = tokenize(&source)?;
    let output_path = source_path.with_extension("xml");
    fs::write(&output_path, xml::tokens_to_xml(&tokens))?;
    Ok(output_path)
}

/// Immediate `*.jack` children of a directory, sorted for a deterministic
/// compilation order. Not recursive.
pub fn collect_jack_files(dir: &Path) -> Result<Vec<PathBuf>, CompileError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "jack") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
