//! # natparse-base
//!
//! Core library for Natural 4GL: lexing, parsing, scope resolution,
//! project modelling and analyzers.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide      → AnalysisHost, configuration, project runs
//!   ↓
//! lint     → Analyzer trait, registry, built-in analyzers
//!   ↓
//! project  → libraries, steplibs, build files, DDMs, loader, git status
//!   ↓
//! hir      → symbol tables, scope resolution, diagnostics
//!   ↓
//! syntax   → typed AST, traversal, structure projections
//!   ↓
//! parser   → logos lexer + recursive descent parser
//!   ↓
//! base     → primitives (FileId, TextRange, LineIndex)
//! ```

/// Foundation types: FileId, ranges, line index
pub mod base;

/// Lexer and parser
pub mod parser;

/// Typed syntax tree
pub mod syntax;

/// Symbols, scope resolution and diagnostics
pub mod hir;

/// Libraries, files, build files and DDMs
pub mod project;

/// Analyzers over resolved units
pub mod lint;

/// Analysis host and configuration
pub mod ide;

pub use base::{FileId, LineCol, LineIndex, TextRange, TextSize};
pub use hir::{Diagnostic, Severity};
pub use parser::{Parse, parse};
