//! Semantic layer: scopes, symbols, resolution and diagnostics.
//!
//! The resolver annotates a parsed [`CompilationUnit`](crate::syntax::CompilationUnit)
//! in place and returns its [`SymbolTable`]. Everything it finds is a
//! [`Diagnostic`]; nothing here aborts.

mod diagnostics;
mod resolve;
mod scope;
mod symbols;

pub use diagnostics::{Diagnostic, DiagnosticOrigin, RelatedInfo, Severity, codes};
pub use resolve::{
    DataAreaDefinition, DefinitionSet, ExternalDefinitions, NoExternalDefinitions, Resolution,
    ScopeResolver,
};
pub use scope::{ScopeError, VariableScope};
pub use symbols::{
    Lookup, NewSymbol, SymbolId, SymbolKind, SymbolOrigin, SymbolTable, VariableSymbol,
};
