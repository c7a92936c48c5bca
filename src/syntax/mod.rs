//! Typed syntax tree, traversal and statement projections.

pub mod ast;
pub mod structure;
pub mod visit;

pub use ast::{CompilationUnit, Statement, UnitKind};
pub use structure::{InputStructure, OutputStructure, Structure, StructureField};
pub use visit::{NodeKind, NodeRef, walk, walk_references_mut};
