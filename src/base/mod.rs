//! Foundation types for the natparse toolchain.
//!
//! - [`FileId`] - project file handles
//! - [`TextRange`], [`TextSize`] - byte positions
//! - [`LineCol`], [`LineIndex`] - line/column conversion
//!
//! This module has NO dependencies on other natparse modules.

mod file_id;
mod span;

pub use file_id::FileId;
pub use span::{LineCol, LineIndex, TextRange, TextSize};

pub use text_size;
