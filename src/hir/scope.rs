//! Variable scopes and their mapping from scope keywords.

use std::fmt;

use thiserror::Error;

use crate::parser::SyntaxKind;

/// Visibility and lifetime class of a variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VariableScope {
    Local,
    Global,
    Parameter,
    Independent,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// The kind is outside the mapping's domain.
    #[error("scope mapping failed: {0:?} does not map to a variable scope")]
    UnmappedScopeKind(SyntaxKind),
}

impl VariableScope {
    /// Maps a scope keyword to its scope.
    ///
    /// Only `LOCAL`, `GLOBAL` and `PARAMETER` are in the domain. Everything
    /// else fails, `INDEPENDENT` included: independent variables are
    /// assigned their scope by the resolver, not through this mapping.
    pub fn from_syntax_kind(kind: SyntaxKind) -> Result<Self, ScopeError> {
        match kind {
            SyntaxKind::LOCAL => Ok(VariableScope::Local),
            SyntaxKind::GLOBAL => Ok(VariableScope::Global),
            SyntaxKind::PARAMETER => Ok(VariableScope::Parameter),
            other => Err(ScopeError::UnmappedScopeKind(other)),
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            VariableScope::Local => "LOCAL",
            VariableScope::Global => "GLOBAL",
            VariableScope::Parameter => "PARAMETER",
            VariableScope::Independent => "INDEPENDENT",
        }
    }
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
