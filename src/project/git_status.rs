//! Turns version-control status lines into file selections.
//!
//! Accepts `git status --porcelain` style lines such as `M path`,
//! `R90 old -> new` or `D path`. Deleted files are never selected: there is
//! nothing left to analyse.

use super::file::{NaturalFile, normalize_relative_path};
use super::model::NaturalProject;

/// Selects the project file at one project-relative path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePredicate {
    relative_path: String,
}

impl FilePredicate {
    pub fn new(relative_path: &str) -> Self {
        Self {
            relative_path: normalize_relative_path(relative_path),
        }
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn matches(&self, file: &NaturalFile) -> bool {
        normalize_relative_path(&file.relative_path) == self.relative_path
    }
}

/// One predicate per changed file that still exists, in input order.
///
/// Renames and copies select their destination only.
pub fn parse_status_to_predicates(lines: &[&str]) -> Vec<FilePredicate> {
    lines
        .iter()
        .filter_map(|line| {
            let (status, rest) = line.trim().split_once(char::is_whitespace)?;
            if status.contains('D') {
                return None;
            }
            let rest = rest.trim();
            let path = if status.starts_with('R') || status.starts_with('C') {
                rest.split_once("->").map_or(rest, |(_, to)| to.trim())
            } else {
                rest
            };
            let path = unquote(path);
            (!path.is_empty()).then(|| FilePredicate::new(path))
        })
        .collect()
}

fn unquote(path: &str) -> &str {
    path.strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(path)
}

/// Project files selected by any of `predicates`.
pub fn select_files<'p>(
    project: &'p NaturalProject,
    predicates: &[FilePredicate],
) -> Vec<&'p NaturalFile> {
    project
        .files()
        .filter(|file| predicates.iter().any(|p| p.matches(file)))
        .collect()
}
