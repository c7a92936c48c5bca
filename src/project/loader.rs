//! Loads a Natural project from disk.
//!
//! Layout:
//!
//! ```text
//! <root>/.natural or <root>/_naturalBuild      build file (optional)
//! <root>/Natural-Libraries/<LIB>/**/<FILE>     source files and DDMs
//! ```

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use super::ddm::{Ddm, DdmParser};
use super::error::{ProjectError, ProjectResult};
use super::file::NaturalFileType;
use super::model::NaturalProject;

pub const BUILD_FILE_NAMES: [&str; 2] = [".natural", "_naturalBuild"];
pub const LIBRARIES_DIR: &str = "Natural-Libraries";

/// Something that was skipped while loading.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub libraries: usize,
    pub files: usize,
    pub ddms: usize,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    fn fail(&mut self, path: &Path, message: impl ToString) {
        let message = message.to_string();
        tracing::warn!(path = %path.display(), %message, "skipped while loading project");
        self.failures.push(LoadFailure {
            path: path.to_path_buf(),
            message,
        });
    }
}

/// Loads projects from disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProjectLoader;

impl ProjectLoader {
    pub fn new() -> Self {
        Self
    }

    /// Fails only when `root` is not a directory. Broken build files, DDMs
    /// and duplicate files end up in the report.
    pub fn load(&self, root: impl AsRef<Path>) -> ProjectResult<(NaturalProject, LoadReport)> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(ProjectError::RootNotFound(root.to_path_buf()));
        }
        let mut project = NaturalProject::with_root(root);
        let mut report = LoadReport::default();

        for name in BUILD_FILE_NAMES {
            let path = root.join(name);
            if path.is_file() {
                if let Err(err) = project.ingest_build_file(&path) {
                    report.fail(&path, err);
                }
                break;
            }
        }

        let libraries_dir = root.join(LIBRARIES_DIR);
        if libraries_dir.is_dir() {
            self.discover_files(root, &libraries_dir, &mut project, &mut report)?;
        }
        self.load_ddms(&mut project, &mut report);

        report.libraries = project.libraries().count();
        report.files = project.files().count();
        report.ddms = project.ddm_count();
        tracing::debug!(
            root = %root.display(),
            libraries = report.libraries,
            files = report.files,
            ddms = report.ddms,
            failures = report.failures.len(),
            "loaded project"
        );
        Ok((project, report))
    }

    fn discover_files(
        &self,
        root: &Path,
        libraries_dir: &Path,
        project: &mut NaturalProject,
        report: &mut LoadReport,
    ) -> ProjectResult<()> {
        let mut library_dirs: Vec<PathBuf> = std::fs::read_dir(libraries_dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        library_dirs.sort();

        for dir in library_dirs {
            let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let library = project.add_library(name, Some(dir.clone()));

            for entry in WalkDir::new(&dir).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        report.fail(&dir, err);
                        continue;
                    }
                };
                let path = entry.path();
                if !entry.file_type().is_file() || NaturalFileType::from_path(path).is_none() {
                    continue;
                }
                let relative = path.strip_prefix(root).unwrap_or(path);
                if let Err(err) = project.add_file(path, &relative.to_string_lossy(), library) {
                    report.fail(path, err);
                }
            }
            tracing::debug!(library = name, "discovered library");
        }
        Ok(())
    }

    fn load_ddms(&self, project: &mut NaturalProject, report: &mut LoadReport) {
        let paths: Vec<PathBuf> = project
            .files()
            .filter(|file| file.file_type == NaturalFileType::Ddm)
            .map(|file| file.path.clone())
            .collect();

        let parsed: Vec<(PathBuf, ProjectResult<Ddm>)> = paths
            .into_par_iter()
            .map(|path| {
                let result = read_ddm(&path);
                (path, result)
            })
            .collect();

        for (path, result) in parsed {
            match result {
                Ok(ddm) => {
                    project.register_ddm(ddm);
                }
                Err(err) => report.fail(&path, err),
            }
        }
    }
}

fn read_ddm(path: &Path) -> ProjectResult<Ddm> {
    let bytes = std::fs::read(path)?;
    Ok(DdmParser::parse(&String::from_utf8_lossy(&bytes))?)
}

/// Reads a source file; Natural sources are not always UTF-8.
pub fn read_source(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
