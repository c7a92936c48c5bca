//! The project model: libraries, files and DDMs.
//!
//! Libraries and files live in arenas and refer to each other by id only,
//! so cyclic steplib chains need no special ownership handling. Queries
//! over the steplib graph remember what they have visited.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::build_file::{BuildFileParser, XmlNaturalLibrary};
use super::ddm::Ddm;
use super::error::{ProjectError, ProjectResult};
use super::file::{NaturalFile, NaturalFileType, normalize_relative_path, referable_name};
use super::library::{LibraryId, NaturalLibrary};
use crate::base::FileId;

#[derive(Clone, Debug, Default)]
pub struct NaturalProject {
    root: Option<PathBuf>,
    libraries: Vec<NaturalLibrary>,
    /// Upper-cased name to id, in the order libraries were added.
    library_names: IndexMap<SmolStr, LibraryId>,
    files: Vec<NaturalFile>,
    files_by_path: FxHashMap<String, FileId>,
    ddms: FxHashMap<SmolStr, Arc<Ddm>>,
}

fn library_key(name: &str) -> SmolStr {
    SmolStr::new(name.trim().to_ascii_uppercase())
}

impl NaturalProject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    // ------------------------------------------------------------------------
    // Libraries
    // ------------------------------------------------------------------------

    /// Returns the existing library when the name is already known.
    pub fn add_library(&mut self, name: &str, source_path: Option<PathBuf>) -> LibraryId {
        let key = library_key(name);
        if let Some(&id) = self.library_names.get(&key) {
            let library = &mut self.libraries[id.index()];
            if library.source_path.is_none() {
                library.source_path = source_path;
            }
            return id;
        }
        let id = LibraryId::new(self.libraries.len() as u32);
        self.libraries.push(NaturalLibrary::new(id, key.clone(), source_path));
        self.library_names.insert(key, id);
        id
    }

    pub fn library(&self, id: LibraryId) -> Option<&NaturalLibrary> {
        self.libraries.get(id.index())
    }

    /// Case-insensitive.
    pub fn library_by_name(&self, name: &str) -> Option<&NaturalLibrary> {
        self.library_names
            .get(library_key(name).as_str())
            .and_then(|&id| self.library(id))
    }

    /// In the order they were added.
    pub fn libraries(&self) -> impl Iterator<Item = &NaturalLibrary> {
        self.library_names.values().filter_map(|&id| self.library(id))
    }

    /// Folds build-file entries into the model. Steplibs that are not
    /// declared themselves become empty libraries.
    pub fn merge_libraries(&mut self, libraries: Vec<XmlNaturalLibrary>) {
        let count = libraries.len();
        for entry in libraries {
            let id = self.add_library(&entry.name, None);
            for steplib in &entry.steplibs {
                let steplib = self.add_library(steplib, None);
                let library = &mut self.libraries[id.index()];
                if steplib != id && !library.steplibs.contains(&steplib) {
                    library.steplibs.push(steplib);
                }
            }
        }
        tracing::debug!(merged = count, total = self.libraries.len(), "merged libraries");
    }

    /// Parses the whole build file before touching the model, so a failure
    /// leaves earlier libraries as they were.
    pub fn ingest_build_file(&mut self, path: impl AsRef<Path>) -> ProjectResult<usize> {
        let libraries = BuildFileParser::parse_libraries(path)?;
        let count = libraries.len();
        self.merge_libraries(libraries);
        Ok(count)
    }

    /// `from` itself, then its steplibs breadth-first. Cycles are cut.
    pub fn visible_libraries(&self, from: LibraryId) -> Vec<LibraryId> {
        let mut order = Vec::new();
        if self.library(from).is_none() {
            return order;
        }
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([from]);
        seen.insert(from);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            let Some(library) = self.library(id) else {
                continue;
            };
            for &steplib in &library.steplibs {
                if seen.insert(steplib) {
                    queue.push_back(steplib);
                }
            }
        }
        order
    }

    /// Whether `from` sees `to`, directly or through steplibs.
    pub fn library_sees(&self, from: LibraryId, to: LibraryId) -> bool {
        self.visible_libraries(from).contains(&to)
    }

    // ------------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------------

    pub fn add_file(
        &mut self,
        path: impl Into<PathBuf>,
        relative_path: &str,
        library: LibraryId,
    ) -> ProjectResult<FileId> {
        let path = path.into();
        let file_type = NaturalFileType::from_path(&path)
            .ok_or_else(|| ProjectError::UnsupportedFile(path.clone()))?;
        let relative_path = normalize_relative_path(relative_path);
        if self.files_by_path.contains_key(&relative_path) {
            return Err(ProjectError::DuplicateFile(relative_path));
        }
        if self.library(library).is_none() {
            return Err(ProjectError::UnknownLibrary(library.to_string()));
        }

        let id = FileId::from(self.files.len());
        self.files.push(NaturalFile {
            id,
            referable_name: referable_name(&path),
            path,
            relative_path: relative_path.clone(),
            file_type,
            library,
        });
        self.files_by_path.insert(relative_path, id);
        self.libraries[library.index()].files.push(id);
        Ok(id)
    }

    pub fn file(&self, id: FileId) -> Option<&NaturalFile> {
        self.files.get(id.index() as usize)
    }

    pub fn files(&self) -> impl Iterator<Item = &NaturalFile> {
        self.files.iter()
    }

    pub fn file_by_relative_path(&self, relative_path: &str) -> Option<&NaturalFile> {
        self.files_by_path
            .get(&normalize_relative_path(relative_path))
            .and_then(|&id| self.file(id))
    }

    /// First module called `name` in the libraries visible from `from`.
    /// An empty `kinds` accepts any file type.
    pub fn find_module(
        &self,
        from: LibraryId,
        name: &str,
        kinds: &[NaturalFileType],
    ) -> Option<&NaturalFile> {
        let name = name.trim().to_ascii_uppercase();
        self.visible_libraries(from).into_iter().find_map(|library| {
            self.library(library)?
                .files
                .iter()
                .filter_map(|&id| self.file(id))
                .find(|file| {
                    file.referable_name == name
                        && (kinds.is_empty() || kinds.contains(&file.file_type))
                })
        })
    }

    // ------------------------------------------------------------------------
    // DDMs
    // ------------------------------------------------------------------------

    pub fn register_ddm(&mut self, ddm: Ddm) -> Arc<Ddm> {
        let ddm = Arc::new(ddm);
        self.ddms.insert(library_key(&ddm.name), Arc::clone(&ddm));
        ddm
    }

    /// Case-insensitive on the DDM name.
    pub fn ddm(&self, name: &str) -> Option<Arc<Ddm>> {
        self.ddms.get(library_key(name).as_str()).cloned()
    }

    pub fn ddm_count(&self) -> usize {
        self.ddms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library(name: &str, steplibs: &[&str]) -> XmlNaturalLibrary {
        XmlNaturalLibrary {
            name: name.into(),
            steplibs: steplibs.iter().map(|s| SmolStr::new(*s)).collect(),
        }
    }

    #[test]
    fn test_merge_creates_steplib_chain() {
        let mut project = NaturalProject::new();
        project.merge_libraries(vec![
            library("app", &["COMMON", "SYSTEM"]),
            library("COMMON", &["SYSTEM"]),
        ]);

        let names: Vec<&str> = project.libraries().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["APP", "COMMON", "SYSTEM"]);

        let app = project.library_by_name("App").expect("app").id;
        let system = project.library_by_name("SYSTEM").expect("system").id;
        assert!(project.library_sees(app, system));
        assert!(!project.library_sees(system, app));
        assert!(project.library_sees(system, system));
    }

    #[test]
    fn test_visible_libraries_breadth_first_and_cycle_safe() {
        let mut project = NaturalProject::new();
        project.merge_libraries(vec![
            library("A", &["B", "C"]),
            library("B", &["D", "A"]),
            library("C", &["D"]),
            library("D", &["A"]),
        ]);
        let a = project.library_by_name("A").expect("a").id;
        let names: Vec<&str> = project
            .visible_libraries(a)
            .into_iter()
            .filter_map(|id| project.library(id))
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_duplicate_relative_path_rejected() {
        let mut project = NaturalProject::new();
        let lib = project.add_library("LIB", None);
        project.add_file("/p/LIB/SRC/PROG.NSP", "LIB/SRC/PROG.NSP", lib).expect("first");
        let err = project
            .add_file("/p/LIB/SRC/PROG.NSP", "./LIB\\SRC\\PROG.NSP", lib)
            .expect_err("duplicate");
        assert!(matches!(err, ProjectError::DuplicateFile(path) if path == "LIB/SRC/PROG.NSP"));
    }

    #[test]
    fn test_unsupported_file_rejected() {
        let mut project = NaturalProject::new();
        let lib = project.add_library("LIB", None);
        let err = project.add_file("/p/readme.txt", "readme.txt", lib).expect_err("not natural");
        assert!(matches!(err, ProjectError::UnsupportedFile(_)));
    }

    #[test]
    fn test_find_module_follows_steplibs() {
        let mut project = NaturalProject::new();
        project.merge_libraries(vec![library("APP", &["COMMON"])]);
        let app = project.library_by_name("APP").expect("app").id;
        let common = project.library_by_name("COMMON").expect("common").id;
        let sub = project
            .add_file("/p/COMMON/SRC/SUB1.NSN", "COMMON/SRC/SUB1.NSN", common)
            .expect("file");

        let found = project.find_module(app, "sub1", &[NaturalFileType::Subprogram]);
        assert_eq!(found.map(|f| f.id), Some(sub));
        assert!(project.find_module(app, "SUB1", &[NaturalFileType::Program]).is_none());
        assert!(project.find_module(common, "SUB1", &[]).is_some());
    }

    #[test]
    fn test_ddm_lookup_is_case_insensitive() {
        let mut project = NaturalProject::new();
        project.register_ddm(Ddm {
            name: "EMPLOYEES".into(),
            database_number: 0,
            file_number: 100,
            default_sequence: None,
            fields: Vec::new(),
        });
        assert!(project.ddm("employees").is_some());
        assert!(project.ddm("VEHICLES").is_none());
    }
}
