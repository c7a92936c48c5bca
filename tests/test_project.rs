//! Project model ingestion: build files, steplib chains, DDMs, the loader
//! and version-control selections.

use std::fs;
use std::path::Path;

use natparse::project::{
    BuildFileParserError, DdmError, DdmParser, LinewiseTextScanner, NaturalFileType, NaturalProject,
    ProjectError, ProjectLoader, XmlNaturalLibrary, parse_status_to_predicates, select_files,
};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(path, content).expect("write fixture");
}

fn ddm_text(name: &str) -> String {
    let separator = format!("- - -- {} - ----  - - {}", "-".repeat(32), "-".repeat(24));
    let field = |t: &str, l: &str, db: &str, field: &str, f: &str, len: &str, d: &str| {
        format!("{t:1} {l:1} {db:2} {field:32} {f:1} {len:>4}    {d:1}")
            .trim_end()
            .to_string()
    };
    [
        format!("DB: 001 FILE: 042  - {name:<30} DEFAULT SEQUENCE: AA"),
        "TYPE: ADABAS".to_string(),
        String::new(),
        "T L DB Name                             F Leng  S D Remark".to_string(),
        separator,
        field("", "1", "AA", "PERSONNEL-ID", "A", "8", "D"),
        field("", "1", "AB", "CITY", "A", "20", ""),
    ]
    .join("\n")
}

// ============================================================================
// Build files
// ============================================================================

#[test]
fn test_failed_build_file_keeps_earlier_libraries() {
    let dir = TempDir::new().expect("tempdir");
    let good = dir.path().join("good.xml");
    let bad = dir.path().join("bad.xml");
    fs::write(
        &good,
        r#"<Libraries><Library name="APP"><Steplib name="COMMON"/></Library></Libraries>"#,
    )
    .expect("write");
    fs::write(&bad, r#"<Libraries><Library name="OTHER"><Steplib name="X"/>"#).expect("write");

    let mut project = NaturalProject::new();
    assert_eq!(project.ingest_build_file(&good).expect("valid build file"), 1);

    let err = project.ingest_build_file(&bad).expect_err("unclosed element");
    let ProjectError::BuildFile(BuildFileParserError { path, .. }) = &err else {
        panic!("expected a build-file error, got {err:?}");
    };
    assert_eq!(path, &bad);
    assert!(std::error::Error::source(&err).is_some(), "cause is kept");

    let app = project.library_by_name("APP").expect("APP survives");
    let common = project.library_by_name("COMMON").expect("COMMON survives");
    assert_eq!(app.steplibs, [common.id]);
    assert!(project.library_by_name("OTHER").is_none());
}

#[test]
fn test_cyclic_steplibs_terminate() {
    let mut project = NaturalProject::new();
    project.merge_libraries(vec![
        XmlNaturalLibrary {
            name: "A".into(),
            steplibs: vec!["B".into()],
        },
        XmlNaturalLibrary {
            name: "B".into(),
            steplibs: vec!["C".into()],
        },
        XmlNaturalLibrary {
            name: "C".into(),
            steplibs: vec!["A".into()],
        },
        XmlNaturalLibrary {
            name: "D".into(),
            steplibs: vec![],
        },
    ]);
    let id = |name: &str| project.library_by_name(name).expect(name).id;

    assert_eq!(project.visible_libraries(id("B")), [id("B"), id("C"), id("A")]);
    assert!(project.library_sees(id("A"), id("C")));
    assert!(project.library_sees(id("C"), id("B")));
    assert!(!project.library_sees(id("A"), id("D")));
}

// ============================================================================
// DDMs
// ============================================================================

#[test]
fn test_scanner_without_lines_fails_at_construction() {
    let err = LinewiseTextScanner::new(Vec::<String>::new()).expect_err("no lines");
    assert!(matches!(err, DdmError::EmptyInput));
    assert!(matches!(DdmParser::parse(""), Err(DdmError::EmptyInput)));
}

#[test]
fn test_ddm_fixture_parses() {
    let ddm = DdmParser::parse(&ddm_text("EMPLOYEES")).expect("valid DDM");
    assert_eq!(ddm.name, "EMPLOYEES");
    assert_eq!(ddm.fields.len(), 2);
    assert!(ddm.find_field("PERSONNEL-ID").is_some_and(|f| f.is_descriptor()));
}

// ============================================================================
// Loader
// ============================================================================

fn sample_project() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();
    write(
        root,
        ".natural",
        r#"<NaturalBuild>
             <Library name="APP"><Steplib name="COMMON"/></Library>
             <Library><Property name="Name" value="COMMON"/></Library>
           </NaturalBuild>"#,
    );
    write(root, "Natural-Libraries/APP/SRC/PROG.NSP", "WRITE 'hi'\nEND\n");
    write(root, "Natural-Libraries/APP/SRC/LDA1.NSL", "DEFINE DATA LOCAL\n1 #A (A1)\nEND-DEFINE\n");
    write(root, "Natural-Libraries/APP/notes.txt", "not a source");
    write(
        root,
        "Natural-Libraries/COMMON/SRC/SUB.NSN",
        "DEFINE DATA PARAMETER\n1 #P (A1)\nEND-DEFINE\nEND\n",
    );
    write(root, "Natural-Libraries/COMMON/DDM/EMPLOYEES.NSD", &ddm_text("EMPLOYEES"));
    write(root, "Natural-Libraries/COMMON/DDM/BROKEN.NSD", "this is not a DDM");
    dir
}

#[test]
fn test_loader_builds_project_from_disk() {
    let dir = sample_project();
    let (project, report) = ProjectLoader::new().load(dir.path()).expect("root exists");

    assert_eq!(report.libraries, 2);
    assert_eq!(report.files, 5);
    assert_eq!(report.ddms, 1);
    assert_eq!(report.failures.len(), 1, "{:?}", report.failures);
    assert!(report.failures[0].path.ends_with("BROKEN.NSD"));

    let app = project.library_by_name("APP").expect("APP").id;
    let prog = project
        .file_by_relative_path("Natural-Libraries/APP/SRC/PROG.NSP")
        .expect("program discovered");
    assert_eq!(prog.library, app);
    assert_eq!(prog.referable_name, "PROG");

    let sub = project
        .find_module(app, "sub", &[NaturalFileType::Subprogram])
        .expect("found through the steplib");
    assert_eq!(sub.file_type, NaturalFileType::Subprogram);
    assert!(project.ddm("employees").is_some());
}

#[test]
fn test_loader_rejects_missing_root() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("nope");
    assert!(matches!(
        ProjectLoader::new().load(&missing),
        Err(ProjectError::RootNotFound(path)) if path == missing
    ));
}

#[test]
fn test_loader_reports_broken_build_file_and_continues() {
    let dir = sample_project();
    write(dir.path(), ".natural", "<NaturalBuild><Library name=\"APP\">");
    let (project, report) = ProjectLoader::new().load(dir.path()).expect("root exists");
    assert!(report.failures.iter().any(|f| f.path.ends_with(".natural")));
    assert!(project.library_by_name("APP").is_some(), "directory libraries still load");
    assert_eq!(report.files, 5);
}

// ============================================================================
// Version control
// ============================================================================

#[test]
fn test_status_lines_select_changed_files() {
    let predicates = parse_status_to_predicates(&[
        "M src/a.nsp",
        "D src/b.nsp",
        "R90 src/c.nsp -> src/d.nsp",
    ]);
    let paths: Vec<&str> = predicates.iter().map(|p| p.relative_path()).collect();
    assert_eq!(paths, ["src/a.nsp", "src/d.nsp"]);

    let mut project = NaturalProject::new();
    let lib = project.add_library("SRC", None);
    for name in ["a", "b", "c", "d"] {
        let relative = format!("src/{name}.nsp");
        project.add_file(format!("/repo/{relative}"), &relative, lib).expect("add file");
    }
    let selected: Vec<&str> = select_files(&project, &predicates)
        .iter()
        .map(|f| f.relative_path.as_str())
        .collect();
    assert_eq!(selected, ["src/a.nsp", "src/d.nsp"]);

    let b = project.file_by_relative_path("src/b.nsp").expect("b");
    assert!(!predicates.iter().any(|p| p.matches(b)));
}
