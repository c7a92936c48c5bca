//! Build-file ingestion.
//!
//! A build file lists the project's libraries and their steplib chains:
//!
//! ```xml
//! <Libraries>
//!   <Library name="APP">
//!     <Steplib name="COMMON"/>
//!     <Steplib name="SYSTEM"/>
//!   </Library>
//!   <Library>
//!     <Property name="Name" value="COMMON"/>
//!     <Property name="Steplibs" value="SYSTEM"/>
//!   </Library>
//! </Libraries>
//! ```
//!
//! Parsing is all-or-nothing: a document either yields every library it
//! declares or one [`BuildFileParserError`].

use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use smol_str::SmolStr;
use thiserror::Error;

/// A library entry read from a build file, before it is merged into the
/// project model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlNaturalLibrary {
    pub name: SmolStr,
    pub steplibs: Vec<SmolStr>,
}

/// A build file that could not be ingested.
#[derive(Debug, Error)]
#[error("failed to parse build file {}: {source}", path.display())]
pub struct BuildFileParserError {
    pub path: PathBuf,
    #[source]
    pub source: BuildFileCause,
}

#[derive(Debug, Error)]
pub enum BuildFileCause {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed build file: {0}")]
    Malformed(String),
}

pub struct BuildFileParser;

impl BuildFileParser {
    /// Reads and parses the build file at `path`.
    pub fn parse_libraries(
        path: impl AsRef<Path>,
    ) -> Result<Vec<XmlNaturalLibrary>, BuildFileParserError> {
        let path = path.as_ref();
        let wrap = |source: BuildFileCause| BuildFileParserError {
            path: path.to_path_buf(),
            source,
        };
        let text = std::fs::read_to_string(path).map_err(|err| wrap(err.into()))?;
        let libraries = Self::parse_str(&text).map_err(wrap)?;
        tracing::debug!(path = %path.display(), libraries = libraries.len(), "parsed build file");
        Ok(libraries)
    }

    /// Parses build-file text, in document order.
    pub fn parse_str(text: &str) -> Result<Vec<XmlNaturalLibrary>, BuildFileCause> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut visitor = LibraryVisitor::default();
        let mut open: Vec<String> = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Start(element) => {
                    let name = element_name(&element)?;
                    visitor.open(&name, &element)?;
                    open.push(name);
                }
                Event::Empty(element) => {
                    let name = element_name(&element)?;
                    visitor.open(&name, &element)?;
                    visitor.close(&name)?;
                }
                Event::End(_) => {
                    if let Some(name) = open.pop() {
                        visitor.close(&name)?;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(BuildFileCause::Malformed(format!(
                "element <{unclosed}> is not closed at end of document"
            )));
        }
        Ok(visitor.libraries)
    }
}

#[derive(Default)]
struct PendingLibrary {
    name: Option<SmolStr>,
    steplibs: Vec<SmolStr>,
}

/// Accumulates libraries as elements open and close.
#[derive(Default)]
struct LibraryVisitor {
    libraries: Vec<XmlNaturalLibrary>,
    current: Option<PendingLibrary>,
}

impl LibraryVisitor {
    fn open(&mut self, name: &str, element: &BytesStart<'_>) -> Result<(), BuildFileCause> {
        if name.eq_ignore_ascii_case("library") {
            if self.current.is_some() {
                return Err(BuildFileCause::Malformed("nested <Library> element".into()));
            }
            self.current = Some(PendingLibrary {
                name: attribute(element, "name")?.map(SmolStr::new),
                steplibs: Vec::new(),
            });
            return Ok(());
        }

        // Steplibs and properties only mean something inside a library.
        let Some(library) = self.current.as_mut() else {
            return Ok(());
        };
        if name.eq_ignore_ascii_case("steplib") {
            let steplib = attribute(element, "name")?
                .ok_or_else(|| BuildFileCause::Malformed("<Steplib> without a name".into()))?;
            library.steplibs.push(SmolStr::new(steplib));
        } else if name.eq_ignore_ascii_case("property") {
            let key = attribute(element, "name")?.unwrap_or_default();
            let value = attribute(element, "value")?.unwrap_or_default();
            if key.eq_ignore_ascii_case("name") {
                library.name = Some(SmolStr::new(value.trim()));
            } else if key.eq_ignore_ascii_case("steplibs") {
                library.steplibs.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(SmolStr::new),
                );
            }
        }
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), BuildFileCause> {
        if !name.eq_ignore_ascii_case("library") {
            return Ok(());
        }
        let Some(pending) = self.current.take() else {
            return Ok(());
        };
        let name = pending
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| BuildFileCause::Malformed("<Library> without a name".into()))?;
        self.libraries.push(XmlNaturalLibrary {
            name,
            steplibs: pending.steplibs,
        });
        Ok(())
    }
}

fn element_name(element: &BytesStart<'_>) -> Result<String, BuildFileCause> {
    let local = element.local_name();
    std::str::from_utf8(local.as_ref())
        .map(str::to_string)
        .map_err(|err| BuildFileCause::Malformed(format!("element name is not UTF-8: {err}")))
}

/// Attribute value by case-insensitive name.
fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, BuildFileCause> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref().eq_ignore_ascii_case(name.as_bytes()) {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_libraries_in_document_order() {
        let libraries = BuildFileParser::parse_str(
            r#"<Libraries>
                 <Library name="APP"><Steplib name="COMMON"/><Steplib name="SYSTEM"/></Library>
                 <LIBRARY>
                   <Property name="Name" value="COMMON"/>
                   <Property name="Steplibs" value="SYSTEM, TOOLS"/>
                 </LIBRARY>
               </Libraries>"#,
        )
        .expect("valid build file");

        assert_eq!(
            libraries,
            vec![
                XmlNaturalLibrary {
                    name: "APP".into(),
                    steplibs: vec!["COMMON".into(), "SYSTEM".into()],
                },
                XmlNaturalLibrary {
                    name: "COMMON".into(),
                    steplibs: vec!["SYSTEM".into(), "TOOLS".into()],
                },
            ]
        );
    }

    #[test]
    fn test_unclosed_element_is_malformed() {
        let err = BuildFileParser::parse_str("<Libraries><Library name=\"APP\">")
            .expect_err("unclosed");
        assert!(matches!(err, BuildFileCause::Malformed(_) | BuildFileCause::Xml(_)), "{err}");
    }

    #[test]
    fn test_library_without_name() {
        let err =
            BuildFileParser::parse_str("<Libraries><Library/></Libraries>").expect_err("no name");
        assert!(err.to_string().contains("without a name"));
    }

    #[test]
    fn test_mismatched_end_tag_is_xml_error() {
        let err = BuildFileParser::parse_str("<Libraries><Library name=\"A\"></Libraries>")
            .expect_err("mismatched");
        assert!(matches!(err, BuildFileCause::Xml(_)), "{err}");
    }

    #[test]
    fn test_error_carries_path_and_cause() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "<Libraries><Library name=\"A\">").expect("write");
        let err = BuildFileParser::parse_libraries(file.path()).expect_err("malformed");
        assert_eq!(err.path, file.path());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = BuildFileParser::parse_libraries(dir.path().join("missing.xml"))
            .expect_err("missing");
        assert!(matches!(err.source, BuildFileCause::Io(_)));
    }
}
