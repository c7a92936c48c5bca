use smol_str::SmolStr;

use super::{Ddm, DdmError, DdmField, DdmFieldType, DdmResult, LinewiseTextScanner};
use crate::syntax::ast::DataFormat;

/// Reads a DDM listing:
///
/// ```text
/// DB: 000 FILE: 100  - EMPLOYEES                      DEFAULT SEQUENCE: AA
/// TYPE: ADABAS
///
/// T L DB Name                             F Leng  S D Remark
/// - - -- -------------------------------- - ----  - - ------------------------
///   1 AA PERSONNEL-ID                     A    8    D
/// G 1 AB FULL-NAME
///   2 AC FIRST-NAME                       A   20  N
/// ```
///
/// The dash runs of the separator line fix the column boundaries.
pub struct DdmParser;

/// `T L DB Name F Leng S D Remark`
const COLUMN_COUNT: usize = 9;

impl DdmParser {
    pub fn parse(text: &str) -> DdmResult<Ddm> {
        let mut scanner = LinewiseTextScanner::new(text.lines())?;
        Self::parse_lines(&mut scanner)
    }

    pub fn parse_lines(scanner: &mut LinewiseTextScanner) -> DdmResult<Ddm> {
        scanner.skip_blank_lines();
        let line = scanner.line_number();
        let header = scanner
            .peek()
            .and_then(parse_header)
            .ok_or(DdmError::MissingHeader { line })?;
        scanner.advance();

        while scanner.peek().is_some_and(|line| !is_column_header(line)) {
            scanner.advance();
        }
        scanner.advance();
        let columns = scanner
            .peek()
            .and_then(Columns::from_separator)
            .ok_or(DdmError::MissingFieldTable)?;
        scanner.advance();

        let mut fields = Vec::new();
        while let Some(text) = scanner.peek() {
            if !text.trim().is_empty() {
                fields.extend(columns.parse_field(text, scanner.line_number())?);
            }
            scanner.advance();
        }

        tracing::trace!(ddm = %header.name, fields = fields.len(), "parsed DDM");
        Ok(Ddm {
            name: header.name,
            database_number: header.database_number,
            file_number: header.file_number,
            default_sequence: header.default_sequence,
            fields,
        })
    }
}

struct Header {
    database_number: u32,
    file_number: u32,
    name: SmolStr,
    default_sequence: Option<SmolStr>,
}

fn parse_header(line: &str) -> Option<Header> {
    let rest = line.trim_start().strip_prefix("DB:")?;
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let after = |marker: &str| {
        tokens
            .iter()
            .position(|token| *token == marker)
            .and_then(|index| tokens.get(index + 1).copied())
    };

    Some(Header {
        database_number: tokens.first()?.parse().ok()?,
        file_number: after("FILE:")?.parse().ok()?,
        name: SmolStr::new(after("-")?),
        default_sequence: after("SEQUENCE:").map(SmolStr::new),
    })
}

fn is_column_header(line: &str) -> bool {
    let mut words = line.split_whitespace();
    words.next() == Some("T") && words.next() == Some("L") && words.next() == Some("DB")
}

/// Start offsets of the fixed columns.
struct Columns {
    starts: Vec<usize>,
}

impl Columns {
    fn from_separator(line: &str) -> Option<Self> {
        let bytes = line.as_bytes();
        let starts: Vec<usize> = (0..bytes.len())
            .filter(|&i| bytes[i] == b'-' && (i == 0 || bytes[i - 1] == b' '))
            .collect();
        let only_dashes = line.bytes().all(|b| b == b'-' || b == b' ');
        // The remark column may be missing.
        (only_dashes && starts.len() >= COLUMN_COUNT - 1).then_some(Self { starts })
    }

    fn cell<'l>(&self, line: &'l str, column: usize) -> &'l str {
        let Some(&start) = self.starts.get(column) else {
            return "";
        };
        let end = if column + 1 >= COLUMN_COUNT {
            line.len()
        } else {
            self.starts.get(column + 1).copied().unwrap_or(line.len())
        };
        let start = start.min(line.len());
        let end = end.min(line.len());
        line.get(start..end).unwrap_or("").trim()
    }

    /// `None` for comment lines.
    fn parse_field(&self, line: &str, number: usize) -> DdmResult<Option<DdmField>> {
        let malformed = |message: String| DdmError::MalformedField { line: number, message };

        let type_code = self.cell(line, 0);
        if type_code == "*" {
            return Ok(None);
        }
        let field_type = DdmFieldType::from_code(type_code)
            .ok_or_else(|| malformed(format!("unknown field type '{type_code}'")))?;

        let level_text = self.cell(line, 1);
        let level = level_text
            .parse::<u8>()
            .map_err(|_| malformed(format!("invalid level '{level_text}'")))?;

        let short_name = self.cell(line, 2);
        let name = self.cell(line, 3);
        if short_name.is_empty() || name.is_empty() {
            return Err(malformed("field needs a short name and a name".to_string()));
        }

        let format = match self.cell(line, 4) {
            "" => None,
            text => {
                let mut chars = text.chars();
                let letter = chars.next().filter(|_| chars.next().is_none());
                Some(
                    letter
                        .and_then(DataFormat::from_letter)
                        .ok_or_else(|| malformed(format!("unknown format '{text}'")))?,
                )
            }
        };
        let length = Some(self.cell(line, 5)).filter(|s| !s.is_empty()).map(SmolStr::new);

        Ok(Some(DdmField {
            field_type,
            level,
            short_name: SmolStr::new(short_name),
            name: SmolStr::new(name),
            format,
            length,
            suppression: self.cell(line, 6).chars().next(),
            descriptor: self.cell(line, 7).chars().next(),
            remark: self.cell(line, 8).to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separator() -> String {
        format!("- - -- {} - ----  - - {}", "-".repeat(32), "-".repeat(24))
    }

    #[allow(clippy::too_many_arguments)]
    fn field(
        t: &str,
        l: &str,
        db: &str,
        name: &str,
        f: &str,
        leng: &str,
        s: &str,
        d: &str,
        remark: &str,
    ) -> String {
        format!("{t:1} {l:1} {db:2} {name:32} {f:1} {leng:>4}  {s:1} {d:1} {remark}")
            .trim_end()
            .to_string()
    }

    fn employees() -> String {
        [
            "DB: 000 FILE: 100  - EMPLOYEES                      DEFAULT SEQUENCE: AA".to_string(),
            "TYPE: ADABAS".to_string(),
            String::new(),
            "T L DB Name                             F Leng  S D Remark".to_string(),
            separator(),
            field("", "1", "AA", "PERSONNEL-ID", "A", "8", "", "D", ""),
            field("G", "1", "AB", "FULL-NAME", "", "", "", "", ""),
            field("", "2", "AC", "FIRST-NAME", "A", "20", "N", "", ""),
            field("*", "", "", "", "", "", "", "", "name fields end here"),
            field("", "1", "AS", "SALARY", "P", "9.2", "N", "", "yearly"),
            field("S", "1", "S1", "NAME-CITY", "A", "40", "", "", ""),
        ]
        .join("\n")
    }

    #[test]
    fn test_parse_employees() {
        let ddm = DdmParser::parse(&employees()).expect("valid DDM");
        assert_eq!(ddm.name, "EMPLOYEES");
        assert_eq!((ddm.database_number, ddm.file_number), (0, 100));
        assert_eq!(ddm.default_sequence.as_deref(), Some("AA"));

        let names: Vec<&str> = ddm.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["PERSONNEL-ID", "FULL-NAME", "FIRST-NAME", "SALARY", "NAME-CITY"]);

        let salary = ddm.find_field("SALARY").expect("salary");
        assert_eq!(salary.format, Some(DataFormat::Packed));
        assert_eq!(salary.length.as_deref(), Some("9.2"));
        assert_eq!(salary.suppression, Some('N'));
        assert_eq!(salary.remark, "yearly");

        let group = ddm.find_field("FULL-NAME").expect("group");
        assert!(group.field_type.is_group());
        assert_eq!(group.format, None);

        let descriptors: Vec<&str> = ddm.descriptors().map(|f| f.name.as_str()).collect();
        assert_eq!(descriptors, ["PERSONNEL-ID", "NAME-CITY"]);
    }

    #[test]
    fn test_field_lookup_is_case_sensitive() {
        let ddm = DdmParser::parse(&employees()).expect("valid DDM");
        assert!(ddm.find_field("SALARY").is_some());
        assert!(ddm.find_field("salary").is_none());
    }

    #[test]
    fn test_empty_text_fails() {
        assert_eq!(DdmParser::parse(""), Err(DdmError::EmptyInput));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            DdmParser::parse("\nnot a header"),
            Err(DdmError::MissingHeader { line: 2 })
        );
    }

    #[test]
    fn test_missing_field_table() {
        assert_eq!(
            DdmParser::parse("DB: 1 FILE: 2  - X\nTYPE: ADABAS"),
            Err(DdmError::MissingFieldTable)
        );
    }

    #[test]
    fn test_malformed_level() {
        let text = [
            "DB: 1 FILE: 2  - X".to_string(),
            "T L DB Name                             F Leng  S D Remark".to_string(),
            separator(),
            field("", "X", "AA", "FIELD", "A", "1", "", "", ""),
        ]
        .join("\n");
        let err = DdmParser::parse(&text).expect_err("bad level");
        assert!(matches!(err, DdmError::MalformedField { line: 4, .. }), "{err}");
    }
}
