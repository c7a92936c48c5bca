//! Analyzer: flag attribute names Natural does not know.
//!
//! ```text
//! WRITE #A (AD=O XY=1)
//!                ^^ unknown attribute
//! ```

use super::{Analyzer, AnalyzerContext, AnalyzerError, DiagnosticSink};
use crate::syntax::visit::{NodeKind, NodeRef};

/// Session parameters accepted in statement and field attribute lists.
const KNOWN_ATTRIBUTES: &[&str] = &[
    "AD", "AL", "BX", "CC", "CD", "CV", "DF", "DL", "DY", "EM", "ES", "FC", "FL", "GC", "HC", "HE",
    "HW", "IC", "IP", "IS", "LC", "LS", "MC", "MP", "MS", "NL", "PC", "PM", "PS", "SB", "SF",
    "SG", "TC", "UC", "ZP",
];

pub struct UnknownAttribute;

impl Analyzer for UnknownAttribute {
    fn id(&self) -> &'static str {
        "unknown-attribute"
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::AttributeList]
    }

    fn analyze(
        &self,
        node: NodeRef<'_>,
        _ctx: &AnalyzerContext<'_>,
        sink: &mut DiagnosticSink,
    ) -> Result<(), AnalyzerError> {
        let NodeRef::AttributeList(list) = node else {
            return Err(AnalyzerError::UnexpectedNode(node.kind()));
        };
        for attribute in &list.attributes {
            if !KNOWN_ATTRIBUTES.contains(&attribute.name.as_str()) {
                sink.report(attribute.range, format!("unknown attribute '{}'", attribute.name));
            }
        }
        Ok(())
    }
}
