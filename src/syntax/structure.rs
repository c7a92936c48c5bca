//! Read-only projections of output and input statements.
//!
//! Structure viewers show a `WRITE`/`DISPLAY`/`PRINT` or `INPUT` statement as
//! lines of fields. These types borrow the statement and expose its
//! elements in that shape without copying anything.

use crate::base::TextRange;
use crate::syntax::ast::{
    AttributeList, InputStatement, Literal, Operand, OutputElement, OutputKind, OutputStatement,
    PositioningKind, Statement,
};
use crate::syntax::visit::NodeRef;

/// Borrowed view over an output statement.
#[derive(Clone, Copy, Debug)]
pub struct OutputStructure<'a> {
    statement: &'a OutputStatement,
}

/// Borrowed view over an `INPUT` statement.
#[derive(Clone, Copy, Debug)]
pub struct InputStructure<'a> {
    statement: &'a InputStatement,
}

/// Either projection, for callers that start from a [`Statement`].
#[derive(Clone, Copy, Debug)]
pub enum Structure<'a> {
    Output(OutputStructure<'a>),
    Input(InputStructure<'a>),
}

/// One field of a projected statement.
#[derive(Clone, Copy, Debug)]
pub enum StructureField<'a> {
    Text {
        literal: &'a Literal,
        attributes: Option<&'a AttributeList>,
    },
    Operand {
        operand: &'a Operand,
        attributes: Option<&'a AttributeList>,
    },
    Spacing(&'a str),
    Tabulation(&'a str),
}

impl<'a> StructureField<'a> {
    fn from_element(element: &'a OutputElement) -> Option<Self> {
        match element {
            OutputElement::Text(text) => Some(StructureField::Text {
                literal: &text.literal,
                attributes: text.attributes.as_ref(),
            }),
            OutputElement::Operand(op) => Some(StructureField::Operand {
                operand: &op.operand,
                attributes: op.attributes.as_ref(),
            }),
            OutputElement::Positioning(pos) => match pos.kind {
                PositioningKind::Spacing => Some(StructureField::Spacing(pos.text.as_str())),
                PositioningKind::Tabulation => Some(StructureField::Tabulation(pos.text.as_str())),
                PositioningKind::NewLine => None,
            },
        }
    }
}

/// Splits elements into lines at `/`.
fn lines_of(elements: &[OutputElement]) -> Vec<Vec<StructureField<'_>>> {
    let mut lines = vec![Vec::new()];
    for element in elements {
        let new_line = matches!(
            element,
            OutputElement::Positioning(pos) if pos.kind == PositioningKind::NewLine
        );
        if new_line {
            lines.push(Vec::new());
            continue;
        }
        if let (Some(field), Some(line)) =
            (StructureField::from_element(element), lines.last_mut())
        {
            line.push(field);
        }
    }
    lines
}

fn operands_of(elements: &[OutputElement]) -> impl Iterator<Item = &Operand> {
    elements.iter().filter_map(|element| match element {
        OutputElement::Operand(op) => Some(&op.operand),
        _ => None,
    })
}

impl<'a> OutputStructure<'a> {
    pub fn new(statement: &'a OutputStatement) -> Self {
        Self { statement }
    }

    pub fn kind(&self) -> OutputKind {
        self.statement.kind
    }

    pub fn range(&self) -> TextRange {
        self.statement.range
    }

    pub fn attributes(&self) -> Option<&'a AttributeList> {
        self.statement.statement_attributes.as_ref()
    }

    pub fn elements(&self) -> &'a [OutputElement] {
        &self.statement.elements
    }

    /// Operands in source order.
    pub fn operands(&self) -> impl Iterator<Item = &'a Operand> + use<'a> {
        operands_of(&self.statement.elements)
    }

    pub fn lines(&self) -> Vec<Vec<StructureField<'a>>> {
        lines_of(&self.statement.elements)
    }
}

impl<'a> InputStructure<'a> {
    pub fn new(statement: &'a InputStatement) -> Self {
        Self { statement }
    }

    pub fn range(&self) -> TextRange {
        self.statement.range
    }

    pub fn attributes(&self) -> Option<&'a AttributeList> {
        self.statement.statement_attributes.as_ref()
    }

    /// Name of the map for `INPUT USING MAP`.
    pub fn map_name(&self) -> Option<String> {
        self.statement.map.as_ref().and_then(Literal::string_value)
    }

    pub fn elements(&self) -> &'a [OutputElement] {
        &self.statement.elements
    }

    pub fn operands(&self) -> impl Iterator<Item = &'a Operand> + use<'a> {
        operands_of(&self.statement.elements)
    }

    pub fn lines(&self) -> Vec<Vec<StructureField<'a>>> {
        lines_of(&self.statement.elements)
    }
}

impl<'a> Structure<'a> {
    /// Projects a statement, if it has a structure.
    pub fn of(statement: &'a Statement) -> Option<Self> {
        match statement {
            Statement::Output(s) => Some(Structure::Output(OutputStructure::new(s))),
            Statement::Input(s) => Some(Structure::Input(InputStructure::new(s))),
            _ => None,
        }
    }

    pub fn elements(&self) -> &'a [OutputElement] {
        match self {
            Structure::Output(s) => s.elements(),
            Structure::Input(s) => s.elements(),
        }
    }

    pub fn operands(&self) -> Vec<&'a Operand> {
        operands_of(self.elements()).collect()
    }

    /// The operand subtrees as traversable nodes.
    pub fn operand_nodes(&self) -> Vec<NodeRef<'a>> {
        operands_of(self.elements()).map(NodeRef::from_operand).collect()
    }

    pub fn lines(&self) -> Vec<Vec<StructureField<'a>>> {
        lines_of(self.elements())
    }
}
