//! Typed abstract syntax tree for Natural compilation units.
//!
//! Every node owns its children and records the byte range it was parsed
//! from. Ranges nest: a child's range always lies within its parent's.
//!
//! Nodes are immutable once parsing finishes, with two exceptions that only
//! the scope resolver fills in:
//! - [`VariableDeclaration::scope`] (and the same field on groups and views)
//! - [`VariableReference::resolved`]

use smol_str::SmolStr;

use crate::base::TextRange;
use crate::hir::{SymbolId, VariableScope};
use crate::parser::SyntaxKind;

// ============================================================================
// COMMON
// ============================================================================

/// A name as written in the source.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: SmolStr,
    pub range: TextRange,
}

impl Identifier {
    pub fn new(name: impl Into<SmolStr>, range: TextRange) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }

    /// The upper-cased name; Natural names are case-insensitive.
    pub fn normalized(&self) -> SmolStr {
        SmolStr::new(self.name.to_ascii_uppercase())
    }
}

/// What kind of source unit was parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Program,
    Subprogram,
    Subroutine,
    Copycode,
    Helproutine,
    Function,
    Map,
    DataArea(DataAreaKind),
    Unknown,
}

impl UnitKind {
    pub fn is_data_area(self) -> bool {
        matches!(self, UnitKind::DataArea(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataAreaKind {
    Local,
    Parameter,
    Global,
}

/// Root node of one parsed file.
#[derive(Clone, Debug, PartialEq)]
pub struct CompilationUnit {
    pub kind: UnitKind,
    pub define_data: Option<DefineData>,
    pub body: Vec<Statement>,
    pub range: TextRange,
}

// ============================================================================
// DEFINE DATA
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct DefineData {
    pub blocks: Vec<DataBlock>,
    pub range: TextRange,
}

impl DefineData {
    /// All blocks opened by the given scope keyword.
    pub fn blocks_of(&self, scope_token: SyntaxKind) -> impl Iterator<Item = &DataBlock> {
        self.blocks
            .iter()
            .filter(move |block| block.scope_token == scope_token)
    }
}

/// One `LOCAL`/`GLOBAL`/`PARAMETER`/`INDEPENDENT` section.
///
/// A block either imports a data area (`LOCAL USING MYLDA`) or declares
/// items inline.
#[derive(Clone, Debug, PartialEq)]
pub struct DataBlock {
    pub scope_token: SyntaxKind,
    pub scope: Option<VariableScope>,
    pub using: Option<Identifier>,
    pub items: Vec<DataItem>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DataItem {
    Variable(VariableDeclaration),
    Group(GroupDeclaration),
    Redefine(Redefinition),
    View(ViewDeclaration),
}

impl DataItem {
    pub fn range(&self) -> TextRange {
        match self {
            DataItem::Variable(v) => v.range,
            DataItem::Group(g) => g.range,
            DataItem::Redefine(r) => r.range,
            DataItem::View(v) => v.range,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            DataItem::Variable(v) => v.level,
            DataItem::Group(g) => g.level,
            DataItem::Redefine(r) => r.level,
            DataItem::View(v) => v.level,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDeclaration {
    pub level: u8,
    pub name: Identifier,
    pub data_type: DataType,
    pub dimensions: Vec<ArrayDimension>,
    pub initializer: Option<Initializer>,
    pub parameter_mode: ParameterMode,
    pub optional: bool,
    pub scope: Option<VariableScope>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroupDeclaration {
    pub level: u8,
    pub name: Identifier,
    pub dimensions: Vec<ArrayDimension>,
    pub members: Vec<DataItem>,
    pub scope: Option<VariableScope>,
    pub range: TextRange,
}

/// `REDEFINE #A` followed by the members overlaying it.
#[derive(Clone, Debug, PartialEq)]
pub struct Redefinition {
    pub level: u8,
    pub target: VariableReference,
    pub members: Vec<DataItem>,
    pub range: TextRange,
}

/// `1 EMP VIEW OF EMPLOYEES` with its field list.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewDeclaration {
    pub level: u8,
    pub name: Identifier,
    pub ddm: Identifier,
    pub fields: Vec<ViewField>,
    pub scope: Option<VariableScope>,
    pub range: TextRange,
}

/// A DDM field listed under a view. Nested periodic group members keep
/// their level and stay in the flat list.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewField {
    pub level: u8,
    pub name: Identifier,
    pub data_type: Option<DataType>,
    pub dimensions: Vec<ArrayDimension>,
    pub range: TextRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataFormat {
    Alphanumeric,
    Binary,
    Control,
    Date,
    Float,
    Integer,
    Logical,
    Numeric,
    Packed,
    Time,
    Unicode,
}

impl DataFormat {
    pub fn from_letter(letter: char) -> Option<Self> {
        let format = match letter.to_ascii_uppercase() {
            'A' => DataFormat::Alphanumeric,
            'B' => DataFormat::Binary,
            'C' => DataFormat::Control,
            'D' => DataFormat::Date,
            'F' => DataFormat::Float,
            'I' => DataFormat::Integer,
            'L' => DataFormat::Logical,
            'N' => DataFormat::Numeric,
            'P' => DataFormat::Packed,
            'T' => DataFormat::Time,
            'U' => DataFormat::Unicode,
            _ => return None,
        };
        Some(format)
    }

    pub fn letter(self) -> char {
        match self {
            DataFormat::Alphanumeric => 'A',
            DataFormat::Binary => 'B',
            DataFormat::Control => 'C',
            DataFormat::Date => 'D',
            DataFormat::Float => 'F',
            DataFormat::Integer => 'I',
            DataFormat::Logical => 'L',
            DataFormat::Numeric => 'N',
            DataFormat::Packed => 'P',
            DataFormat::Time => 'T',
            DataFormat::Unicode => 'U',
        }
    }

    /// Formats whose length is implied and must not be written.
    pub fn has_fixed_length(self) -> bool {
        matches!(
            self,
            DataFormat::Control | DataFormat::Date | DataFormat::Logical | DataFormat::Time
        )
    }
}

/// `(N7,2)`: format plus the length exactly as written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataType {
    pub format: DataFormat,
    pub length: Option<SmolStr>,
    pub dynamic: bool,
    pub range: TextRange,
}

impl DataType {
    /// `N7,2` style rendering.
    pub fn display(&self) -> String {
        match &self.length {
            Some(length) => format!("{}{}", self.format.letter(), length),
            None if self.dynamic => format!("{} DYNAMIC", self.format.letter()),
            None => self.format.letter().to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DimensionBound {
    Number(SmolStr),
    /// `1:V` in parameter areas, or a named constant.
    Name(Identifier),
    /// `*`
    Unbounded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayDimension {
    pub lower: Option<DimensionBound>,
    pub upper: DimensionBound,
    pub range: TextRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InitializerKind {
    Init,
    InitAll,
    Const,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Initializer {
    pub kind: InitializerKind,
    pub values: Vec<Expression>,
    pub range: TextRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ParameterMode {
    #[default]
    ByReference,
    ByValue,
    ByValueResult,
}

// ============================================================================
// OPERANDS AND EXPRESSIONS
// ============================================================================

/// A (possibly qualified and subscripted) variable use.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableReference {
    /// `GRP` in `GRP.#VAR`.
    pub qualifier: Option<Identifier>,
    pub name: Identifier,
    pub subscripts: Vec<Subscript>,
    pub resolved: Option<SymbolId>,
    pub range: TextRange,
}

impl VariableReference {
    pub fn simple(name: Identifier) -> Self {
        Self {
            range: name.range,
            qualifier: None,
            name,
            subscripts: Vec::new(),
            resolved: None,
        }
    }

    /// `GRP.#VAR` or `#VAR`, as written.
    pub fn display_name(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{}.{}", q.name, self.name.name),
            None => self.name.name.to_string(),
        }
    }

    /// Same variable, ignoring subscripts and case.
    pub fn same_variable(&self, other: &VariableReference) -> bool {
        self.name.normalized() == other.name.normalized()
            && self.qualifier.as_ref().map(Identifier::normalized)
                == other.qualifier.as_ref().map(Identifier::normalized)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Subscript {
    Index(Expression),
    Range { from: Expression, to: Expression },
    All(TextRange),
    /// `(R1.)`: the occurrence read by a labelled loop.
    Label(Identifier),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    String,
    Numeric,
    Hex,
    Date,
    Time,
    Boolean,
}

/// A literal; `text` is verbatim source, numbers are never converted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: SmolStr,
    pub range: TextRange,
}

impl Literal {
    /// Content of a string literal without quotes and with `''` unescaped.
    pub fn string_value(&self) -> Option<String> {
        if self.kind != LiteralKind::String || self.text.len() < 2 {
            return None;
        }
        let quote = self.text.chars().next()?;
        let inner = &self.text[1..self.text.len() - 1];
        let doubled = format!("{quote}{quote}");
        Some(inner.replace(&doubled, &quote.to_string()))
    }
}

/// `*DATX`, or a system function call like `*TRIM(#A)`.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemVariable {
    pub name: SmolStr,
    /// `*COUNTER(R1.)` refers to a labelled loop.
    pub label: Option<Identifier>,
    pub arguments: Vec<Expression>,
    pub range: TextRange,
}

/// Operand positions: anything that is not an arithmetic combination.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Variable(VariableReference),
    SystemVariable(SystemVariable),
    Literal(Literal),
}

impl Operand {
    pub fn range(&self) -> TextRange {
        match self {
            Operand::Variable(v) => v.range,
            Operand::SystemVariable(s) => s.range,
            Operand::Literal(l) => l.range,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableReference> {
        match self {
            Operand::Variable(v) => Some(v),
            Operand::SystemVariable(_) | Operand::Literal(_) => None,
        }
    }
}

/// Built-in functions such as `VAL(#A)` or `ABS(#B)`.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionCall {
    pub name: Identifier,
    pub arguments: Vec<Expression>,
    pub range: TextRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Plus,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Less
                | BinaryOp::LessEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterEqual
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryExpression {
    pub op: UnaryOp,
    pub operand: Box<Expression>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpression {
    pub op: BinaryOp,
    pub lhs: Box<Expression>,
    pub rhs: Box<Expression>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParenExpression {
    pub inner: Box<Expression>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Operand(Operand),
    Function(FunctionCall),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    Paren(ParenExpression),
}

impl Expression {
    pub fn range(&self) -> TextRange {
        match self {
            Expression::Operand(o) => o.range(),
            Expression::Function(f) => f.range,
            Expression::Unary(u) => u.range,
            Expression::Binary(b) => b.range,
            Expression::Paren(p) => p.range,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableReference> {
        match self {
            Expression::Operand(operand) => operand.as_variable(),
            Expression::Paren(paren) => paren.inner.as_variable(),
            Expression::Function(_) | Expression::Unary(_) | Expression::Binary(_) => None,
        }
    }
}

// ============================================================================
// OUTPUT / INPUT ELEMENTS
// ============================================================================

/// `AD=O`, `CD=RE`, `EM=ZZ9.99`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: SmolStr,
    pub value: SmolStr,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeList {
    pub attributes: Vec<Attribute>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextElement {
    pub literal: Literal,
    /// `'-' (20)` repeats the text.
    pub repeat: Option<Literal>,
    pub attributes: Option<AttributeList>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OperandElement {
    pub operand: Operand,
    pub attributes: Option<AttributeList>,
    pub range: TextRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PositioningKind {
    /// `nX`
    Spacing,
    /// `nT`
    Tabulation,
    /// `/`
    NewLine,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Positioning {
    pub kind: PositioningKind,
    pub text: SmolStr,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OutputElement {
    Text(TextElement),
    Operand(OperandElement),
    Positioning(Positioning),
}

impl OutputElement {
    pub fn range(&self) -> TextRange {
        match self {
            OutputElement::Text(t) => t.range,
            OutputElement::Operand(o) => o.range,
            OutputElement::Positioning(p) => p.range,
        }
    }
}

// ============================================================================
// STATEMENTS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Write,
    Display,
    Print,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OutputStatement {
    pub kind: OutputKind,
    pub statement_attributes: Option<AttributeList>,
    pub no_title: bool,
    pub no_header: bool,
    pub elements: Vec<OutputElement>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InputStatement {
    pub statement_attributes: Option<AttributeList>,
    /// `USING MAP 'NAME'`.
    pub map: Option<Literal>,
    pub elements: Vec<OutputElement>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MoveStatement {
    pub rounded: bool,
    pub source: Operand,
    pub targets: Vec<VariableReference>,
    pub range: TextRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssignKeyword {
    Assign,
    Compute,
    /// `#A := 1` without a keyword.
    Implicit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignStatement {
    pub keyword: AssignKeyword,
    pub rounded: bool,
    pub target: VariableReference,
    pub value: Expression,
    pub range: TextRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// `ADD a b TO c`, `SUBTRACT a FROM c`, `MULTIPLY c BY a`, `DIVIDE a INTO c`,
/// each with an optional `GIVING`.
#[derive(Clone, Debug, PartialEq)]
pub struct ArithmeticStatement {
    pub op: ArithmeticOp,
    pub rounded: bool,
    pub operands: Vec<Operand>,
    pub target: Operand,
    pub giving: Option<VariableReference>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResetStatement {
    pub initial: bool,
    pub targets: Vec<VariableReference>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompressStatement {
    pub operands: Vec<Operand>,
    pub into: VariableReference,
    pub leaving_no_space: bool,
    pub range: TextRange,
}

/// A branch body (`ELSE`, `NONE`, ...) with the range of its header.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub body: Vec<Statement>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_body: Vec<Statement>,
    pub else_branch: Option<Branch>,
    pub range: TextRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecideMode {
    First,
    Every,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecideValueBranch {
    pub values: Vec<Operand>,
    pub body: Vec<Statement>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecideOnStatement {
    pub mode: DecideMode,
    pub operand: Operand,
    pub branches: Vec<DecideValueBranch>,
    pub any: Option<Branch>,
    pub all: Option<Branch>,
    pub none: Option<Branch>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecideWhenBranch {
    pub condition: Expression,
    pub body: Vec<Statement>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecideForStatement {
    pub mode: DecideMode,
    pub branches: Vec<DecideWhenBranch>,
    pub any: Option<Branch>,
    pub all: Option<Branch>,
    pub none: Option<Branch>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForStatement {
    pub label: Option<Identifier>,
    pub variable: VariableReference,
    pub from: Expression,
    pub to: Expression,
    pub step: Option<Expression>,
    pub body: Vec<Statement>,
    pub range: TextRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoopConditionKind {
    Until,
    While,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoopCondition {
    pub kind: LoopConditionKind,
    pub condition: Expression,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RepeatStatement {
    pub label: Option<Identifier>,
    pub leading: Option<LoopCondition>,
    pub body: Vec<Statement>,
    pub trailing: Option<LoopCondition>,
    pub range: TextRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ReadOrder {
    #[default]
    Unspecified,
    Physical,
    Logical,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReadStatement {
    pub label: Option<Identifier>,
    pub limit: Option<Literal>,
    pub view: Identifier,
    pub order: ReadOrder,
    pub descriptor: Option<Identifier>,
    pub starting: Option<Expression>,
    pub ending: Option<Expression>,
    pub where_clause: Option<Expression>,
    pub body: Vec<Statement>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FindStatement {
    pub label: Option<Identifier>,
    pub limit: Option<Literal>,
    pub view: Identifier,
    pub criteria: Expression,
    pub where_clause: Option<Expression>,
    pub body: Vec<Statement>,
    pub range: TextRange,
}

/// A parameter passed to CALLNAT/FETCH/PERFORM.
#[derive(Clone, Debug, PartialEq)]
pub enum ModuleParameter {
    Value {
        operand: Operand,
        attributes: Option<AttributeList>,
        range: TextRange,
    },
    /// `nX` skips optional parameters.
    Skipped { count: SmolStr, range: TextRange },
}

impl ModuleParameter {
    pub fn range(&self) -> TextRange {
        match self {
            ModuleParameter::Value { range, .. } | ModuleParameter::Skipped { range, .. } => *range,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallnatStatement {
    pub module: Operand,
    pub parameters: Vec<ModuleParameter>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FetchStatement {
    pub returning: bool,
    pub module: Operand,
    pub parameters: Vec<ModuleParameter>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PerformStatement {
    pub subroutine: Identifier,
    pub parameters: Vec<ModuleParameter>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IncludeStatement {
    pub copycode: Identifier,
    pub parameters: Vec<Literal>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubroutineDefinition {
    pub name: Identifier,
    pub body: Vec<Statement>,
    pub range: TextRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EscapeKind {
    Top,
    Bottom,
    Routine,
    Module,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EscapeStatement {
    pub kind: EscapeKind,
    pub range: TextRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SimpleStatementKind {
    Ignore,
    Stop,
    End,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimpleStatement {
    pub kind: SimpleStatementKind,
    pub range: TextRange,
}

/// Tokens discarded while recovering from a syntax error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorNode {
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Output(OutputStatement),
    Input(InputStatement),
    Move(MoveStatement),
    Assign(AssignStatement),
    Arithmetic(ArithmeticStatement),
    Reset(ResetStatement),
    Compress(CompressStatement),
    If(IfStatement),
    DecideOn(DecideOnStatement),
    DecideFor(DecideForStatement),
    For(ForStatement),
    Repeat(RepeatStatement),
    Read(ReadStatement),
    Find(FindStatement),
    Callnat(CallnatStatement),
    Fetch(FetchStatement),
    Perform(PerformStatement),
    Include(IncludeStatement),
    DefineSubroutine(SubroutineDefinition),
    Escape(EscapeStatement),
    Simple(SimpleStatement),
    Error(ErrorNode),
}

impl Statement {
    pub fn range(&self) -> TextRange {
        match self {
            Statement::Output(s) => s.range,
            Statement::Input(s) => s.range,
            Statement::Move(s) => s.range,
            Statement::Assign(s) => s.range,
            Statement::Arithmetic(s) => s.range,
            Statement::Reset(s) => s.range,
            Statement::Compress(s) => s.range,
            Statement::If(s) => s.range,
            Statement::DecideOn(s) => s.range,
            Statement::DecideFor(s) => s.range,
            Statement::For(s) => s.range,
            Statement::Repeat(s) => s.range,
            Statement::Read(s) => s.range,
            Statement::Find(s) => s.range,
            Statement::Callnat(s) => s.range,
            Statement::Fetch(s) => s.range,
            Statement::Perform(s) => s.range,
            Statement::Include(s) => s.range,
            Statement::DefineSubroutine(s) => s.range,
            Statement::Escape(s) => s.range,
            Statement::Simple(s) => s.range,
            Statement::Error(s) => s.range,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Statement::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn test_string_value_unescapes_doubled_quotes() {
        let literal = Literal {
            kind: LiteralKind::String,
            text: SmolStr::new("'it''s'"),
            range: range(0, 7),
        };
        assert_eq!(literal.string_value().as_deref(), Some("it's"));
    }

    #[test]
    fn test_same_variable_ignores_case_and_subscripts() {
        let a = VariableReference::simple(Identifier::new("#Var", range(0, 4)));
        let mut b = VariableReference::simple(Identifier::new("#VAR", range(10, 14)));
        b.subscripts.push(Subscript::All(range(15, 16)));
        assert!(a.same_variable(&b));
    }

    #[test]
    fn test_data_type_display() {
        let ty = DataType {
            format: DataFormat::Numeric,
            length: Some(SmolStr::new("7,2")),
            dynamic: false,
            range: range(0, 4),
        };
        assert_eq!(ty.display(), "N7,2");
        assert!(DataFormat::Logical.has_fixed_length());
    }
}
