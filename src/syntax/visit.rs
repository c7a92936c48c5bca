//! Tree traversal.
//!
//! [`NodeRef`] is a borrowed, kind-tagged view of any node. Its
//! [`children`](NodeRef::children) are listed in source order, which makes
//! [`walk`] and [`NodeRef::descendants`] source-order pre-order traversals.
//!
//! The resolver uses [`walk_references_mut`] to annotate every
//! [`VariableReference`] in place.

use crate::base::TextRange;
use crate::syntax::ast::*;

/// Tag for every kind of node the traversal yields.
///
/// Analyzers register interest in these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    CompilationUnit,
    DefineData,
    DataBlock,
    VariableDeclaration,
    GroupDeclaration,
    Redefinition,
    ViewDeclaration,
    ViewField,
    // Statements
    OutputStatement,
    InputStatement,
    MoveStatement,
    AssignStatement,
    ArithmeticStatement,
    ResetStatement,
    CompressStatement,
    IfStatement,
    DecideOnStatement,
    DecideForStatement,
    ForStatement,
    RepeatStatement,
    ReadStatement,
    FindStatement,
    CallnatStatement,
    FetchStatement,
    PerformStatement,
    IncludeStatement,
    SubroutineDefinition,
    EscapeStatement,
    SimpleStatement,
    ErrorNode,
    // Elements
    TextElement,
    OperandElement,
    Positioning,
    AttributeList,
    // Expressions
    Literal,
    VariableReference,
    SystemVariable,
    FunctionCall,
    UnaryExpression,
    BinaryExpression,
    ParenExpression,
}

impl NodeKind {
    pub const ALL: &'static [NodeKind] = &[
        NodeKind::CompilationUnit,
        NodeKind::DefineData,
        NodeKind::DataBlock,
        NodeKind::VariableDeclaration,
        NodeKind::GroupDeclaration,
        NodeKind::Redefinition,
        NodeKind::ViewDeclaration,
        NodeKind::ViewField,
        NodeKind::OutputStatement,
        NodeKind::InputStatement,
        NodeKind::MoveStatement,
        NodeKind::AssignStatement,
        NodeKind::ArithmeticStatement,
        NodeKind::ResetStatement,
        NodeKind::CompressStatement,
        NodeKind::IfStatement,
        NodeKind::DecideOnStatement,
        NodeKind::DecideForStatement,
        NodeKind::ForStatement,
        NodeKind::RepeatStatement,
        NodeKind::ReadStatement,
        NodeKind::FindStatement,
        NodeKind::CallnatStatement,
        NodeKind::FetchStatement,
        NodeKind::PerformStatement,
        NodeKind::IncludeStatement,
        NodeKind::SubroutineDefinition,
        NodeKind::EscapeStatement,
        NodeKind::SimpleStatement,
        NodeKind::ErrorNode,
        NodeKind::TextElement,
        NodeKind::OperandElement,
        NodeKind::Positioning,
        NodeKind::AttributeList,
        NodeKind::Literal,
        NodeKind::VariableReference,
        NodeKind::SystemVariable,
        NodeKind::FunctionCall,
        NodeKind::UnaryExpression,
        NodeKind::BinaryExpression,
        NodeKind::ParenExpression,
    ];

    pub fn is_statement(self) -> bool {
        (NodeKind::OutputStatement..=NodeKind::ErrorNode).contains(&self)
    }

    pub fn is_expression(self) -> bool {
        self >= NodeKind::Literal
    }
}

/// A borrowed node of any kind.
#[derive(Clone, Copy, Debug)]
pub enum NodeRef<'a> {
    CompilationUnit(&'a CompilationUnit),
    DefineData(&'a DefineData),
    DataBlock(&'a DataBlock),
    VariableDeclaration(&'a VariableDeclaration),
    GroupDeclaration(&'a GroupDeclaration),
    Redefinition(&'a Redefinition),
    ViewDeclaration(&'a ViewDeclaration),
    ViewField(&'a ViewField),
    OutputStatement(&'a OutputStatement),
    InputStatement(&'a InputStatement),
    MoveStatement(&'a MoveStatement),
    AssignStatement(&'a AssignStatement),
    ArithmeticStatement(&'a ArithmeticStatement),
    ResetStatement(&'a ResetStatement),
    CompressStatement(&'a CompressStatement),
    IfStatement(&'a IfStatement),
    DecideOnStatement(&'a DecideOnStatement),
    DecideForStatement(&'a DecideForStatement),
    ForStatement(&'a ForStatement),
    RepeatStatement(&'a RepeatStatement),
    ReadStatement(&'a ReadStatement),
    FindStatement(&'a FindStatement),
    CallnatStatement(&'a CallnatStatement),
    FetchStatement(&'a FetchStatement),
    PerformStatement(&'a PerformStatement),
    IncludeStatement(&'a IncludeStatement),
    SubroutineDefinition(&'a SubroutineDefinition),
    EscapeStatement(&'a EscapeStatement),
    SimpleStatement(&'a SimpleStatement),
    ErrorNode(&'a ErrorNode),
    TextElement(&'a TextElement),
    OperandElement(&'a OperandElement),
    Positioning(&'a Positioning),
    AttributeList(&'a AttributeList),
    Literal(&'a Literal),
    VariableReference(&'a VariableReference),
    SystemVariable(&'a SystemVariable),
    FunctionCall(&'a FunctionCall),
    UnaryExpression(&'a UnaryExpression),
    BinaryExpression(&'a BinaryExpression),
    ParenExpression(&'a ParenExpression),
}

impl<'a> NodeRef<'a> {
    pub fn kind(self) -> NodeKind {
        match self {
            NodeRef::CompilationUnit(_) => NodeKind::CompilationUnit,
            NodeRef::DefineData(_) => NodeKind::DefineData,
            NodeRef::DataBlock(_) => NodeKind::DataBlock,
            NodeRef::VariableDeclaration(_) => NodeKind::VariableDeclaration,
            NodeRef::GroupDeclaration(_) => NodeKind::GroupDeclaration,
            NodeRef::Redefinition(_) => NodeKind::Redefinition,
            NodeRef::ViewDeclaration(_) => NodeKind::ViewDeclaration,
            NodeRef::ViewField(_) => NodeKind::ViewField,
            NodeRef::OutputStatement(_) => NodeKind::OutputStatement,
            NodeRef::InputStatement(_) => NodeKind::InputStatement,
            NodeRef::MoveStatement(_) => NodeKind::MoveStatement,
            NodeRef::AssignStatement(_) => NodeKind::AssignStatement,
            NodeRef::ArithmeticStatement(_) => NodeKind::ArithmeticStatement,
            NodeRef::ResetStatement(_) => NodeKind::ResetStatement,
            NodeRef::CompressStatement(_) => NodeKind::CompressStatement,
            NodeRef::IfStatement(_) => NodeKind::IfStatement,
            NodeRef::DecideOnStatement(_) => NodeKind::DecideOnStatement,
            NodeRef::DecideForStatement(_) => NodeKind::DecideForStatement,
            NodeRef::ForStatement(_) => NodeKind::ForStatement,
            NodeRef::RepeatStatement(_) => NodeKind::RepeatStatement,
            NodeRef::ReadStatement(_) => NodeKind::ReadStatement,
            NodeRef::FindStatement(_) => NodeKind::FindStatement,
            NodeRef::CallnatStatement(_) => NodeKind::CallnatStatement,
            NodeRef::FetchStatement(_) => NodeKind::FetchStatement,
            NodeRef::PerformStatement(_) => NodeKind::PerformStatement,
            NodeRef::IncludeStatement(_) => NodeKind::IncludeStatement,
            NodeRef::SubroutineDefinition(_) => NodeKind::SubroutineDefinition,
            NodeRef::EscapeStatement(_) => NodeKind::EscapeStatement,
            NodeRef::SimpleStatement(_) => NodeKind::SimpleStatement,
            NodeRef::ErrorNode(_) => NodeKind::ErrorNode,
            NodeRef::TextElement(_) => NodeKind::TextElement,
            NodeRef::OperandElement(_) => NodeKind::OperandElement,
            NodeRef::Positioning(_) => NodeKind::Positioning,
            NodeRef::AttributeList(_) => NodeKind::AttributeList,
            NodeRef::Literal(_) => NodeKind::Literal,
            NodeRef::VariableReference(_) => NodeKind::VariableReference,
            NodeRef::SystemVariable(_) => NodeKind::SystemVariable,
            NodeRef::FunctionCall(_) => NodeKind::FunctionCall,
            NodeRef::UnaryExpression(_) => NodeKind::UnaryExpression,
            NodeRef::BinaryExpression(_) => NodeKind::BinaryExpression,
            NodeRef::ParenExpression(_) => NodeKind::ParenExpression,
        }
    }

    pub fn range(self) -> TextRange {
        match self {
            NodeRef::CompilationUnit(n) => n.range,
            NodeRef::DefineData(n) => n.range,
            NodeRef::DataBlock(n) => n.range,
            NodeRef::VariableDeclaration(n) => n.range,
            NodeRef::GroupDeclaration(n) => n.range,
            NodeRef::Redefinition(n) => n.range,
            NodeRef::ViewDeclaration(n) => n.range,
            NodeRef::ViewField(n) => n.range,
            NodeRef::OutputStatement(n) => n.range,
            NodeRef::InputStatement(n) => n.range,
            NodeRef::MoveStatement(n) => n.range,
            NodeRef::AssignStatement(n) => n.range,
            NodeRef::ArithmeticStatement(n) => n.range,
            NodeRef::ResetStatement(n) => n.range,
            NodeRef::CompressStatement(n) => n.range,
            NodeRef::IfStatement(n) => n.range,
            NodeRef::DecideOnStatement(n) => n.range,
            NodeRef::DecideForStatement(n) => n.range,
            NodeRef::ForStatement(n) => n.range,
            NodeRef::RepeatStatement(n) => n.range,
            NodeRef::ReadStatement(n) => n.range,
            NodeRef::FindStatement(n) => n.range,
            NodeRef::CallnatStatement(n) => n.range,
            NodeRef::FetchStatement(n) => n.range,
            NodeRef::PerformStatement(n) => n.range,
            NodeRef::IncludeStatement(n) => n.range,
            NodeRef::SubroutineDefinition(n) => n.range,
            NodeRef::EscapeStatement(n) => n.range,
            NodeRef::SimpleStatement(n) => n.range,
            NodeRef::ErrorNode(n) => n.range,
            NodeRef::TextElement(n) => n.range,
            NodeRef::OperandElement(n) => n.range,
            NodeRef::Positioning(n) => n.range,
            NodeRef::AttributeList(n) => n.range,
            NodeRef::Literal(n) => n.range,
            NodeRef::VariableReference(n) => n.range,
            NodeRef::SystemVariable(n) => n.range,
            NodeRef::FunctionCall(n) => n.range,
            NodeRef::UnaryExpression(n) => n.range,
            NodeRef::BinaryExpression(n) => n.range,
            NodeRef::ParenExpression(n) => n.range,
        }
    }

    pub fn from_statement(statement: &'a Statement) -> Self {
        match statement {
            Statement::Output(s) => NodeRef::OutputStatement(s),
            Statement::Input(s) => NodeRef::InputStatement(s),
            Statement::Move(s) => NodeRef::MoveStatement(s),
            Statement::Assign(s) => NodeRef::AssignStatement(s),
            Statement::Arithmetic(s) => NodeRef::ArithmeticStatement(s),
            Statement::Reset(s) => NodeRef::ResetStatement(s),
            Statement::Compress(s) => NodeRef::CompressStatement(s),
            Statement::If(s) => NodeRef::IfStatement(s),
            Statement::DecideOn(s) => NodeRef::DecideOnStatement(s),
            Statement::DecideFor(s) => NodeRef::DecideForStatement(s),
            Statement::For(s) => NodeRef::ForStatement(s),
            Statement::Repeat(s) => NodeRef::RepeatStatement(s),
            Statement::Read(s) => NodeRef::ReadStatement(s),
            Statement::Find(s) => NodeRef::FindStatement(s),
            Statement::Callnat(s) => NodeRef::CallnatStatement(s),
            Statement::Fetch(s) => NodeRef::FetchStatement(s),
            Statement::Perform(s) => NodeRef::PerformStatement(s),
            Statement::Include(s) => NodeRef::IncludeStatement(s),
            Statement::DefineSubroutine(s) => NodeRef::SubroutineDefinition(s),
            Statement::Escape(s) => NodeRef::EscapeStatement(s),
            Statement::Simple(s) => NodeRef::SimpleStatement(s),
            Statement::Error(s) => NodeRef::ErrorNode(s),
        }
    }

    pub fn from_expression(expression: &'a Expression) -> Self {
        match expression {
            Expression::Operand(operand) => NodeRef::from_operand(operand),
            Expression::Function(e) => NodeRef::FunctionCall(e),
            Expression::Unary(e) => NodeRef::UnaryExpression(e),
            Expression::Binary(e) => NodeRef::BinaryExpression(e),
            Expression::Paren(e) => NodeRef::ParenExpression(e),
        }
    }

    pub fn from_operand(operand: &'a Operand) -> Self {
        match operand {
            Operand::Variable(v) => NodeRef::VariableReference(v),
            Operand::SystemVariable(v) => NodeRef::SystemVariable(v),
            Operand::Literal(l) => NodeRef::Literal(l),
        }
    }

    pub fn from_data_item(item: &'a DataItem) -> Self {
        match item {
            DataItem::Variable(v) => NodeRef::VariableDeclaration(v),
            DataItem::Group(g) => NodeRef::GroupDeclaration(g),
            DataItem::Redefine(r) => NodeRef::Redefinition(r),
            DataItem::View(v) => NodeRef::ViewDeclaration(v),
        }
    }

    pub fn from_element(element: &'a OutputElement) -> Self {
        match element {
            OutputElement::Text(t) => NodeRef::TextElement(t),
            OutputElement::Operand(o) => NodeRef::OperandElement(o),
            OutputElement::Positioning(p) => NodeRef::Positioning(p),
        }
    }

    /// Direct children in source order.
    pub fn children(self) -> Vec<NodeRef<'a>> {
        let mut out = Children::default();
        match self {
            NodeRef::CompilationUnit(unit) => {
                if let Some(define_data) = &unit.define_data {
                    out.push(NodeRef::DefineData(define_data));
                }
                out.statements(&unit.body);
            }
            NodeRef::DefineData(define_data) => {
                out.extend(define_data.blocks.iter().map(NodeRef::DataBlock));
            }
            NodeRef::DataBlock(block) => out.data_items(&block.items),
            NodeRef::VariableDeclaration(var) => {
                if let Some(init) = &var.initializer {
                    out.expressions(&init.values);
                }
            }
            NodeRef::GroupDeclaration(group) => out.data_items(&group.members),
            NodeRef::Redefinition(redefine) => {
                out.push(NodeRef::VariableReference(&redefine.target));
                out.data_items(&redefine.members);
            }
            NodeRef::ViewDeclaration(view) => {
                out.extend(view.fields.iter().map(NodeRef::ViewField));
            }
            NodeRef::ViewField(_) => {}
            NodeRef::OutputStatement(stmt) => {
                out.attributes(&stmt.statement_attributes);
                out.elements(&stmt.elements);
            }
            NodeRef::InputStatement(stmt) => {
                out.attributes(&stmt.statement_attributes);
                if let Some(map) = &stmt.map {
                    out.push(NodeRef::Literal(map));
                }
                out.elements(&stmt.elements);
            }
            NodeRef::MoveStatement(stmt) => {
                out.push(NodeRef::from_operand(&stmt.source));
                out.extend(stmt.targets.iter().map(NodeRef::VariableReference));
            }
            NodeRef::AssignStatement(stmt) => {
                out.push(NodeRef::VariableReference(&stmt.target));
                out.push(NodeRef::from_expression(&stmt.value));
            }
            NodeRef::ArithmeticStatement(stmt) => {
                if stmt.op == ArithmeticOp::Multiply {
                    out.push(NodeRef::from_operand(&stmt.target));
                    out.operands(&stmt.operands);
                } else {
                    out.operands(&stmt.operands);
                    out.push(NodeRef::from_operand(&stmt.target));
                }
                if let Some(giving) = &stmt.giving {
                    out.push(NodeRef::VariableReference(giving));
                }
            }
            NodeRef::ResetStatement(stmt) => {
                out.extend(stmt.targets.iter().map(NodeRef::VariableReference));
            }
            NodeRef::CompressStatement(stmt) => {
                out.operands(&stmt.operands);
                out.push(NodeRef::VariableReference(&stmt.into));
            }
            NodeRef::IfStatement(stmt) => {
                out.push(NodeRef::from_expression(&stmt.condition));
                out.statements(&stmt.then_body);
                if let Some(branch) = &stmt.else_branch {
                    out.statements(&branch.body);
                }
            }
            NodeRef::DecideOnStatement(stmt) => {
                out.push(NodeRef::from_operand(&stmt.operand));
                for branch in &stmt.branches {
                    out.operands(&branch.values);
                    out.statements(&branch.body);
                }
                out.branches([&stmt.any, &stmt.all, &stmt.none]);
            }
            NodeRef::DecideForStatement(stmt) => {
                for branch in &stmt.branches {
                    out.push(NodeRef::from_expression(&branch.condition));
                    out.statements(&branch.body);
                }
                out.branches([&stmt.any, &stmt.all, &stmt.none]);
            }
            NodeRef::ForStatement(stmt) => {
                out.push(NodeRef::VariableReference(&stmt.variable));
                out.push(NodeRef::from_expression(&stmt.from));
                out.push(NodeRef::from_expression(&stmt.to));
                if let Some(step) = &stmt.step {
                    out.push(NodeRef::from_expression(step));
                }
                out.statements(&stmt.body);
            }
            NodeRef::RepeatStatement(stmt) => {
                if let Some(leading) = &stmt.leading {
                    out.push(NodeRef::from_expression(&leading.condition));
                }
                out.statements(&stmt.body);
                if let Some(trailing) = &stmt.trailing {
                    out.push(NodeRef::from_expression(&trailing.condition));
                }
            }
            NodeRef::ReadStatement(stmt) => {
                if let Some(limit) = &stmt.limit {
                    out.push(NodeRef::Literal(limit));
                }
                for e in [&stmt.starting, &stmt.ending, &stmt.where_clause].into_iter().flatten() {
                    out.push(NodeRef::from_expression(e));
                }
                out.statements(&stmt.body);
            }
            NodeRef::FindStatement(stmt) => {
                if let Some(limit) = &stmt.limit {
                    out.push(NodeRef::Literal(limit));
                }
                out.push(NodeRef::from_expression(&stmt.criteria));
                if let Some(where_clause) = &stmt.where_clause {
                    out.push(NodeRef::from_expression(where_clause));
                }
                out.statements(&stmt.body);
            }
            NodeRef::CallnatStatement(stmt) => {
                out.push(NodeRef::from_operand(&stmt.module));
                out.parameters(&stmt.parameters);
            }
            NodeRef::FetchStatement(stmt) => {
                out.push(NodeRef::from_operand(&stmt.module));
                out.parameters(&stmt.parameters);
            }
            NodeRef::PerformStatement(stmt) => out.parameters(&stmt.parameters),
            NodeRef::IncludeStatement(stmt) => {
                out.extend(stmt.parameters.iter().map(NodeRef::Literal));
            }
            NodeRef::SubroutineDefinition(sub) => out.statements(&sub.body),
            NodeRef::EscapeStatement(_) | NodeRef::SimpleStatement(_) | NodeRef::ErrorNode(_) => {}
            NodeRef::TextElement(text) => {
                out.push(NodeRef::Literal(&text.literal));
                if let Some(repeat) = &text.repeat {
                    out.push(NodeRef::Literal(repeat));
                }
                out.attributes(&text.attributes);
            }
            NodeRef::OperandElement(element) => {
                out.push(NodeRef::from_operand(&element.operand));
                out.attributes(&element.attributes);
            }
            NodeRef::Positioning(_) | NodeRef::AttributeList(_) | NodeRef::Literal(_) => {}
            NodeRef::VariableReference(reference) => {
                for subscript in &reference.subscripts {
                    match subscript {
                        Subscript::Index(e) => out.push(NodeRef::from_expression(e)),
                        Subscript::Range { from, to } => {
                            out.push(NodeRef::from_expression(from));
                            out.push(NodeRef::from_expression(to));
                        }
                        Subscript::All(_) | Subscript::Label(_) => {}
                    }
                }
            }
            NodeRef::SystemVariable(var) => out.expressions(&var.arguments),
            NodeRef::FunctionCall(call) => out.expressions(&call.arguments),
            NodeRef::UnaryExpression(e) => out.push(NodeRef::from_expression(&e.operand)),
            NodeRef::BinaryExpression(e) => {
                out.push(NodeRef::from_expression(&e.lhs));
                out.push(NodeRef::from_expression(&e.rhs));
            }
            NodeRef::ParenExpression(e) => out.push(NodeRef::from_expression(&e.inner)),
        }
        out.0
    }

    /// This node and everything below it, in pre-order.
    pub fn descendants(self) -> Preorder<'a> {
        Preorder { stack: vec![self] }
    }
}

#[derive(Default)]
struct Children<'a>(Vec<NodeRef<'a>>);

impl<'a> Children<'a> {
    fn push(&mut self, node: NodeRef<'a>) {
        self.0.push(node);
    }

    fn extend(&mut self, nodes: impl IntoIterator<Item = NodeRef<'a>>) {
        self.0.extend(nodes);
    }

    fn statements(&mut self, statements: &'a [Statement]) {
        self.extend(statements.iter().map(NodeRef::from_statement));
    }

    fn expressions(&mut self, expressions: &'a [Expression]) {
        self.extend(expressions.iter().map(NodeRef::from_expression));
    }

    fn operands(&mut self, operands: &'a [Operand]) {
        self.extend(operands.iter().map(NodeRef::from_operand));
    }

    fn data_items(&mut self, items: &'a [DataItem]) {
        self.extend(items.iter().map(NodeRef::from_data_item));
    }

    fn elements(&mut self, elements: &'a [OutputElement]) {
        self.extend(elements.iter().map(NodeRef::from_element));
    }

    fn attributes(&mut self, attributes: &'a Option<AttributeList>) {
        if let Some(list) = attributes {
            self.push(NodeRef::AttributeList(list));
        }
    }

    fn branches(&mut self, branches: [&'a Option<Branch>; 3]) {
        for branch in branches.into_iter().flatten() {
            self.statements(&branch.body);
        }
    }

    fn parameters(&mut self, parameters: &'a [ModuleParameter]) {
        for parameter in parameters {
            if let ModuleParameter::Value {
                operand, attributes, ..
            } = parameter
            {
                self.push(NodeRef::from_operand(operand));
                self.attributes(attributes);
            }
        }
    }
}

/// Pre-order iterator returned by [`NodeRef::descendants`].
pub struct Preorder<'a> {
    stack: Vec<NodeRef<'a>>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<NodeRef<'a>> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().into_iter().rev());
        Some(node)
    }
}

/// Visits every node of `unit` in source pre-order.
pub fn walk<'a>(unit: &'a CompilationUnit, mut f: impl FnMut(NodeRef<'a>)) {
    for node in NodeRef::CompilationUnit(unit).descendants() {
        f(node);
    }
}

// ============================================================================
// Mutable reference walk
// ============================================================================

/// Calls `f` for every variable reference in `unit`, in source order.
///
/// Subscript expressions are visited after the reference that owns them.
pub fn walk_references_mut(unit: &mut CompilationUnit, f: &mut impl FnMut(&mut VariableReference)) {
    if let Some(define_data) = &mut unit.define_data {
        for block in &mut define_data.blocks {
            data_items_mut(&mut block.items, f);
        }
    }
    statements_mut(&mut unit.body, f);
}

fn data_items_mut(items: &mut [DataItem], f: &mut impl FnMut(&mut VariableReference)) {
    for item in items {
        match item {
            DataItem::Variable(var) => {
                if let Some(init) = &mut var.initializer {
                    init.values.iter_mut().for_each(|e| expression_mut(e, f));
                }
            }
            DataItem::Group(group) => data_items_mut(&mut group.members, f),
            DataItem::Redefine(redefine) => {
                reference_mut(&mut redefine.target, f);
                data_items_mut(&mut redefine.members, f);
            }
            DataItem::View(_) => {}
        }
    }
}

fn statements_mut(statements: &mut [Statement], f: &mut impl FnMut(&mut VariableReference)) {
    for statement in statements {
        statement_mut(statement, f);
    }
}

fn statement_mut(statement: &mut Statement, f: &mut impl FnMut(&mut VariableReference)) {
    match statement {
        Statement::Output(stmt) => elements_mut(&mut stmt.elements, f),
        Statement::Input(stmt) => elements_mut(&mut stmt.elements, f),
        Statement::Move(stmt) => {
            operand_mut(&mut stmt.source, f);
            stmt.targets.iter_mut().for_each(|r| reference_mut(r, f));
        }
        Statement::Assign(stmt) => {
            reference_mut(&mut stmt.target, f);
            expression_mut(&mut stmt.value, f);
        }
        Statement::Arithmetic(stmt) => {
            if stmt.op == ArithmeticOp::Multiply {
                operand_mut(&mut stmt.target, f);
                stmt.operands.iter_mut().for_each(|o| operand_mut(o, f));
            } else {
                stmt.operands.iter_mut().for_each(|o| operand_mut(o, f));
                operand_mut(&mut stmt.target, f);
            }
            if let Some(giving) = &mut stmt.giving {
                reference_mut(giving, f);
            }
        }
        Statement::Reset(stmt) => stmt.targets.iter_mut().for_each(|r| reference_mut(r, f)),
        Statement::Compress(stmt) => {
            stmt.operands.iter_mut().for_each(|o| operand_mut(o, f));
            reference_mut(&mut stmt.into, f);
        }
        Statement::If(stmt) => {
            expression_mut(&mut stmt.condition, f);
            statements_mut(&mut stmt.then_body, f);
            if let Some(branch) = &mut stmt.else_branch {
                statements_mut(&mut branch.body, f);
            }
        }
        Statement::DecideOn(stmt) => {
            operand_mut(&mut stmt.operand, f);
            for branch in &mut stmt.branches {
                branch.values.iter_mut().for_each(|o| operand_mut(o, f));
                statements_mut(&mut branch.body, f);
            }
            for branch in [&mut stmt.any, &mut stmt.all, &mut stmt.none].into_iter().flatten() {
                statements_mut(&mut branch.body, f);
            }
        }
        Statement::DecideFor(stmt) => {
            for branch in &mut stmt.branches {
                expression_mut(&mut branch.condition, f);
                statements_mut(&mut branch.body, f);
            }
            for branch in [&mut stmt.any, &mut stmt.all, &mut stmt.none].into_iter().flatten() {
                statements_mut(&mut branch.body, f);
            }
        }
        Statement::For(stmt) => {
            reference_mut(&mut stmt.variable, f);
            expression_mut(&mut stmt.from, f);
            expression_mut(&mut stmt.to, f);
            if let Some(step) = &mut stmt.step {
                expression_mut(step, f);
            }
            statements_mut(&mut stmt.body, f);
        }
        Statement::Repeat(stmt) => {
            if let Some(leading) = &mut stmt.leading {
                expression_mut(&mut leading.condition, f);
            }
            statements_mut(&mut stmt.body, f);
            if let Some(trailing) = &mut stmt.trailing {
                expression_mut(&mut trailing.condition, f);
            }
        }
        Statement::Read(stmt) => {
            for e in [&mut stmt.starting, &mut stmt.ending, &mut stmt.where_clause]
                .into_iter()
                .flatten()
            {
                expression_mut(e, f);
            }
            statements_mut(&mut stmt.body, f);
        }
        Statement::Find(stmt) => {
            expression_mut(&mut stmt.criteria, f);
            if let Some(where_clause) = &mut stmt.where_clause {
                expression_mut(where_clause, f);
            }
            statements_mut(&mut stmt.body, f);
        }
        Statement::Callnat(stmt) => {
            operand_mut(&mut stmt.module, f);
            parameters_mut(&mut stmt.parameters, f);
        }
        Statement::Fetch(stmt) => {
            operand_mut(&mut stmt.module, f);
            parameters_mut(&mut stmt.parameters, f);
        }
        Statement::Perform(stmt) => parameters_mut(&mut stmt.parameters, f),
        Statement::DefineSubroutine(sub) => statements_mut(&mut sub.body, f),
        Statement::Include(_)
        | Statement::Escape(_)
        | Statement::Simple(_)
        | Statement::Error(_) => {}
    }
}

fn elements_mut(elements: &mut [OutputElement], f: &mut impl FnMut(&mut VariableReference)) {
    for element in elements {
        if let OutputElement::Operand(element) = element {
            operand_mut(&mut element.operand, f);
        }
    }
}

fn parameters_mut(parameters: &mut [ModuleParameter], f: &mut impl FnMut(&mut VariableReference)) {
    for parameter in parameters {
        if let ModuleParameter::Value { operand, .. } = parameter {
            operand_mut(operand, f);
        }
    }
}

fn operand_mut(operand: &mut Operand, f: &mut impl FnMut(&mut VariableReference)) {
    match operand {
        Operand::Variable(reference) => reference_mut(reference, f),
        Operand::SystemVariable(var) => var.arguments.iter_mut().for_each(|e| expression_mut(e, f)),
        Operand::Literal(_) => {}
    }
}

fn expression_mut(expression: &mut Expression, f: &mut impl FnMut(&mut VariableReference)) {
    match expression {
        Expression::Operand(operand) => operand_mut(operand, f),
        Expression::Function(call) => call.arguments.iter_mut().for_each(|e| expression_mut(e, f)),
        Expression::Unary(e) => expression_mut(&mut e.operand, f),
        Expression::Binary(e) => {
            expression_mut(&mut e.lhs, f);
            expression_mut(&mut e.rhs, f);
        }
        Expression::Paren(e) => expression_mut(&mut e.inner, f),
    }
}

fn reference_mut(reference: &mut VariableReference, f: &mut impl FnMut(&mut VariableReference)) {
    f(reference);
    for subscript in &mut reference.subscripts {
        match subscript {
            Subscript::Index(e) => expression_mut(e, f),
            Subscript::Range { from, to } => {
                expression_mut(from, f);
                expression_mut(to, f);
            }
            Subscript::All(_) | Subscript::Label(_) => {}
        }
    }
}
