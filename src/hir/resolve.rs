//! Scope resolution: declarations, imports and variable references.
//!
//! [`ScopeResolver`] runs once per compilation unit, after parsing:
//!
//! 1. Every `DEFINE DATA` block gets its [`VariableScope`], and so does every
//!    declaration in it.
//! 2. `USING` clauses import data areas through [`ExternalDefinitions`].
//! 3. Declarations go into a [`SymbolTable`], with duplicate, scope-transition
//!    and independent-naming checks.
//! 4. View fields are checked against their DDM.
//! 5. Every [`VariableReference`] is resolved and counted.
//!
//! Nothing here aborts: every finding is a [`Diagnostic`].

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::diagnostics::{Diagnostic, DiagnosticOrigin, RelatedInfo, codes};
use super::scope::VariableScope;
use super::symbols::{Lookup, NewSymbol, SymbolId, SymbolKind, SymbolOrigin, SymbolTable};
use crate::base::{FileId, TextRange};
use crate::parser::SyntaxKind;
use crate::project::ddm::Ddm;
use crate::syntax::ast::{
    CompilationUnit, DataAreaKind, DataBlock, DataItem, DefineData, Identifier, InitializerKind,
    VariableReference,
};
use crate::syntax::visit::walk_references_mut;

// ============================================================================
// EXTERNAL DEFINITIONS
// ============================================================================

/// A parsed data area, ready to be imported with `USING`.
#[derive(Clone, Debug)]
pub struct DataAreaDefinition {
    pub name: SmolStr,
    pub kind: DataAreaKind,
    pub define_data: DefineData,
}

/// Definitions that live outside the unit being resolved.
pub trait ExternalDefinitions {
    /// A data area by module name.
    fn data_area(&self, name: &str) -> Option<Arc<DataAreaDefinition>>;

    /// A DDM by name.
    fn ddm(&self, name: &str) -> Option<Arc<Ddm>>;
}

/// No external definitions at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExternalDefinitions;

impl ExternalDefinitions for NoExternalDefinitions {
    fn data_area(&self, _name: &str) -> Option<Arc<DataAreaDefinition>> {
        None
    }

    fn ddm(&self, _name: &str) -> Option<Arc<Ddm>> {
        None
    }
}

/// In-memory definitions keyed by upper-cased module name.
#[derive(Clone, Debug, Default)]
pub struct DefinitionSet {
    data_areas: FxHashMap<SmolStr, Arc<DataAreaDefinition>>,
    ddms: FxHashMap<SmolStr, Arc<Ddm>>,
}

fn module_key(name: &str) -> SmolStr {
    SmolStr::new(name.to_ascii_uppercase())
}

impl DefinitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_data_area(&mut self, area: Arc<DataAreaDefinition>) {
        self.data_areas.insert(module_key(&area.name), area);
    }

    pub fn add_ddm(&mut self, ddm: Arc<Ddm>) {
        self.ddms.insert(module_key(&ddm.name), ddm);
    }
}

impl ExternalDefinitions for DefinitionSet {
    fn data_area(&self, name: &str) -> Option<Arc<DataAreaDefinition>> {
        self.data_areas.get(module_key(name).as_str()).cloned()
    }

    fn ddm(&self, name: &str) -> Option<Arc<Ddm>> {
        self.ddms.get(module_key(name).as_str()).cloned()
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Output of [`ScopeResolver::resolve`].
#[derive(Clone, Debug, Default)]
pub struct Resolution {
    pub symbols: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ScopeResolver<'a> {
    file: FileId,
    externals: &'a dyn ExternalDefinitions,
    symbols: SymbolTable,
    diagnostics: Vec<Diagnostic>,
    /// Cleared when a data area or DDM could not be loaded: any name might
    /// have come from it.
    references_conclusive: bool,
    /// Fields of every DDM a view refers to. FIND and READ may name
    /// descriptors that the view does not list.
    ddm_fields: FxHashSet<SmolStr>,
}

fn data_area_label(kind: DataAreaKind) -> &'static str {
    match kind {
        DataAreaKind::Local => "local data area",
        DataAreaKind::Parameter => "parameter data area",
        DataAreaKind::Global => "global data area",
    }
}

impl<'a> ScopeResolver<'a> {
    pub fn new(file: FileId, externals: &'a dyn ExternalDefinitions) -> Self {
        Self {
            file,
            externals,
            symbols: SymbolTable::new(),
            diagnostics: Vec::new(),
            references_conclusive: true,
            ddm_fields: FxHashSet::default(),
        }
    }

    /// Annotates `unit` in place and returns its symbols and findings.
    pub fn resolve(mut self, unit: &mut CompilationUnit) -> Resolution {
        if let Some(define_data) = &mut unit.define_data {
            for block in &mut define_data.blocks {
                self.declare_block(block);
            }
        }
        walk_references_mut(unit, &mut |reference| self.resolve_reference(reference));

        tracing::trace!(
            file = ?self.file,
            symbols = self.symbols.len(),
            diagnostics = self.diagnostics.len(),
            conclusive = self.references_conclusive,
            "resolved compilation unit"
        );
        Resolution {
            symbols: self.symbols,
            diagnostics: self.diagnostics,
        }
    }

    fn error(&self, range: TextRange, code: &'static str, message: String) -> Diagnostic {
        Diagnostic::error(self.file, range, DiagnosticOrigin::Resolver, message).with_code(code)
    }

    fn warning(&self, range: TextRange, code: &'static str, message: String) -> Diagnostic {
        Diagnostic::warning(self.file, range, DiagnosticOrigin::Resolver, message).with_code(code)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn related(&self, id: SymbolId, message: String) -> Option<RelatedInfo> {
        self.symbols.get(id).map(|symbol| RelatedInfo {
            file: self.file,
            range: symbol.range,
            message: Arc::from(message),
        })
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    fn block_scope(&mut self, block: &DataBlock) -> Option<VariableScope> {
        if block.scope_token == SyntaxKind::INDEPENDENT {
            return Some(VariableScope::Independent);
        }
        match VariableScope::from_syntax_kind(block.scope_token) {
            Ok(scope) => Some(scope),
            Err(err) => {
                self.report(self.error(block.range, codes::SCOPE_UNMAPPED, err.to_string()));
                self.references_conclusive = false;
                None
            }
        }
    }

    fn declare_block(&mut self, block: &mut DataBlock) {
        let Some(scope) = self.block_scope(block) else {
            return;
        };
        block.scope = Some(scope);
        annotate_scopes(&mut block.items, scope);

        if let Some(using) = &block.using {
            self.import_data_area(using, scope);
        }
        self.declare_items(&block.items, scope, None, &SymbolOrigin::Unit, None);
    }

    fn import_data_area(&mut self, using: &Identifier, scope: VariableScope) {
        let Some(area) = self.externals.data_area(&using.name) else {
            self.report(self.warning(
                using.range,
                codes::USING_NOT_FOUND,
                format!(
                    "data area '{}' not found; undefined variables are not reported",
                    using.name
                ),
            ));
            self.references_conclusive = false;
            return;
        };

        let expected = match scope {
            VariableScope::Local => Some(DataAreaKind::Local),
            VariableScope::Parameter => Some(DataAreaKind::Parameter),
            VariableScope::Global => Some(DataAreaKind::Global),
            VariableScope::Independent => None,
        };
        if expected != Some(area.kind) {
            self.report(self.error(
                using.range,
                codes::USING_KIND_MISMATCH,
                format!(
                    "{} block cannot use {} '{}'",
                    scope,
                    data_area_label(area.kind),
                    using.name
                ),
            ));
        }

        tracing::trace!(data_area = %area.name, %scope, "importing data area");
        let origin = SymbolOrigin::DataArea(using.normalized());
        for block in &area.define_data.blocks {
            self.declare_items(&block.items, scope, None, &origin, Some(using.range));
        }
    }

    /// `import_range` is the `USING` clause for imported items.
    fn declare_items(
        &mut self,
        items: &[DataItem],
        scope: VariableScope,
        parent: Option<SymbolId>,
        origin: &SymbolOrigin,
        import_range: Option<TextRange>,
    ) {
        for item in items {
            match item {
                DataItem::Variable(var) => {
                    let constant = var
                        .initializer
                        .as_ref()
                        .is_some_and(|init| init.kind == InitializerKind::Const);
                    self.declare(NewSymbol {
                        name: var.name.name.clone(),
                        kind: if constant { SymbolKind::Constant } else { SymbolKind::Variable },
                        scope,
                        level: var.level,
                        parent,
                        type_display: Some(var.data_type.display()),
                        dimensions: var.dimensions.len(),
                        origin: origin.clone(),
                        range: import_range.unwrap_or(var.name.range),
                    });
                }
                DataItem::Group(group) => {
                    let id = self.declare(NewSymbol {
                        name: group.name.name.clone(),
                        kind: SymbolKind::Group,
                        scope,
                        level: group.level,
                        parent,
                        type_display: None,
                        dimensions: group.dimensions.len(),
                        origin: origin.clone(),
                        range: import_range.unwrap_or(group.name.range),
                    });
                    self.declare_items(&group.members, scope, Some(id), origin, import_range);
                }
                // Redefined fields belong to the enclosing group.
                DataItem::Redefine(redefine) => {
                    self.declare_items(&redefine.members, scope, parent, origin, import_range);
                }
                DataItem::View(view) => {
                    let id = self.declare(NewSymbol {
                        name: view.name.name.clone(),
                        kind: SymbolKind::View,
                        scope,
                        level: view.level,
                        parent,
                        type_display: None,
                        dimensions: 0,
                        origin: origin.clone(),
                        range: import_range.unwrap_or(view.name.range),
                    });
                    let own = import_range.is_none();
                    let ddm = self.load_ddm(&view.ddm, own);
                    for field in &view.fields {
                        let unknown = match &ddm {
                            Some(ddm) if own => ddm
                                .find_field(&field.name.name)
                                .is_none()
                                .then(|| ddm.name.clone()),
                            _ => None,
                        };
                        if let Some(ddm_name) = unknown {
                            self.report(self.error(
                                field.name.range,
                                codes::UNKNOWN_VIEW_FIELD,
                                format!(
                                    "field '{}' is not defined in DDM '{}'",
                                    field.name.name, ddm_name
                                ),
                            ));
                        }
                        self.declare(NewSymbol {
                            name: field.name.name.clone(),
                            kind: SymbolKind::ViewField,
                            scope,
                            level: field.level,
                            parent: Some(id),
                            type_display: field.data_type.as_ref().map(|t| t.display()),
                            dimensions: field.dimensions.len(),
                            origin: origin.clone(),
                            range: import_range.unwrap_or(field.name.range),
                        });
                    }
                }
            }
        }
    }

    fn load_ddm(&mut self, name: &Identifier, report_missing: bool) -> Option<Arc<Ddm>> {
        match self.externals.ddm(&name.name) {
            Some(ddm) => {
                self.ddm_fields.extend(ddm.fields.iter().map(|f| f.name.clone()));
                Some(ddm)
            }
            None => {
                if report_missing {
                    self.report(self.warning(
                        name.range,
                        codes::DDM_NOT_FOUND,
                        format!("DDM '{}' not found; view fields are not checked", name.name),
                    ));
                }
                self.references_conclusive = false;
                None
            }
        }
    }

    /// Checks a new declaration against existing ones and inserts it.
    fn declare(&mut self, new: NewSymbol) -> SymbolId {
        let existing: Vec<SymbolId> = self.symbols.named(&new.name).to_vec();
        for id in existing {
            let Some(previous) = self.symbols.get(id).cloned() else {
                continue;
            };
            if previous.parent == new.parent && previous.scope == new.scope {
                let mut diagnostic = self.error(
                    new.range,
                    codes::DUPLICATE_DEFINITION,
                    format!(
                        "duplicate definition: '{}' is already defined in this {} scope",
                        new.name, new.scope
                    ),
                );
                let previous_definition = format!("previous definition of '{}'", previous.name);
                diagnostic.related.extend(self.related(id, previous_definition));
                self.report(diagnostic);
                break;
            }
            let view_fields =
                previous.kind == SymbolKind::ViewField || new.kind == SymbolKind::ViewField;
            if previous.scope != new.scope && !view_fields {
                let mut diagnostic = self.error(
                    new.range,
                    codes::SCOPE_TRANSITION,
                    format!(
                        "'{}' is declared as {} and again as {}",
                        new.name, previous.scope, new.scope
                    ),
                );
                let declared_here = format!("declared as {} here", previous.scope);
                diagnostic.related.extend(self.related(id, declared_here));
                self.report(diagnostic);
                break;
            }
        }

        if new.kind != SymbolKind::ViewField {
            let plus = new.name.starts_with('+');
            let independent = new.scope == VariableScope::Independent;
            if plus && !independent {
                self.report(self.error(
                    new.range,
                    codes::INDEPENDENT_NAMING,
                    format!(
                        "'{}' starts with '+' but is declared in a {} block; \
                         only INDEPENDENT variables start with '+'",
                        new.name, new.scope
                    ),
                ));
            } else if independent && !plus {
                self.report(self.error(
                    new.range,
                    codes::INDEPENDENT_NAMING,
                    format!("INDEPENDENT variable '{}' must start with '+'", new.name),
                ));
            }
        }

        self.symbols.insert(new)
    }

    // ------------------------------------------------------------------------
    // References
    // ------------------------------------------------------------------------

    fn resolve_reference(&mut self, reference: &mut VariableReference) {
        let qualifier = reference.qualifier.as_ref().map(|q| q.name.as_str());
        match self.symbols.lookup(qualifier, &reference.name.name) {
            Lookup::Found(id) => {
                reference.resolved = Some(id);
                self.symbols.record_reference(id, reference.range);
            }
            Lookup::Ambiguous(candidates) => {
                let names: Vec<String> = candidates
                    .iter()
                    .map(|&id| self.symbols.qualified_name(id))
                    .collect();
                let related: Vec<RelatedInfo> = candidates
                    .iter()
                    .zip(&names)
                    .filter_map(|(&id, name)| self.related(id, format!("candidate: {name}")))
                    .collect();
                let mut diagnostic = self.error(
                    reference.range,
                    codes::AMBIGUOUS_REFERENCE,
                    format!(
                        "ambiguous reference: '{}' could be: {}",
                        reference.display_name(),
                        names.join(", ")
                    ),
                );
                diagnostic.related.extend(related);
                self.report(diagnostic);
            }
            Lookup::NotFound => {
                if self.references_conclusive
                    && !self.ddm_fields.contains(reference.name.name.as_str())
                {
                    self.report(self.error(
                        reference.range,
                        codes::UNDEFINED_REFERENCE,
                        format!("undefined variable '{}'", reference.display_name()),
                    ));
                }
            }
        }
    }
}

fn annotate_scopes(items: &mut [DataItem], scope: VariableScope) {
    for item in items {
        match item {
            DataItem::Variable(var) => var.scope = Some(scope),
            DataItem::Group(group) => {
                group.scope = Some(scope);
                annotate_scopes(&mut group.members, scope);
            }
            DataItem::Redefine(redefine) => annotate_scopes(&mut redefine.members, scope),
            DataItem::View(view) => view.scope = Some(scope),
        }
    }
}
