//! Symbol table for the variables visible in one compilation unit.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::scope::VariableScope;
use crate::base::TextRange;

/// Index of a symbol in its [`SymbolTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Constant,
    Group,
    View,
    ViewField,
}

impl SymbolKind {
    pub fn display(self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Group => "group",
            SymbolKind::View => "view",
            SymbolKind::ViewField => "view field",
        }
    }
}

/// Where a symbol was declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolOrigin {
    /// In this unit's own `DEFINE DATA`.
    Unit,
    /// Imported with `USING` from the named data area.
    DataArea(SmolStr),
}

#[derive(Clone, Debug)]
pub struct VariableSymbol {
    pub id: SymbolId,
    /// Name as written.
    pub name: SmolStr,
    pub kind: SymbolKind,
    pub scope: VariableScope,
    pub level: u8,
    pub parent: Option<SymbolId>,
    /// Format and length, e.g. `A10` or `N7,2`.
    pub type_display: Option<String>,
    pub dimensions: usize,
    pub origin: SymbolOrigin,
    /// The declaration, or the `USING` clause for imported symbols.
    pub range: TextRange,
    pub references: Vec<TextRange>,
}

impl VariableSymbol {
    pub fn is_referenced(&self) -> bool {
        !self.references.is_empty()
    }

    pub fn is_imported(&self) -> bool {
        matches!(self.origin, SymbolOrigin::DataArea(_))
    }
}

/// Fields for a new symbol; the table assigns the id.
#[derive(Clone, Debug)]
pub struct NewSymbol {
    pub name: SmolStr,
    pub kind: SymbolKind,
    pub scope: VariableScope,
    pub level: u8,
    pub parent: Option<SymbolId>,
    pub type_display: Option<String>,
    pub dimensions: usize,
    pub origin: SymbolOrigin,
    pub range: TextRange,
}

/// Result of looking a name up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    Found(SymbolId),
    Ambiguous(Vec<SymbolId>),
    NotFound,
}

#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<VariableSymbol>,
    /// Upper-cased name to every symbol with that name.
    by_name: FxHashMap<SmolStr, Vec<SymbolId>>,
}

fn normalize(name: &str) -> SmolStr {
    SmolStr::new(name.to_ascii_uppercase())
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: NewSymbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.by_name.entry(normalize(&symbol.name)).or_default().push(id);
        self.symbols.push(VariableSymbol {
            id,
            name: symbol.name,
            kind: symbol.kind,
            scope: symbol.scope,
            level: symbol.level,
            parent: symbol.parent,
            type_display: symbol.type_display,
            dimensions: symbol.dimensions,
            origin: symbol.origin,
            range: symbol.range,
            references: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&VariableSymbol> {
        self.symbols.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableSymbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Every symbol with this name, in declaration order. Case-insensitive.
    pub fn named(&self, name: &str) -> &[SymbolId] {
        self.by_name
            .get(normalize(name).as_str())
            .map_or(&[], Vec::as_slice)
    }

    pub fn children(&self, parent: SymbolId) -> impl Iterator<Item = &VariableSymbol> {
        self.symbols.iter().filter(move |s| s.parent == Some(parent))
    }

    /// Whether `ancestor` encloses `id`.
    pub fn is_within(&self, id: SymbolId, ancestor: SymbolId) -> bool {
        let mut current = self.get(id).and_then(|s| s.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.get(parent).and_then(|s| s.parent);
        }
        false
    }

    /// Resolves `name`, optionally qualified by an enclosing group or view.
    ///
    /// A group or view name never resolves as a plain operand when a
    /// variable with the same name exists.
    pub fn lookup(&self, qualifier: Option<&str>, name: &str) -> Lookup {
        let candidates = self.named(name);
        let matching: Vec<SymbolId> = match qualifier {
            Some(qualifier) => {
                let containers = self.named(qualifier);
                candidates
                    .iter()
                    .copied()
                    .filter(|&id| containers.iter().any(|&c| self.is_within(id, c)))
                    .collect()
            }
            None => candidates.to_vec(),
        };

        match matching.as_slice() {
            [] => Lookup::NotFound,
            [single] => Lookup::Found(*single),
            many => {
                let fields: Vec<SymbolId> = many
                    .iter()
                    .copied()
                    .filter(|&id| {
                        self.get(id).is_some_and(|s| {
                            !matches!(s.kind, SymbolKind::Group | SymbolKind::View)
                        })
                    })
                    .collect();
                match fields.as_slice() {
                    [single] => Lookup::Found(*single),
                    _ => Lookup::Ambiguous(many.to_vec()),
                }
            }
        }
    }

    pub fn record_reference(&mut self, id: SymbolId, range: TextRange) {
        if let Some(symbol) = self.symbols.get_mut(id.index()) {
            symbol.references.push(range);
        }
    }

    /// Qualified display name, e.g. `#GROUP.#FIELD`.
    pub fn qualified_name(&self, id: SymbolId) -> String {
        let mut parts = Vec::new();
        let mut current = self.get(id);
        while let Some(symbol) = current {
            parts.push(symbol.name.as_str());
            current = symbol.parent.and_then(|p| self.get(p));
        }
        parts.reverse();
        parts.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(name: &str, kind: SymbolKind, parent: Option<SymbolId>) -> NewSymbol {
        NewSymbol {
            name: SmolStr::new(name),
            kind,
            scope: VariableScope::Local,
            level: if parent.is_some() { 2 } else { 1 },
            parent,
            type_display: None,
            dimensions: 0,
            origin: SymbolOrigin::Unit,
            range: TextRange::default(),
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut table = SymbolTable::new();
        let id = table.insert(symbol("#Total", SymbolKind::Variable, None));
        assert_eq!(table.lookup(None, "#TOTAL"), Lookup::Found(id));
        assert_eq!(table.lookup(None, "#MISSING"), Lookup::NotFound);
    }

    #[test]
    fn test_qualifier_disambiguates() {
        let mut table = SymbolTable::new();
        let a = table.insert(symbol("#A", SymbolKind::Group, None));
        let a_x = table.insert(symbol("#X", SymbolKind::Variable, Some(a)));
        let b = table.insert(symbol("#B", SymbolKind::Group, None));
        let b_x = table.insert(symbol("#X", SymbolKind::Variable, Some(b)));

        assert_eq!(table.lookup(None, "#X"), Lookup::Ambiguous(vec![a_x, b_x]));
        assert_eq!(table.lookup(Some("#B"), "#X"), Lookup::Found(b_x));
        assert_eq!(table.lookup(Some("#C"), "#X"), Lookup::NotFound);
        assert_eq!(table.qualified_name(b_x), "#B.#X");
    }

    #[test]
    fn test_field_preferred_over_view_of_same_name() {
        let mut table = SymbolTable::new();
        let view = table.insert(symbol("EMPLOYEES", SymbolKind::View, None));
        let field = table.insert(symbol("EMPLOYEES", SymbolKind::ViewField, Some(view)));
        assert_eq!(table.lookup(None, "EMPLOYEES"), Lookup::Found(field));
    }

    #[test]
    fn test_references_are_counted() {
        let mut table = SymbolTable::new();
        let id = table.insert(symbol("#A", SymbolKind::Variable, None));
        assert!(!table.get(id).is_some_and(VariableSymbol::is_referenced));
        table.record_reference(id, TextRange::default());
        assert_eq!(table.get(id).map(|s| s.references.len()), Some(1));
    }
}
