//! Two-scope symbol table.
//!
//! Class scope holds `static` and `field` declarations and lives for the
//! whole class; subroutine scope holds `argument` and `local` declarations
//! and is cleared at every subroutine entry. Lookup searches the
//! subroutine scope first, so a subroutine-level name shadows a class-level
//! name of the same spelling. Within a scope, indices per kind are dense:
//! the k-th symbol of a kind gets index k-1.

use crate::writer::Segment;

/// Storage class of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Static,
    Field,
    Argument,
    Local,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Static => "static",
            SymbolKind::Field => "field",
            SymbolKind::Argument => "argument",
            SymbolKind::Local => "local",
        }
    }

    /// The VM segment a symbol of this kind lives in at use sites.
    pub fn segment(self) -> Segment {
        match self {
            SymbolKind::Static => Segment::Static,
            SymbolKind::Field => Segment::This,
            SymbolKind::Argument => Segment::Argument,
            SymbolKind::Local => Segment::Local,
        }
    }

    fn is_class_scope(self) -> bool {
        matches!(self, SymbolKind::Static | SymbolKind::Field)
    }

    fn scope_name(self) -> &'static str {
        if self.is_class_scope() { "class" } else { "subroutine" }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: String,
    pub kind: SymbolKind,
    pub index: usize,
}

#[derive(Default)]
pub struct SymbolTable {
    class_scope: Vec<Symbol>,
    subroutine_scope: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Clear the subroutine scope for a new subroutine.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
    }

    /// Define a new symbol in the scope implied by its kind, assigning the
    /// next dense index for that kind.
    pub fn define(&mut self, name: &str, ty: &str, kind: SymbolKind) -> Result<(), String> {
        let index = self.count(kind);
        let scope = if kind.is_class_scope() {
            &mut self.class_scope
        } else {
            &mut self.subroutine_scope
        };
        if scope.iter().any(|s| s.name == name) {
            return Err(format!(
                "'{}' is already defined in the {} scope",
                name,
                kind.scope_name()
            ));
        }
        scope.push(Symbol {
            name: name.to_string(),
            ty: ty.to_string(),
            kind,
            index,
        });
        Ok(())
    }

    /// Number of symbols of `kind` in the scope that kind belongs to.
    pub fn count(&self, kind: SymbolKind) -> usize {
        let scope = if kind.is_class_scope() {
            &self.class_scope
        } else {
            &self.subroutine_scope
        };
        scope.iter().filter(|s| s.kind == kind).count()
    }

    /// Resolve a name, subroutine scope first.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope
            .iter()
            .find(|s| s.name == name)
            .or_else(|| self.class_scope.iter().find(|s| s.name == name))
    }
}
