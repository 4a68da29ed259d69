//! Symbol type tables: a root `TypeTable` and the `ScopedTypeTable` overlay
//! whose global definitions write through to its parent.

use rustc_hash::FxHashMap;

use super::mask::{TypeDescriptor, TypeMask};

/// A scope that maps symbol names to inferred types.
pub trait TypeScope {
    /// Looks up a symbol, traversing up the scope chain if necessary.
    fn lookup(&self, name: &str) -> Option<TypeDescriptor>;

    /// Sets a symbol in this scope. A descriptor with an empty mask is ignored.
    fn set(&mut self, name: &str, ty: TypeDescriptor);

    /// Removes a symbol from view in this scope.
    fn remove(&mut self, name: &str);

    /// Defines a globally visible symbol, such as one made by `defineConstant()`.
    fn define_global(&mut self, name: &str, ty: TypeDescriptor);

    /// Names of all visible symbols, sorted.
    fn symbol_names(&self) -> Vec<String>;

    fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

/// The root type table of a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeTable {
    symbols: FxHashMap<String, TypeDescriptor>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding the Eidos built-in constants.
    pub fn with_constants() -> Self {
        let mut table = Self::new();
        table.set("T", TypeDescriptor::logical());
        table.set("F", TypeDescriptor::logical());
        table.set("NULL", TypeDescriptor::new(TypeMask::NULL));
        for name in ["PI", "E", "INF", "NAN"] {
            table.set(name, TypeDescriptor::float());
        }
        table
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDescriptor)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl TypeScope for TypeTable {
    fn lookup(&self, name: &str) -> Option<TypeDescriptor> {
        self.symbols.get(name).copied()
    }

    fn set(&mut self, name: &str, ty: TypeDescriptor) {
        if ty.is_none() {
            return;
        }
        self.symbols.insert(name.to_string(), ty);
    }

    fn remove(&mut self, name: &str) {
        self.symbols.remove(name);
    }

    fn define_global(&mut self, name: &str, ty: TypeDescriptor) {
        self.set(name, ty);
    }

    fn symbol_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.symbols.keys().cloned().collect();
        names.sort();
        names
    }
}

/// A child scope over a mutably borrowed parent.
///
/// Sets and removals stay local; a removal hides the parent's entry. When
/// `write_through` is set, global definitions are also forwarded to the
/// parent, so they outlive this scope.
pub struct ScopedTypeTable<'p> {
    local: FxHashMap<String, Option<TypeDescriptor>>,
    parent: &'p mut dyn TypeScope,
    write_through: bool,
}

impl<'p> ScopedTypeTable<'p> {
    pub fn new(parent: &'p mut dyn TypeScope, write_through: bool) -> Self {
        Self {
            local: FxHashMap::default(),
            parent,
            write_through,
        }
    }

    /// Names bound in this scope only.
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .local
            .iter()
            .filter(|(_, ty)| ty.is_some())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

impl TypeScope for ScopedTypeTable<'_> {
    fn lookup(&self, name: &str) -> Option<TypeDescriptor> {
        match self.local.get(name) {
            Some(entry) => *entry,
            None => self.parent.lookup(name),
        }
    }

    fn set(&mut self, name: &str, ty: TypeDescriptor) {
        if ty.is_none() {
            return;
        }
        self.local.insert(name.to_string(), Some(ty));
    }

    fn remove(&mut self, name: &str) {
        self.local.insert(name.to_string(), None);
    }

    fn define_global(&mut self, name: &str, ty: TypeDescriptor) {
        if ty.is_none() {
            return;
        }
        self.set(name, ty);
        if self.write_through {
            self.parent.define_global(name, ty);
        }
    }

    fn symbol_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .parent
            .symbol_names()
            .into_iter()
            .filter(|name| !matches!(self.local.get(name), Some(None)))
            .collect();
        names.extend(self.local_names());
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::registry::ClassId;

    #[test]
    fn test_constants() {
        let table = TypeTable::with_constants();
        assert_eq!(table.lookup("T"), Some(TypeDescriptor::logical()));
        assert_eq!(table.lookup("PI"), Some(TypeDescriptor::float()));
        assert_eq!(table.lookup("x"), None);
    }

    #[test]
    fn test_empty_mask_is_ignored() {
        let mut table = TypeTable::new();
        table.set("x", TypeDescriptor::int());
        table.set("x", TypeDescriptor::NONE);
        assert_eq!(table.lookup("x"), Some(TypeDescriptor::int()));
    }

    #[test]
    fn test_scoped_lookup_falls_back_to_parent() {
        let mut root = TypeTable::with_constants();
        root.set("sim", TypeDescriptor::object(ClassId(1)));
        let mut scope = ScopedTypeTable::new(&mut root, false);
        scope.set("x", TypeDescriptor::int());
        assert_eq!(scope.lookup("sim"), Some(TypeDescriptor::object(ClassId(1))));
        assert_eq!(scope.lookup("x"), Some(TypeDescriptor::int()));
        drop(scope);
        assert_eq!(root.lookup("x"), None);
    }

    #[test]
    fn test_removal_shadows_parent() {
        let mut root = TypeTable::new();
        root.set("sim", TypeDescriptor::object(ClassId(1)));
        {
            let mut scope = ScopedTypeTable::new(&mut root, true);
            scope.remove("sim");
            assert_eq!(scope.lookup("sim"), None);
            assert!(!scope.symbol_names().contains(&"sim".to_string()));
        }
        assert!(root.contains("sim"));
    }

    #[test]
    fn test_write_through_reaches_root() {
        let mut root = TypeTable::new();
        {
            let mut outer = ScopedTypeTable::new(&mut root, true);
            let mut inner = ScopedTypeTable::new(&mut outer, true);
            inner.define_global("K", TypeDescriptor::int());
            inner.set("local", TypeDescriptor::float());
        }
        assert_eq!(root.lookup("K"), Some(TypeDescriptor::int()));
        assert_eq!(root.lookup("local"), None);
    }

    #[test]
    fn test_global_definition_without_write_through_stays_local() {
        let mut root = TypeTable::new();
        {
            let mut scope = ScopedTypeTable::new(&mut root, false);
            scope.define_global("K", TypeDescriptor::int());
            assert!(scope.contains("K"));
        }
        assert!(!root.contains("K"));
    }
}
