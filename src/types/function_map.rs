//! Functions visible to a request, and the call-site class table.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use super::registry::{ClassId, SignatureRegistry};
use super::signatures::FunctionSignature;

/// Classes of call results keyed by the start offset of the callee's name token.
pub type CallTypeTable = BTreeMap<usize, ClassId>;

/// Built-in functions borrowed from the registry, layered with functions
/// declared in the script. User declarations shadow built-ins.
pub struct FunctionMap<'r> {
    builtins: Option<&'r dyn SignatureRegistry>,
    user: FxHashMap<String, FunctionSignature>,
}

impl<'r> FunctionMap<'r> {
    pub fn new(registry: &'r dyn SignatureRegistry) -> Self {
        Self { builtins: Some(registry), user: FxHashMap::default() }
    }

    /// A map with no functions at all.
    pub fn empty() -> Self {
        Self { builtins: None, user: FxHashMap::default() }
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSignature> {
        self.user
            .get(name)
            .or_else(|| self.builtins.and_then(|registry| registry.function(name)))
    }

    pub fn add_user_function(&mut self, signature: FunctionSignature) {
        self.user.insert(signature.name.clone(), signature);
    }

    pub fn user_function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.user.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All visible function names, sorted and unique.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self.user_function_names();
        if let Some(registry) = self.builtins {
            names.extend(registry.function_names());
        }
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.builtins.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::mask::TypeDescriptor;
    use crate::types::registry::Registry;
    use crate::types::signatures::CallEffect;

    #[test]
    fn test_user_function_shadows_builtin() {
        let registry = Registry::builder().function("(integer)size(* x)").try_build().unwrap();
        let mut functions = FunctionMap::new(&registry);
        assert_eq!(functions.get("size").unwrap().returns, TypeDescriptor::int());

        functions.add_user_function(FunctionSignature {
            name: "size".to_string(),
            params: Vec::new(),
            returns: TypeDescriptor::float(),
            effect: CallEffect::None,
        });
        assert_eq!(functions.get("size").unwrap().returns, TypeDescriptor::float());
        assert_eq!(functions.names(), vec!["size"]);
    }

    #[test]
    fn test_empty_map() {
        let functions = FunctionMap::empty();
        assert!(functions.is_empty());
        assert!(functions.get("c").is_none());
        assert!(functions.names().is_empty());
    }
}
