//! Key-path resolution for member completion.
//!
//! Given the index of a `.` token, the resolver scans backward to rebuild
//! the chain of accesses that ends there (`sim.subpopulations[0].`), resolves
//! the root through the type table or the function map, walks the chain
//! forward through property and method signatures, and offers the members of
//! the class it ends on.

use tracing::{debug, trace};

use crate::script::token::{Token, TokenKind};
use crate::types::function_map::{CallTypeTable, FunctionMap};
use crate::types::registry::{ClassId, SignatureRegistry};
use crate::types::type_table::TypeScope;

/// One link of a key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathElement {
    pub name: String,
    /// Followed by a balanced `(...)`
    pub is_call: bool,
    /// Start offset of the identifier token
    pub start: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Just passed a `.`; an identifier must come next, possibly after
    /// call arguments or subscripts
    Identifier { call: bool },
    /// Just passed an identifier; a `.` continues the path
    Dot,
}

#[derive(Debug, Clone, Copy, Default)]
struct Nesting {
    parens: usize,
    brackets: usize,
    /// The outermost open group is a paren group
    outer_is_call: bool,
}

impl Nesting {
    fn is_nested(&self) -> bool {
        self.parens > 0 || self.brackets > 0
    }
}

/// Rebuild the key path ending at the `.` at `dot_index`, root first.
///
/// Returns `None` when the tokens before the dot do not form a path.
///
/// # Panics
/// If `tokens[dot_index]` is not a `.`.
pub fn key_path(tokens: &[Token], dot_index: usize) -> Option<Vec<PathElement>> {
    assert!(
        tokens.get(dot_index).is_some_and(|t| t.kind == TokenKind::Dot),
        "key path must end in a '.' token"
    );

    let mut path = Vec::new();
    let mut expect = Expect::Identifier { call: false };
    let mut nesting = Nesting::default();

    for token in tokens[..dot_index].iter().rev() {
        if !token.is_significant() {
            continue;
        }

        // Balance is settled before anything else is looked at
        if nesting.is_nested() {
            match token.kind {
                TokenKind::RParen => nesting.parens += 1,
                TokenKind::RBracket => nesting.brackets += 1,
                TokenKind::LParen => nesting.parens = nesting.parens.checked_sub(1)?,
                TokenKind::LBracket => nesting.brackets = nesting.brackets.checked_sub(1)?,
                TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semicolon => {
                    trace!("key path broken at offset {}", token.start);
                    return None;
                }
                _ => {}
            }
            if !nesting.is_nested() && nesting.outer_is_call {
                expect = Expect::Identifier { call: true };
            }
            continue;
        }

        match (expect, token.kind) {
            (Expect::Identifier { .. }, TokenKind::RParen) => {
                nesting = Nesting { parens: 1, brackets: 0, outer_is_call: true };
            }
            (Expect::Identifier { call }, TokenKind::RBracket) => {
                nesting = Nesting { parens: 0, brackets: 1, outer_is_call: false };
                expect = Expect::Identifier { call };
            }
            (Expect::Identifier { call }, TokenKind::Identifier) => {
                path.push(PathElement { name: token.text.clone(), is_call: call, start: token.start });
                expect = Expect::Dot;
            }
            (Expect::Identifier { .. }, _) => return None,
            (Expect::Dot, TokenKind::Dot) => expect = Expect::Identifier { call: false },
            (Expect::Dot, _) => break,
        }
    }

    if nesting.is_nested() || expect != Expect::Dot {
        return None;
    }
    path.reverse();
    Some(path)
}

/// Class of the value a key path evaluates to.
pub fn resolve_class(
    path: &[PathElement],
    table: &dyn TypeScope,
    functions: &FunctionMap<'_>,
    call_types: &CallTypeTable,
    registry: &dyn SignatureRegistry,
) -> Option<ClassId> {
    let (root, rest) = path.split_first()?;

    let mut class = if root.is_call {
        let signature = functions.get(&root.name)?;
        signature.returns.class.or_else(|| call_types.get(&root.start).copied())?
    } else {
        table.lookup(&root.name)?.class?
    };

    for element in rest {
        class = if element.is_call {
            registry.method(class, &element.name)?.returns.class?
        } else {
            registry.property(class, &element.name)?.value.class?
        };
    }
    Some(class)
}

/// Member names of a class: properties, then methods with `()` appended,
/// each group sorted. Deprecated members are left out.
pub fn member_candidates(class: ClassId, registry: &dyn SignatureRegistry) -> Vec<String> {
    let mut properties: Vec<String> = registry
        .properties(class)
        .iter()
        .filter(|p| !p.deprecated)
        .map(|p| p.name.clone())
        .collect();
    properties.sort();

    let mut methods: Vec<String> = registry
        .methods(class)
        .iter()
        .filter(|m| !m.deprecated)
        .map(|m| format!("{}()", m.name))
        .collect();
    methods.sort();
    methods.dedup();

    properties.extend(methods);
    properties
}

/// Candidates for completing after the `.` at `dot_index`.
///
/// Any part of the path that cannot be resolved yields no candidates.
///
/// # Panics
/// If `tokens[dot_index]` is not a `.`.
pub fn resolve_key_path(
    tokens: &[Token],
    dot_index: usize,
    table: &dyn TypeScope,
    functions: &FunctionMap<'_>,
    call_types: &CallTypeTable,
    registry: &dyn SignatureRegistry,
) -> Vec<String> {
    let Some(path) = key_path(tokens, dot_index) else {
        debug!("no key path before offset {}", tokens[dot_index].start);
        return Vec::new();
    };
    match resolve_class(&path, table, functions, call_types, registry) {
        Some(class) => member_candidates(class, registry),
        None => {
            debug!("key path {:?} does not resolve", path.iter().map(|e| e.name.as_str()).collect::<Vec<_>>());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::lexer::tokenize;
    use crate::types::mask::TypeDescriptor;
    use crate::types::registry::Registry;
    use crate::types::signatures::{CallEffect, FunctionSignature};
    use crate::types::type_table::TypeTable;

    fn last_dot(tokens: &[Token]) -> usize {
        tokens.iter().rposition(|t| t.kind == TokenKind::Dot).unwrap()
    }

    fn path_names(source: &str) -> Option<Vec<(String, bool)>> {
        let tokens = tokenize(source);
        key_path(&tokens, last_dot(&tokens)).map(|p| p.into_iter().map(|e| (e.name, e.is_call)).collect())
    }

    fn foo_registry() -> Registry {
        Registry::builder()
            .class("Foo", None)
            .class("Baz", None)
            .property("Foo", "bar => (object<Baz>)")
            .property("Foo", "zap => (integer$)")
            .method("Foo", "- (object<Baz>$)makeBaz(void)")
            .property("Baz", "qux => (float)")
            .property("Baz", "old => (float)")
            .method("Baz", "- (void)poke(void)")
            .deprecated("Baz", "old")
            .function("(object<Foo>$)newFoo(void)")
            .function("(object)pick(object x)")
            .try_build()
            .unwrap()
    }

    #[test]
    fn test_simple_paths() {
        assert_eq!(path_names("sim."), Some(vec![("sim".to_string(), false)]));
        assert_eq!(
            path_names("x = sim.subpopulations[0].individuals."),
            Some(vec![
                ("sim".to_string(), false),
                ("subpopulations".to_string(), false),
                ("individuals".to_string(), false),
            ])
        );
    }

    #[test]
    fn test_call_marks_identifier() {
        assert_eq!(
            path_names("sim.mutationsOfType(m1)[0:3]."),
            Some(vec![("sim".to_string(), false), ("mutationsOfType".to_string(), true)])
        );
        assert_eq!(path_names("newFoo(f(1), (2))."), Some(vec![("newFoo".to_string(), true)]));
    }

    #[test]
    fn test_path_starts_after_operator_or_argument() {
        assert_eq!(path_names("print(a + foo."), Some(vec![("foo".to_string(), false)]));
        assert_eq!(path_names("if (x) foo."), Some(vec![("foo".to_string(), false)]));
    }

    #[test]
    fn test_broken_paths() {
        assert_eq!(path_names("."), None);
        assert_eq!(path_names("5 ."), None);
        assert_eq!(path_names("x = (a + b)."), None);
        assert_eq!(path_names("foo.]."), None);
        assert_eq!(path_names("x = foo[a; b]."), None);
        assert_eq!(path_names("foo..bar."), None);
    }

    #[test]
    #[should_panic]
    fn test_requires_a_dot() {
        let tokens = tokenize("foo");
        key_path(&tokens, 0);
    }

    #[test]
    fn test_subset_preserves_class() {
        let registry = foo_registry();
        let mut table = TypeTable::new();
        table.set("foo", TypeDescriptor::object(registry.class_id("Foo").unwrap()));
        let functions = FunctionMap::new(&registry);
        let tokens = tokenize("foo.bar[2:5].");
        let candidates =
            resolve_key_path(&tokens, last_dot(&tokens), &table, &functions, &CallTypeTable::new(), &registry);
        assert_eq!(candidates, vec!["qux".to_string(), "poke()".to_string()]);
        assert!(!candidates.contains(&"zap".to_string()));
    }

    #[test]
    fn test_root_call_and_method_chain() {
        let registry = foo_registry();
        let functions = FunctionMap::new(&registry);
        let table = TypeTable::new();
        let tokens = tokenize("newFoo().makeBaz().");
        let candidates =
            resolve_key_path(&tokens, last_dot(&tokens), &table, &functions, &CallTypeTable::new(), &registry);
        assert_eq!(candidates, vec!["qux".to_string(), "poke()".to_string()]);
    }

    #[test]
    fn test_root_call_falls_back_to_call_types() {
        let registry = foo_registry();
        let functions = FunctionMap::new(&registry);
        let table = TypeTable::new();
        let tokens = tokenize("pick(foo).");
        let dot = last_dot(&tokens);

        let unresolved = resolve_key_path(&tokens, dot, &table, &functions, &CallTypeTable::new(), &registry);
        assert!(unresolved.is_empty());

        let mut call_types = CallTypeTable::new();
        call_types.insert(0, registry.class_id("Baz").unwrap());
        let resolved = resolve_key_path(&tokens, dot, &table, &functions, &call_types, &registry);
        assert_eq!(resolved, vec!["qux".to_string(), "poke()".to_string()]);
    }

    #[test]
    fn test_unknown_members_yield_nothing() {
        let registry = foo_registry();
        let mut table = TypeTable::new();
        table.set("foo", TypeDescriptor::object(registry.class_id("Foo").unwrap()));
        table.set("n", TypeDescriptor::int());
        let functions = FunctionMap::new(&registry);
        for source in ["foo.nope.", "foo.bar().", "n.", "ghost.", "foo.zap."] {
            let tokens = tokenize(source);
            let candidates =
                resolve_key_path(&tokens, last_dot(&tokens), &table, &functions, &CallTypeTable::new(), &registry);
            assert!(candidates.is_empty(), "{source}");
        }
    }

    #[test]
    fn test_user_function_root() {
        let registry = foo_registry();
        let mut functions = FunctionMap::new(&registry);
        functions.add_user_function(FunctionSignature {
            name: "mine".to_string(),
            params: Vec::new(),
            returns: TypeDescriptor::object(registry.class_id("Foo").unwrap()),
            effect: CallEffect::None,
        });
        let tokens = tokenize("mine().");
        let candidates = resolve_key_path(
            &tokens,
            last_dot(&tokens),
            &TypeTable::new(),
            &functions,
            &CallTypeTable::new(),
            &registry,
        );
        assert_eq!(candidates, vec!["bar".to_string(), "zap".to_string(), "makeBaz()".to_string()]);
    }
}
