//! Signature registry: the classes, properties, methods and functions the
//! engine knows about.
//!
//! Members are declared with Eidos prototype strings and parsed once when the
//! registry is built. Class members are flattened along the superclass chain
//! so lookups never walk inheritance.
//!
//! Declaration syntax:
//! - property: `subpopulations => (object<Subpopulation>)` (read-only) or
//!   `tag <-> (integer$)` (read-write)
//! - method: `- (void)setValue(is$ key, * value)`; a leading `+` marks a class method
//! - function: `(float)runif(i$ n, [numeric min = 0], [numeric max = 1])`

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::mask::TypeDescriptor;
use super::signatures::{
    CallEffect, FunctionSignature, MethodSignature, ParamSignature, PropertySignature,
};
use crate::errors::PrototypeError;
use crate::script::ast::{ParamDecl, Prototype, TypeSpec};
use crate::script::parser::{parse_prototype, parse_type_spec};

/// Copyable handle to a class in a registry. Never owns the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u16);

/// Read-only access to built-in signatures.
pub trait SignatureRegistry {
    fn class_id(&self, name: &str) -> Option<ClassId>;

    fn class_name(&self, class: ClassId) -> Option<&str>;

    fn function(&self, name: &str) -> Option<&FunctionSignature>;

    /// All function names, sorted.
    fn function_names(&self) -> Vec<&str>;

    /// Properties of a class, including inherited ones.
    fn properties(&self, class: ClassId) -> &[PropertySignature];

    /// Methods of a class, including inherited ones.
    fn methods(&self, class: ClassId) -> &[MethodSignature];

    fn property(&self, class: ClassId, name: &str) -> Option<&PropertySignature> {
        self.properties(class).iter().find(|p| p.name == name)
    }

    fn method(&self, class: ClassId, name: &str) -> Option<&MethodSignature> {
        self.methods(class).iter().find(|m| m.name == name)
    }
}

/// Resolve a parsed type specifier against a registry. Unknown classes
/// leave the descriptor without a class.
pub fn descriptor_for(spec: &TypeSpec, registry: &dyn SignatureRegistry) -> TypeDescriptor {
    let class = spec.class_name.as_deref().and_then(|name| registry.class_id(name));
    TypeDescriptor::with_class(spec.mask, class)
}

/// Convert a parsed prototype, such as a user `function` declaration, into a signature.
pub fn signature_from_prototype(proto: &Prototype, registry: &dyn SignatureRegistry) -> FunctionSignature {
    let params = proto
        .params
        .iter()
        .map(|p| ParamSignature {
            name: p.name.clone(),
            ty: descriptor_for(&p.ty, registry),
            singleton: p.ty.singleton,
            optional: p.optional,
            default: p.default.clone(),
        })
        .collect();
    FunctionSignature {
        name: proto.name.clone(),
        params,
        returns: descriptor_for(&proto.returns, registry),
        effect: CallEffect::None,
    }
}

fn param_signature(
    decl: &ParamDecl,
    resolve: impl Fn(&TypeSpec) -> Result<TypeDescriptor, PrototypeError>,
) -> Result<ParamSignature, PrototypeError> {
    Ok(ParamSignature {
        name: decl.name.clone(),
        ty: resolve(&decl.ty)?,
        singleton: decl.ty.singleton,
        optional: decl.optional,
        default: decl.default.clone(),
    })
}

#[derive(Debug, Clone)]
struct ClassInfo {
    name: String,
    superclass: Option<ClassId>,
    properties: Vec<PropertySignature>,
    methods: Vec<MethodSignature>,
}

/// In-memory signature registry.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    classes: Vec<ClassInfo>,
    class_ids: FxHashMap<String, ClassId>,
    functions: FxHashMap<String, FunctionSignature>,
    function_names: Vec<String>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn superclass(&self, class: ClassId) -> Option<ClassId> {
        self.classes.get(class.0 as usize).and_then(|c| c.superclass)
    }

    fn class(&self, class: ClassId) -> Option<&ClassInfo> {
        self.classes.get(class.0 as usize)
    }
}

impl SignatureRegistry for Registry {
    fn class_id(&self, name: &str) -> Option<ClassId> {
        self.class_ids.get(name).copied()
    }

    fn class_name(&self, class: ClassId) -> Option<&str> {
        self.class(class).map(|c| c.name.as_str())
    }

    fn function(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    fn function_names(&self) -> Vec<&str> {
        self.function_names.iter().map(String::as_str).collect()
    }

    fn properties(&self, class: ClassId) -> &[PropertySignature] {
        self.class(class).map(|c| c.properties.as_slice()).unwrap_or(&[])
    }

    fn methods(&self, class: ClassId) -> &[MethodSignature] {
        self.class(class).map(|c| c.methods.as_slice()).unwrap_or(&[])
    }
}

/// Collects declarations and parses them into a [`Registry`].
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    classes: Vec<(String, Option<String>)>,
    properties: Vec<(String, String)>,
    methods: Vec<(String, String)>,
    functions: Vec<String>,
    function_effects: Vec<(String, CallEffect)>,
    method_effects: Vec<(String, String, CallEffect)>,
    deprecated: Vec<(String, String)>,
}

impl RegistryBuilder {
    /// Declare a class. A superclass must be declared before its subclasses.
    pub fn class(mut self, name: &str, superclass: Option<&str>) -> Self {
        self.classes.push((name.to_string(), superclass.map(str::to_string)));
        self
    }

    pub fn property(mut self, class: &str, decl: &str) -> Self {
        self.properties.push((class.to_string(), decl.to_string()));
        self
    }

    pub fn method(mut self, class: &str, decl: &str) -> Self {
        self.methods.push((class.to_string(), decl.to_string()));
        self
    }

    pub fn function(mut self, prototype: &str) -> Self {
        self.functions.push(prototype.to_string());
        self
    }

    pub fn function_effect(mut self, name: &str, effect: CallEffect) -> Self {
        self.function_effects.push((name.to_string(), effect));
        self
    }

    pub fn method_effect(mut self, class: &str, name: &str, effect: CallEffect) -> Self {
        self.method_effects.push((class.to_string(), name.to_string(), effect));
        self
    }

    /// Mark a property or method as deprecated; it is hidden from completion.
    pub fn deprecated(mut self, class: &str, member: &str) -> Self {
        self.deprecated.push((class.to_string(), member.to_string()));
        self
    }

    /// Build, failing on the first malformed declaration.
    pub fn try_build(self) -> Result<Registry, PrototypeError> {
        self.build_inner(true)
    }

    /// Build, skipping malformed declarations with a warning.
    pub fn build(self) -> Registry {
        // Lenient mode never returns an error
        self.build_inner(false).unwrap_or_default()
    }

    fn build_inner(self, strict: bool) -> Result<Registry, PrototypeError> {
        let mut registry = Registry::default();
        let report = |err: PrototypeError, what: &str| -> Result<(), PrototypeError> {
            if strict {
                Err(err)
            } else {
                warn!("skipping malformed built-in {}: {}", what, err);
                Ok(())
            }
        };

        for (index, (name, superclass)) in self.classes.iter().enumerate() {
            let id = ClassId(index as u16);
            let superclass = match superclass {
                Some(parent) => match registry.class_ids.get(parent) {
                    Some(&parent_id) => Some(parent_id),
                    None => {
                        report(PrototypeError::new(0, format!("unknown superclass {parent}")), name)?;
                        None
                    }
                },
                None => None,
            };
            registry.class_ids.insert(name.clone(), id);
            registry.classes.push(ClassInfo {
                name: name.clone(),
                superclass,
                properties: Vec::new(),
                methods: Vec::new(),
            });
        }

        let class_ids = registry.class_ids.clone();
        let resolve = |spec: &TypeSpec| -> Result<TypeDescriptor, PrototypeError> {
            match &spec.class_name {
                Some(name) => match class_ids.get(name) {
                    Some(&id) => Ok(TypeDescriptor::with_class(spec.mask, Some(id))),
                    None => Err(PrototypeError::new(0, format!("unknown class {name}"))),
                },
                None => Ok(TypeDescriptor::new(spec.mask)),
            }
        };
        let is_deprecated = |class: &str, member: &str| {
            self.deprecated.iter().any(|(c, m)| c == class && m == member)
        };

        for (class, decl) in &self.properties {
            let Some(&id) = class_ids.get(class) else {
                report(PrototypeError::new(0, format!("unknown class {class}")), decl)?;
                continue;
            };
            match parse_property(decl, &resolve) {
                Ok(mut property) => {
                    property.deprecated = is_deprecated(class, &property.name);
                    registry.classes[id.0 as usize].properties.push(property);
                }
                Err(err) => report(err, decl)?,
            }
        }

        for (class, decl) in &self.methods {
            let Some(&id) = class_ids.get(class) else {
                report(PrototypeError::new(0, format!("unknown class {class}")), decl)?;
                continue;
            };
            match parse_method(decl, &resolve) {
                Ok(mut method) => {
                    method.deprecated = is_deprecated(class, &method.name);
                    method.effect = self
                        .method_effects
                        .iter()
                        .find(|(c, m, _)| c == class && *m == method.name)
                        .map(|(_, _, e)| *e)
                        .unwrap_or_default();
                    registry.classes[id.0 as usize].methods.push(method);
                }
                Err(err) => report(err, decl)?,
            }
        }

        for prototype in &self.functions {
            let parsed = parse_prototype(prototype).and_then(|proto| {
                let params = proto
                    .params
                    .iter()
                    .map(|p| param_signature(p, &resolve))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FunctionSignature {
                    returns: resolve(&proto.returns)?,
                    name: proto.name,
                    params,
                    effect: CallEffect::None,
                })
            });
            match parsed {
                Ok(mut function) => {
                    function.effect = self
                        .function_effects
                        .iter()
                        .find(|(name, _)| *name == function.name)
                        .map(|(_, e)| *e)
                        .unwrap_or_default();
                    registry.function_names.push(function.name.clone());
                    registry.functions.insert(function.name.clone(), function);
                }
                Err(err) => report(err, prototype)?,
            }
        }
        registry.function_names.sort();
        registry.function_names.dedup();

        // Superclasses come first, so a single pass flattens inheritance
        for index in 0..registry.classes.len() {
            let Some(parent) = registry.classes[index].superclass else {
                continue;
            };
            let parent = registry.classes[parent.0 as usize].clone();
            let class = &mut registry.classes[index];
            for property in parent.properties {
                if !class.properties.iter().any(|p| p.name == property.name) {
                    class.properties.push(property);
                }
            }
            for method in parent.methods {
                if !class.methods.iter().any(|m| m.name == method.name) {
                    class.methods.push(method);
                }
            }
        }

        debug!(
            "signature registry built: {} classes, {} functions",
            registry.classes.len(),
            registry.functions.len()
        );
        Ok(registry)
    }
}

fn parse_property(
    decl: &str,
    resolve: &impl Fn(&TypeSpec) -> Result<TypeDescriptor, PrototypeError>,
) -> Result<PropertySignature, PrototypeError> {
    let (name, ty, read_only) = if let Some((name, ty)) = decl.split_once("<->") {
        (name, ty, false)
    } else if let Some((name, ty)) = decl.split_once("=>") {
        (name, ty, true)
    } else {
        return Err(PrototypeError::new(0, "expected '=>' or '<->' in property declaration"));
    };
    let spec = parse_type_spec(ty.trim())?;
    Ok(PropertySignature {
        name: name.trim().to_string(),
        value: resolve(&spec)?,
        read_only,
        deprecated: false,
    })
}

fn parse_method(
    decl: &str,
    resolve: &impl Fn(&TypeSpec) -> Result<TypeDescriptor, PrototypeError>,
) -> Result<MethodSignature, PrototypeError> {
    let decl = decl.trim_start();
    let (is_class_method, rest) = match decl.chars().next() {
        Some('+') => (true, &decl[1..]),
        Some('-') => (false, &decl[1..]),
        _ => return Err(PrototypeError::new(0, "method declaration must start with '-' or '+'")),
    };
    let proto = parse_prototype(rest.trim_start())?;
    let params = proto
        .params
        .iter()
        .map(|p| param_signature(p, resolve))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MethodSignature {
        returns: resolve(&proto.returns)?,
        name: proto.name,
        params,
        effect: CallEffect::None,
        is_class_method,
        deprecated: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::mask::TypeMask;

    fn sample() -> Registry {
        Registry::builder()
            .class("Dictionary", None)
            .class("Baz", Some("Dictionary"))
            .class("Foo", Some("Dictionary"))
            .method("Dictionary", "- (void)setValue(is$ key, * value)")
            .property("Baz", "qux <-> (integer$)")
            .property("Baz", "old => (float)")
            .property("Foo", "bar => (object<Baz>)")
            .method("Foo", "+ (object<Foo>$)spawn(void)")
            .function("(integer)seqLen(integer$ length)")
            .function_effect("seqLen", CallEffect::ReturnsArgument(0))
            .deprecated("Baz", "old")
            .try_build()
            .unwrap()
    }

    #[test]
    fn test_class_lookup() {
        let registry = sample();
        let baz = registry.class_id("Baz").unwrap();
        assert_eq!(registry.class_name(baz), Some("Baz"));
        assert_eq!(registry.class_id("Nope"), None);
        assert_eq!(registry.superclass(baz), registry.class_id("Dictionary"));
    }

    #[test]
    fn test_properties_and_flags() {
        let registry = sample();
        let baz = registry.class_id("Baz").unwrap();
        let qux = registry.property(baz, "qux").unwrap();
        assert!(!qux.read_only);
        assert_eq!(qux.value.mask, TypeMask::INT);
        assert!(registry.property(baz, "old").unwrap().deprecated);

        let foo = registry.class_id("Foo").unwrap();
        assert_eq!(registry.property(foo, "bar").unwrap().value.class, Some(baz));
    }

    #[test]
    fn test_inherited_methods() {
        let registry = sample();
        let foo = registry.class_id("Foo").unwrap();
        assert!(registry.method(foo, "setValue").is_some());
        let spawn = registry.method(foo, "spawn").unwrap();
        assert!(spawn.is_class_method);
        assert_eq!(spawn.returns.class, Some(foo));
    }

    #[test]
    fn test_function_effects() {
        let registry = sample();
        let f = registry.function("seqLen").unwrap();
        assert_eq!(f.effect, CallEffect::ReturnsArgument(0));
        assert_eq!(registry.function_names(), vec!["seqLen"]);
    }

    #[test]
    fn test_strict_build_rejects_unknown_class() {
        let result = Registry::builder()
            .class("A", None)
            .property("A", "b => (object<Missing>)")
            .try_build();
        assert!(result.is_err());
    }

    #[test]
    fn test_lenient_build_skips_bad_entries() {
        let registry = Registry::builder()
            .class("A", None)
            .property("A", "broken")
            .property("A", "ok => (string$)")
            .function("not a prototype")
            .build();
        let a = registry.class_id("A").unwrap();
        assert_eq!(registry.properties(a).len(), 1);
        assert_eq!(registry.function_count(), 0);
    }
}
