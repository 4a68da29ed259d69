//! Function, method and property signatures.

use std::fmt;

use super::mask::{TypeDescriptor, TypeMask};

/// Extra behaviour of a call beyond its declared return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallEffect {
    #[default]
    None,
    /// The result has the type of the argument at this position (`rev`, `ifelse`)
    ReturnsArgument(usize),
    /// The result has the type of the first object-typed argument (`c`)
    ReturnsObjectArgument,
    /// The call creates a named global entity (`m1`, `p2`, ...) from its id argument
    DefinesEntity(char),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSignature {
    pub name: String,
    pub ty: TypeDescriptor,
    pub singleton: bool,
    pub optional: bool,
    pub default: Option<String>,
}

impl ParamSignature {
    pub fn is_variadic(&self) -> bool {
        self.name == "..."
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<ParamSignature>,
    pub returns: TypeDescriptor,
    pub effect: CallEffect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<ParamSignature>,
    pub returns: TypeDescriptor,
    pub effect: CallEffect,
    pub is_class_method: bool,
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySignature {
    pub name: String,
    pub value: TypeDescriptor,
    pub read_only: bool,
    pub deprecated: bool,
}

/// Anything with a parameter list that can be completed as `name=`.
pub trait Callable {
    fn name(&self) -> &str;
    fn params(&self) -> &[ParamSignature];
    fn returns(&self) -> TypeDescriptor;
    fn effect(&self) -> CallEffect;
}

impl Callable for FunctionSignature {
    fn name(&self) -> &str {
        &self.name
    }
    fn params(&self) -> &[ParamSignature] {
        &self.params
    }
    fn returns(&self) -> TypeDescriptor {
        self.returns
    }
    fn effect(&self) -> CallEffect {
        self.effect
    }
}

impl Callable for MethodSignature {
    fn name(&self) -> &str {
        &self.name
    }
    fn params(&self) -> &[ParamSignature] {
        &self.params
    }
    fn returns(&self) -> TypeDescriptor {
        self.returns
    }
    fn effect(&self) -> CallEffect {
        self.effect
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", mask_name(self.returns.mask))?;
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if param.is_variadic() {
                write!(f, "...")?;
            } else if param.optional {
                write!(f, "[{} {}]", mask_name(param.ty.mask), param.name)?;
            } else {
                write!(f, "{} {}", mask_name(param.ty.mask), param.name)?;
            }
        }
        write!(f, ")")
    }
}

/// Short human-readable name of a type mask.
pub fn mask_name(mask: TypeMask) -> String {
    if mask.is_empty() {
        return "void".to_string();
    }
    if mask == TypeMask::ANY {
        return "*".to_string();
    }
    if mask == TypeMask::ANY_BUT_NULL {
        return "+".to_string();
    }
    let names = [
        (TypeMask::NULL, "NULL"),
        (TypeMask::LOGICAL, "logical"),
        (TypeMask::INT, "integer"),
        (TypeMask::FLOAT, "float"),
        (TypeMask::STRING, "string"),
        (TypeMask::OBJECT, "object"),
    ];
    names
        .iter()
        .filter(|(bit, _)| mask.contains(*bit))
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join("|")
}
