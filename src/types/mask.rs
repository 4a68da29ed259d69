//! Type masks and type descriptors
//!
//! A [`TypeDescriptor`] is the inferred set of primitive kinds an expression
//! may have, plus the object class when that set includes `OBJECT`.

use bitflags::bitflags;

use super::registry::ClassId;

bitflags! {
    /// Possible primitive kinds of a value
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[repr(transparent)]
    pub struct TypeMask: u8 {
        const NULL = 0b0000_0001;
        const LOGICAL = 0b0000_0010;
        const INT = 0b0000_0100;
        const FLOAT = 0b0000_1000;
        const STRING = 0b0001_0000;
        const OBJECT = 0b0010_0000;

        const NUMERIC = Self::INT.bits() | Self::FLOAT.bits();
        /// `+` in a type specifier: anything except NULL
        const ANY_BUT_NULL = Self::LOGICAL.bits()
            | Self::INT.bits()
            | Self::FLOAT.bits()
            | Self::STRING.bits()
            | Self::OBJECT.bits();
        /// `*` in a type specifier
        const ANY = Self::ANY_BUT_NULL.bits() | Self::NULL.bits();
    }
}

impl TypeMask {
    /// Mask for one letter of an abbreviated type specifier (`N`, `l`, `i`,
    /// `f`, `s`, `o`, `n`).
    pub fn from_abbreviation(letter: char) -> Option<TypeMask> {
        let mask = match letter {
            'N' => TypeMask::NULL,
            'l' => TypeMask::LOGICAL,
            'i' => TypeMask::INT,
            'f' => TypeMask::FLOAT,
            's' => TypeMask::STRING,
            'o' => TypeMask::OBJECT,
            'n' => TypeMask::NUMERIC,
            _ => return None,
        };
        Some(mask)
    }

    /// Mask for a spelled-out type name.
    pub fn from_type_name(name: &str) -> Option<TypeMask> {
        let mask = match name {
            "void" => TypeMask::empty(),
            "NULL" => TypeMask::NULL,
            "logical" => TypeMask::LOGICAL,
            "integer" => TypeMask::INT,
            "float" => TypeMask::FLOAT,
            "string" => TypeMask::STRING,
            "object" => TypeMask::OBJECT,
            "numeric" => TypeMask::NUMERIC,
            _ => return None,
        };
        Some(mask)
    }
}

/// Inferred type of a symbol or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeDescriptor {
    pub mask: TypeMask,
    /// Present only when `mask` contains `OBJECT`
    pub class: Option<ClassId>,
}

impl TypeDescriptor {
    /// Nothing is known about the value.
    pub const NONE: TypeDescriptor = TypeDescriptor { mask: TypeMask::empty(), class: None };

    pub fn new(mask: TypeMask) -> Self {
        Self { mask, class: None }
    }

    /// An object of a known class.
    pub fn object(class: ClassId) -> Self {
        Self { mask: TypeMask::OBJECT, class: Some(class) }
    }

    /// Build a descriptor, dropping a class that the mask cannot carry.
    pub fn with_class(mask: TypeMask, class: Option<ClassId>) -> Self {
        let class = if mask.contains(TypeMask::OBJECT) { class } else { None };
        Self { mask, class }
    }

    pub fn logical() -> Self {
        Self::new(TypeMask::LOGICAL)
    }

    pub fn int() -> Self {
        Self::new(TypeMask::INT)
    }

    pub fn float() -> Self {
        Self::new(TypeMask::FLOAT)
    }

    pub fn string() -> Self {
        Self::new(TypeMask::STRING)
    }

    pub fn is_none(&self) -> bool {
        self.mask.is_empty()
    }

    pub fn is_object(&self) -> bool {
        self.mask.contains(TypeMask::OBJECT)
    }

    /// Union of two descriptors; the class survives only if both agree.
    pub fn union(self, other: TypeDescriptor) -> TypeDescriptor {
        let class = match (self.class, other.class) {
            (Some(a), Some(b)) if a == b => Some(a),
            (Some(a), None) if !other.is_object() => Some(a),
            (None, Some(b)) if !self.is_object() => Some(b),
            _ => None,
        };
        TypeDescriptor::with_class(self.mask | other.mask, class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviations() {
        let mask = "Nif"
            .chars()
            .map(|c| TypeMask::from_abbreviation(c).unwrap())
            .fold(TypeMask::empty(), |acc, m| acc | m);
        assert_eq!(mask, TypeMask::NULL | TypeMask::NUMERIC);
        assert_eq!(TypeMask::from_abbreviation('x'), None);
        assert_eq!(TypeMask::from_type_name("numeric"), Some(TypeMask::NUMERIC));
    }

    #[test]
    fn test_class_requires_object_mask() {
        let descriptor = TypeDescriptor::with_class(TypeMask::INT, Some(ClassId(3)));
        assert_eq!(descriptor.class, None);
        assert_eq!(TypeDescriptor::object(ClassId(3)).class, Some(ClassId(3)));
    }

    #[test]
    fn test_union_keeps_agreeing_class() {
        let a = TypeDescriptor::object(ClassId(1));
        assert_eq!(a.union(a).class, Some(ClassId(1)));
        assert_eq!(a.union(TypeDescriptor::object(ClassId(2))).class, None);
        let with_null = a.union(TypeDescriptor::new(TypeMask::NULL));
        assert_eq!(with_null.class, Some(ClassId(1)));
        assert!(with_null.mask.contains(TypeMask::NULL));
    }
}
