//! Static type information: masks, signatures, scoped type tables and the
//! abstract interpreter that fills them.

pub mod builtins;
pub mod function_map;
pub mod interpreter;
pub mod mask;
pub mod registry;
pub mod signatures;
pub mod type_table;

pub use builtins::builtin_registry;
pub use function_map::{CallTypeTable, FunctionMap};
pub use interpreter::type_interpret;
pub use mask::{TypeDescriptor, TypeMask};
pub use registry::{ClassId, Registry, SignatureRegistry};
pub use type_table::{ScopedTypeTable, TypeScope, TypeTable};
