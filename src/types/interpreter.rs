//! Type interpretation over parsed statements.
//!
//! Walks statements in order, inferring a [`TypeDescriptor`] for each
//! expression and recording what it learns: assignments and loop variables
//! set symbols in the current scope, `function` declarations register user
//! signatures, constant-defining and entity-defining calls define globals,
//! and function calls whose result has a class record it in the
//! [`CallTypeTable`].

use tracing::trace;

use super::function_map::{CallTypeTable, FunctionMap};
use super::mask::{TypeDescriptor, TypeMask};
use super::registry::{SignatureRegistry, descriptor_for, signature_from_prototype};
use super::signatures::{CallEffect, Callable, ParamSignature};
use super::type_table::{ScopedTypeTable, TypeScope};
use crate::script::ast::{Arg, BinaryOp, Expr, Stmt, UnaryOp};

/// Interpret `stmts`, mutating the given tables.
pub fn type_interpret(
    stmts: &[Stmt],
    scope: &mut dyn TypeScope,
    functions: &mut FunctionMap<'_>,
    call_types: &mut CallTypeTable,
    registry: &dyn SignatureRegistry,
) {
    let mut interpreter = TypeInterpreter { scope, functions, call_types, registry };
    interpreter.statements(stmts);
}

/// Whether a call name follows the `define…Constant` / `define…Global` pattern.
pub fn is_constant_definer(name: &str) -> bool {
    name.starts_with("define") && (name.ends_with("Constant") || name.ends_with("Global"))
}

struct TypeInterpreter<'a, 'r> {
    scope: &'a mut dyn TypeScope,
    functions: &'a mut FunctionMap<'r>,
    call_types: &'a mut CallTypeTable,
    registry: &'a dyn SignatureRegistry,
}

impl TypeInterpreter<'_, '_> {
    fn statements(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.statement(stmt);
        }
    }

    fn statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                self.expr(expr);
            }
            Stmt::Assign { target, value } => {
                let ty = self.expr(value);
                match target {
                    Expr::Ident { name, .. } => self.scope.set(name, ty),
                    other => {
                        self.expr(other);
                    }
                }
            }
            Stmt::Block(body) => self.statements(body),
            Stmt::If { cond, then, otherwise } => {
                self.expr(cond);
                self.statement(then);
                if let Some(otherwise) = otherwise {
                    self.statement(otherwise);
                }
            }
            Stmt::While { cond, body } => {
                self.expr(cond);
                self.statement(body);
            }
            Stmt::DoWhile { body, cond } => {
                self.statement(body);
                self.expr(cond);
            }
            Stmt::For { var, range, body } => {
                let ty = self.expr(range);
                if !var.is_empty() {
                    self.scope.set(var, ty);
                }
                self.statement(body);
            }
            Stmt::Return(Some(expr)) => {
                self.expr(expr);
            }
            Stmt::Function { proto, body } => {
                let signature = signature_from_prototype(proto, self.registry);
                trace!("user function {}", signature);
                self.functions.add_user_function(signature);

                let mut local = ScopedTypeTable::new(&mut *self.scope, true);
                for param in &proto.params {
                    local.set(&param.name, descriptor_for(&param.ty, self.registry));
                }
                let mut inner = TypeInterpreter {
                    scope: &mut local,
                    functions: &mut *self.functions,
                    call_types: &mut *self.call_types,
                    registry: self.registry,
                };
                inner.statements(body);
            }
            Stmt::Return(None) | Stmt::Next | Stmt::Break | Stmt::Empty => {}
        }
    }

    fn expr(&mut self, expr: &Expr) -> TypeDescriptor {
        match expr {
            Expr::Number { is_float: true, .. } => TypeDescriptor::float(),
            Expr::Number { .. } => TypeDescriptor::int(),
            Expr::String(_) => TypeDescriptor::string(),
            Expr::Ident { name, .. } => self.scope.lookup(name).unwrap_or(TypeDescriptor::NONE),
            Expr::Unary { op: UnaryOp::Not, operand } => {
                self.expr(operand);
                TypeDescriptor::logical()
            }
            Expr::Unary { operand, .. } => {
                let ty = self.expr(operand);
                if ty.is_none() {
                    return ty;
                }
                let numeric = ty.mask & TypeMask::NUMERIC;
                TypeDescriptor::new(if numeric.is_empty() { TypeMask::INT } else { numeric })
            }
            Expr::Binary { op, lhs, rhs } => {
                let l = self.expr(lhs);
                let r = self.expr(rhs);
                binary_type(*op, l, r)
            }
            Expr::Conditional { cond, then, otherwise } => {
                self.expr(cond);
                let a = self.expr(then);
                let b = self.expr(otherwise);
                a.union(b)
            }
            Expr::Member { target, name } => {
                let target = self.expr(target);
                match target.class {
                    Some(class) => self
                        .registry
                        .property(class, name)
                        .map(|p| p.value)
                        .unwrap_or(TypeDescriptor::NONE),
                    None => TypeDescriptor::NONE,
                }
            }
            Expr::Subset { target, index } => {
                if let Some(index) = index {
                    self.expr(index);
                }
                self.expr(target)
            }
            Expr::Call { callee, args, start } => self.call(callee, args, *start),
            Expr::Error => TypeDescriptor::NONE,
        }
    }

    fn call(&mut self, callee: &Expr, args: &[Arg], start: usize) -> TypeDescriptor {
        let arg_types: Vec<TypeDescriptor> = args.iter().map(|a| self.expr(&a.value)).collect();

        match callee {
            Expr::Ident { name, .. } => {
                if is_constant_definer(name) {
                    self.define_constant(args, &arg_types);
                }
                let Some(signature) = self.functions.get(name) else {
                    return TypeDescriptor::NONE;
                };
                let signature = signature.clone();
                let result = call_result(&signature, args, &arg_types);
                if let CallEffect::DefinesEntity(prefix) = signature.effect {
                    self.define_entity(prefix, signature.params(), args, result);
                }
                if let Some(class) = result.class {
                    self.call_types.insert(start, class);
                }
                result
            }
            Expr::Member { target, name } => {
                let target = self.expr(target);
                let Some(class) = target.class else {
                    return TypeDescriptor::NONE;
                };
                let registry = self.registry;
                let Some(method) = registry.method(class, name) else {
                    return TypeDescriptor::NONE;
                };
                let result = call_result(method, args, &arg_types);
                if let CallEffect::DefinesEntity(prefix) = method.effect {
                    self.define_entity(prefix, &method.params, args, result);
                }
                if let Some(class) = result.class {
                    self.call_types.insert(start, class);
                }
                result
            }
            other => {
                self.expr(other);
                TypeDescriptor::NONE
            }
        }
    }

    /// `defineConstant("K", value)` makes `K` visible in every later block.
    fn define_constant(&mut self, args: &[Arg], arg_types: &[TypeDescriptor]) {
        let Some(symbol) = args.first().and_then(|a| a.value.string_value()) else {
            return;
        };
        let value = args
            .iter()
            .position(|a| a.name.as_deref() == Some("value"))
            .or_else(|| (args.len() > 1).then_some(1));
        if let Some(index) = value {
            trace!("constant {} defined", symbol);
            self.scope.define_global(&symbol, arg_types[index]);
        }
    }

    /// `initializeMutationType("m1", ...)` or `addSubpop(2, ...)` define `m1` / `p2`.
    fn define_entity(&mut self, prefix: char, params: &[ParamSignature], args: &[Arg], result: TypeDescriptor) {
        let Some(id_arg) = argument_index(params, args, 0).map(|i| &args[i]) else {
            return;
        };
        let symbol = match &id_arg.value {
            Expr::String(_) => id_arg.value.string_value(),
            Expr::Number { text, is_float: false } => Some(format!("{prefix}{text}")),
            _ => None,
        };
        if let Some(symbol) = symbol {
            trace!("entity {} defined", symbol);
            self.scope.define_global(&symbol, result);
        }
    }
}

/// Result type of a binary operation.
fn binary_type(op: BinaryOp, l: TypeDescriptor, r: TypeDescriptor) -> TypeDescriptor {
    match op {
        BinaryOp::Range => {
            if l.mask == TypeMask::INT && r.mask == TypeMask::INT {
                TypeDescriptor::int()
            } else if (l.mask | r.mask).contains(TypeMask::FLOAT) {
                TypeDescriptor::float()
            } else {
                TypeDescriptor::new(TypeMask::NUMERIC)
            }
        }
        BinaryOp::Add if (l.mask | r.mask).contains(TypeMask::STRING) => TypeDescriptor::string(),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
            if l.mask == TypeMask::INT && r.mask == TypeMask::INT {
                TypeDescriptor::int()
            } else if (l.mask | r.mask).contains(TypeMask::FLOAT) {
                TypeDescriptor::float()
            } else {
                TypeDescriptor::new(TypeMask::NUMERIC)
            }
        }
        BinaryOp::Div | BinaryOp::Mod | BinaryOp::Exp => TypeDescriptor::float(),
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq
        | BinaryOp::And
        | BinaryOp::Or => TypeDescriptor::logical(),
    }
}

/// Index of the argument bound to parameter `index`, by name or by position.
fn argument_index(params: &[ParamSignature], args: &[Arg], index: usize) -> Option<usize> {
    if let Some(param) = params.get(index) {
        if let Some(named) = args.iter().position(|a| a.name.as_deref() == Some(param.name.as_str())) {
            return Some(named);
        }
    }
    args.iter()
        .enumerate()
        .filter(|(_, a)| a.name.is_none())
        .nth(index)
        .map(|(i, _)| i)
}

fn call_result(callable: &impl Callable, args: &[Arg], arg_types: &[TypeDescriptor]) -> TypeDescriptor {
    let declared = callable.returns();
    match callable.effect() {
        CallEffect::ReturnsArgument(index) => argument_index(callable.params(), args, index)
            .map(|i| arg_types[i])
            .filter(|ty| !ty.is_none())
            .unwrap_or(declared),
        CallEffect::ReturnsObjectArgument => arg_types
            .iter()
            .copied()
            .find(|ty| ty.is_object())
            .unwrap_or(declared),
        CallEffect::None | CallEffect::DefinesEntity(_) => declared,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::lexer::tokenize;
    use crate::script::parser::parse_block;
    use crate::types::builtins::builtin_registry;
    use crate::types::type_table::TypeTable;

    fn interpret(source: &str) -> (TypeTable, CallTypeTable, Vec<String>) {
        let registry = builtin_registry();
        let mut table = TypeTable::with_constants();
        table.set("sim", TypeDescriptor::object(registry.class_id("Species").unwrap()));
        let mut functions = FunctionMap::new(registry);
        let mut call_types = CallTypeTable::new();
        let stmts = parse_block(&tokenize(source));
        type_interpret(&stmts, &mut table, &mut functions, &mut call_types, registry);
        let user = functions.user_function_names().into_iter().map(String::from).collect();
        (table, call_types, user)
    }

    #[test]
    fn test_literal_and_arithmetic_types() {
        let (table, _, _) = interpret("a = 1; b = 2.5; c = a + b; d = a * 2; e = 'x' + a; f = a / 2; g = a < b;");
        assert_eq!(table.lookup("a"), Some(TypeDescriptor::int()));
        assert_eq!(table.lookup("b"), Some(TypeDescriptor::float()));
        assert_eq!(table.lookup("c"), Some(TypeDescriptor::float()));
        assert_eq!(table.lookup("d"), Some(TypeDescriptor::int()));
        assert_eq!(table.lookup("e"), Some(TypeDescriptor::string()));
        assert_eq!(table.lookup("f"), Some(TypeDescriptor::float()));
        assert_eq!(table.lookup("g"), Some(TypeDescriptor::logical()));
    }

    #[test]
    fn test_range_and_loop_variable() {
        let (table, _, _) = interpret("for (i in 1:10) x = i; for (s in sim.subpopulations) y = s;");
        assert_eq!(table.lookup("i"), Some(TypeDescriptor::int()));
        assert_eq!(table.lookup("x"), Some(TypeDescriptor::int()));
        let subpop = builtin_registry().class_id("Subpopulation").unwrap();
        assert_eq!(table.lookup("y").unwrap().class, Some(subpop));
    }

    #[test]
    fn test_member_and_method_types() {
        let (table, _, _) = interpret("inds = sim.subpopulations.individuals; n = sim.subpopulations[0].individualCount; m = sim.mutationsOfType(1);");
        let registry = builtin_registry();
        assert_eq!(table.lookup("inds").unwrap().class, registry.class_id("Individual"));
        assert_eq!(table.lookup("n"), Some(TypeDescriptor::int()));
        assert_eq!(table.lookup("m").unwrap().class, registry.class_id("Mutation"));
    }

    #[test]
    fn test_pass_through_returns() {
        let (table, call_types, _) = interpret("x = sample(sim.subpopulations, 1); y = ifelse(T, 1.5, 2.5); z = c(NULL, sim);");
        let registry = builtin_registry();
        assert_eq!(table.lookup("x").unwrap().class, registry.class_id("Subpopulation"));
        assert_eq!(table.lookup("y"), Some(TypeDescriptor::float()));
        assert_eq!(table.lookup("z").unwrap().class, registry.class_id("Species"));
        // `sample` starts at offset 4
        assert_eq!(call_types.get(&4).copied(), registry.class_id("Subpopulation"));
    }

    #[test]
    fn test_method_call_types_are_recorded() {
        let source = "x = sim.subpopulations[0].sampleIndividuals(5); y = sim.mutationsOfType(1).size();";
        let (_, call_types, _) = interpret(source);
        let registry = builtin_registry();
        let sample = source.find("sampleIndividuals").unwrap();
        assert_eq!(call_types.get(&sample).copied(), registry.class_id("Individual"));
        let mutations = source.find("mutationsOfType").unwrap();
        assert_eq!(call_types.get(&mutations).copied(), registry.class_id("Mutation"));
        // `size()` returns an integer, which has no class
        assert_eq!(call_types.get(&source.find("size").unwrap()), None);
    }

    #[test]
    fn test_constant_definition() {
        let (table, _, _) = interpret("defineConstant('K', 500); defineGlobal(\"RATE\", value=1e-7); defineConstant(name, 3);");
        assert_eq!(table.lookup("K"), Some(TypeDescriptor::int()));
        assert_eq!(table.lookup("RATE"), Some(TypeDescriptor::float()));
        assert_eq!(table.lookup("name"), None);
    }

    #[test]
    fn test_entity_definitions() {
        let (table, _, _) = interpret("initializeMutationType('m1', 0.5, 'f', 0.0); sim.addSubpop(2, 100); initializeGenomicElementType(\"g1\", m1, 1.0);");
        let registry = builtin_registry();
        assert_eq!(table.lookup("m1").unwrap().class, registry.class_id("MutationType"));
        assert_eq!(table.lookup("p2").unwrap().class, registry.class_id("Subpopulation"));
        assert_eq!(table.lookup("g1").unwrap().class, registry.class_id("GenomicElementType"));
    }

    #[test]
    fn test_user_function_registration_and_scope() {
        let (table, _, user) = interpret("function (float)half(numeric x) { y = x / 2; defineConstant('H', y); return y; } z = half(4);");
        assert_eq!(user, vec!["half".to_string()]);
        assert_eq!(table.lookup("z"), Some(TypeDescriptor::float()));
        assert_eq!(table.lookup("x"), None);
        assert_eq!(table.lookup("y"), None);
        assert_eq!(table.lookup("H"), Some(TypeDescriptor::float()));
    }

    #[test]
    fn test_unknown_names_stay_unknown() {
        let (table, _, _) = interpret("a = nothing.foo; b = mystery(1); c = sim.noSuchProperty;");
        assert_eq!(table.lookup("a"), None);
        assert_eq!(table.lookup("b"), None);
        assert_eq!(table.lookup("c"), None);
    }

    #[test]
    fn test_constant_definer_pattern() {
        assert!(is_constant_definer("defineConstant"));
        assert!(is_constant_definer("defineGlobal"));
        assert!(is_constant_definer("defineSpatialConstant"));
        assert!(!is_constant_definer("define"));
        assert!(!is_constant_definer("redefineConstant"));
    }
}
