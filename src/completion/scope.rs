//! Scope-injection analysis: seeds the type table a completion request sees.
//!
//! Blocks before the cursor's are interpreted in write-through child scopes,
//! so their ordinary bindings vanish at the block end while constants they
//! define stay visible. The block holding the cursor is interpreted directly
//! into the request's table. Each block first receives the ambient symbols
//! that its kind provides, such as `sim` or a callback's pseudo-parameters.

use tracing::{debug, trace};

use super::blocks::{open_function, scan_blocks, BlockKind, ScriptBlock};
use super::{CompletionRequest, RequestContext};
use crate::script::parser::{parse_block, Parser};
use crate::script::token::{Token, TokenKind};
use crate::types::builtins::SLIM_ENTITY_CLASSES;
use crate::types::function_map::{CallTypeTable, FunctionMap};
use crate::types::interpreter::type_interpret;
use crate::types::mask::TypeDescriptor;
use crate::types::registry::{descriptor_for, signature_from_prototype, SignatureRegistry};
use crate::types::type_table::{ScopedTypeTable, TypeScope, TypeTable};

/// Everything known at the cursor.
pub struct TypeContext<'r> {
    pub table: TypeTable,
    pub functions: FunctionMap<'r>,
    pub call_types: CallTypeTable,
    /// Kind of the block holding the cursor; `None` when the cursor is
    /// between blocks or in a block header.
    pub cursor_block: Option<BlockKind>,
}

impl TypeContext<'_> {
    /// The cursor is outside any block body; only block starters apply.
    pub fn is_fallback(&self) -> bool {
        self.cursor_block.is_none()
    }

    fn fallback() -> Self {
        Self {
            table: TypeTable::new(),
            functions: FunctionMap::empty(),
            call_types: CallTypeTable::new(),
            cursor_block: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Pseudo {
    Object(&'static str),
    Logical,
    Integer,
    Float,
}

const MUTATION_EFFECT: &[(&str, Pseudo)] = &[
    ("mut", Pseudo::Object("Mutation")),
    ("homozygous", Pseudo::Logical),
    ("effect", Pseudo::Float),
    ("individual", Pseudo::Object("Individual")),
    ("subpop", Pseudo::Object("Subpopulation")),
];

const FITNESS_EFFECT: &[(&str, Pseudo)] = &[
    ("individual", Pseudo::Object("Individual")),
    ("subpop", Pseudo::Object("Subpopulation")),
];

const INTERACTION: &[(&str, Pseudo)] = &[
    ("distance", Pseudo::Float),
    ("strength", Pseudo::Float),
    ("receiver", Pseudo::Object("Individual")),
    ("exerter", Pseudo::Object("Individual")),
];

const MATE_CHOICE: &[(&str, Pseudo)] = &[
    ("individual", Pseudo::Object("Individual")),
    ("subpop", Pseudo::Object("Subpopulation")),
    ("sourceSubpop", Pseudo::Object("Subpopulation")),
    ("weights", Pseudo::Float),
];

const MODIFY_CHILD: &[(&str, Pseudo)] = &[
    ("child", Pseudo::Object("Individual")),
    ("parent1", Pseudo::Object("Individual")),
    ("parent2", Pseudo::Object("Individual")),
    ("isCloning", Pseudo::Logical),
    ("isSelfing", Pseudo::Logical),
    ("subpop", Pseudo::Object("Subpopulation")),
    ("sourceSubpop", Pseudo::Object("Subpopulation")),
];

const RECOMBINATION: &[(&str, Pseudo)] = &[
    ("individual", Pseudo::Object("Individual")),
    ("haplosome1", Pseudo::Object("Haplosome")),
    ("haplosome2", Pseudo::Object("Haplosome")),
    ("subpop", Pseudo::Object("Subpopulation")),
    ("breakpoints", Pseudo::Integer),
];

const MUTATION: &[(&str, Pseudo)] = &[
    ("mut", Pseudo::Object("Mutation")),
    ("haplosome", Pseudo::Object("Haplosome")),
    ("element", Pseudo::Object("GenomicElement")),
    ("originalNuc", Pseudo::Integer),
    ("parent", Pseudo::Object("Individual")),
    ("subpop", Pseudo::Object("Subpopulation")),
];

const SURVIVAL: &[(&str, Pseudo)] = &[
    ("individual", Pseudo::Object("Individual")),
    ("subpop", Pseudo::Object("Subpopulation")),
    ("surviving", Pseudo::Logical),
    ("fitness", Pseudo::Float),
    ("draw", Pseudo::Float),
];

const REPRODUCTION: &[(&str, Pseudo)] = &[
    ("individual", Pseudo::Object("Individual")),
    ("subpop", Pseudo::Object("Subpopulation")),
];

fn pseudo_parameters(kind: BlockKind) -> &'static [(&'static str, Pseudo)] {
    match kind {
        BlockKind::MutationEffect => MUTATION_EFFECT,
        BlockKind::FitnessEffect => FITNESS_EFFECT,
        BlockKind::Interaction => INTERACTION,
        BlockKind::MateChoice => MATE_CHOICE,
        BlockKind::ModifyChild => MODIFY_CHILD,
        BlockKind::Recombination => RECOMBINATION,
        BlockKind::Mutation => MUTATION,
        BlockKind::Survival => SURVIVAL,
        BlockKind::Reproduction => REPRODUCTION,
        _ => &[],
    }
}

fn set_object(scope: &mut dyn TypeScope, name: &str, class: &str, registry: &dyn SignatureRegistry) {
    match registry.class_id(class) {
        Some(id) => scope.set(name, TypeDescriptor::object(id)),
        None => trace!("no class {} for ambient symbol {}", class, name),
    }
}

/// Add or remove the symbols a block of `kind` sees without declaring them.
pub fn inject_ambient(
    scope: &mut dyn TypeScope,
    kind: BlockKind,
    registry: &dyn SignatureRegistry,
    session: Option<&TypeTable>,
) {
    if kind == BlockKind::Initialize {
        scope.remove("sim");
        scope.remove("community");
        // Subpopulations and other runtime objects do not exist yet
        if let Some(session) = session {
            for (name, ty) in session.iter() {
                let entity = ty
                    .class
                    .and_then(|class| registry.class_name(class))
                    .is_some_and(|class_name| SLIM_ENTITY_CLASSES.contains(&class_name));
                if entity {
                    scope.remove(name);
                }
            }
        }
        return;
    }

    set_object(scope, "sim", "Species", registry);
    set_object(scope, "community", "Community", registry);
    if kind.is_callback() || kind == BlockKind::Untyped {
        set_object(scope, "self", "SLiMEidosScript", registry);
    }

    for &(name, pseudo) in pseudo_parameters(kind) {
        match pseudo {
            Pseudo::Object(class) => set_object(scope, name, class, registry),
            Pseudo::Logical => scope.set(name, TypeDescriptor::logical()),
            Pseudo::Integer => scope.set(name, TypeDescriptor::int()),
            Pseudo::Float => scope.set(name, TypeDescriptor::float()),
        }
    }
}

/// Build the type context for a completion at `cursor`.
///
/// Only tokens that start before the cursor are considered.
pub fn build_type_table<'r>(tokens: &[Token], cursor: usize, request: &CompletionRequest<'r>) -> TypeContext<'r> {
    let tokens = &tokens[..tokens.partition_point(|t| t.start < cursor && t.kind != TokenKind::Eof)];
    let registry = request.registry;

    let mut context = TypeContext {
        table: request.session.cloned().unwrap_or_else(TypeTable::with_constants),
        functions: FunctionMap::new(registry),
        call_types: CallTypeTable::new(),
        cursor_block: None,
    };

    match request.context {
        RequestContext::SlimScript => {
            let blocks = scan_blocks(tokens);
            let Some((cursor_block, earlier)) = blocks.split_last().filter(|(last, _)| last.is_open()) else {
                debug!("cursor outside any block body");
                return TypeContext::fallback();
            };

            // Functions are visible from every block, so register them first
            let (declarations, callbacks): (Vec<&ScriptBlock>, Vec<&ScriptBlock>) =
                earlier.iter().partition(|block| block.kind == BlockKind::Function);
            for block in declarations.into_iter().chain(callbacks) {
                analyze_complete_block(&mut context, block, tokens, request);
            }
            analyze_cursor_block(&mut context, cursor_block, tokens, request);
            context.cursor_block = Some(cursor_block.kind);
        }
        RequestContext::EidosScript | RequestContext::Console => {
            match open_function(tokens) {
                Some(function) => {
                    let before = parse_block(&tokens[..function.start]);
                    type_interpret(&before, &mut context.table, &mut context.functions, &mut context.call_types, registry);
                    analyze_cursor_block(&mut context, &function, tokens, request);
                }
                None => {
                    let stmts = parse_block(tokens);
                    type_interpret(&stmts, &mut context.table, &mut context.functions, &mut context.call_types, registry);
                }
            }
            context.cursor_block = Some(BlockKind::Untyped);
        }
    }

    trace!("type table seeded with {} symbols", context.table.len());
    context
}

fn analyze_complete_block(context: &mut TypeContext<'_>, block: &ScriptBlock, tokens: &[Token], request: &CompletionRequest<'_>) {
    let registry = request.registry;
    let mut scope = ScopedTypeTable::new(&mut context.table, true);
    inject_ambient(&mut scope, block.kind, registry, request.session);

    let stmts = if block.kind == BlockKind::Function {
        parse_block(block.span(tokens))
    } else {
        parse_block(block.body(tokens))
    };
    type_interpret(&stmts, &mut scope, &mut context.functions, &mut context.call_types, registry);
}

/// Interpret the block holding the cursor straight into the request's table.
fn analyze_cursor_block(context: &mut TypeContext<'_>, block: &ScriptBlock, tokens: &[Token], request: &CompletionRequest<'_>) {
    let registry = request.registry;
    if request.context == RequestContext::SlimScript {
        inject_ambient(&mut context.table, block.kind, registry, request.session);
    }

    if block.kind == BlockKind::Function {
        // Skip the `function` keyword; the rest of the header is the prototype
        let header = block.header(tokens);
        let keyword = header.iter().position(|t| t.kind == TokenKind::Function).unwrap_or(0);
        match Parser::new(&header[keyword + 1..]).prototype() {
            Ok(proto) => {
                for param in &proto.params {
                    context.table.set(&param.name, descriptor_for(&param.ty, registry));
                }
                context.functions.add_user_function(signature_from_prototype(&proto, registry));
            }
            Err(err) => debug!("cannot use function header at cursor: {}", err),
        }
    }

    let stmts = parse_block(block.body(tokens));
    type_interpret(&stmts, &mut context.table, &mut context.functions, &mut context.call_types, registry);
}
