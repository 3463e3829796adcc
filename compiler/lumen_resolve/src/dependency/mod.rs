//! Declaration dependency analysis.
//!
//! Runs before resolution. Binds every identifier (expression identifiers,
//! call targets, named types) to the declaration it names and orders the
//! module-scope declarations so each comes after everything it uses. The
//! resolver relies on that order: a callee is always resolved before its
//! callers.
//!
//! Any error here stops resolution.

mod scanner;

use lumen_diagnostic::{DiagnosticSink, ErrorCode, ErrorGuaranteed};
use lumen_ir::{
    AliasId, FunctionId, GlobalDecl, Module, Name, NodeId, ParamId, Span, StringInterner,
    StructDeclId, VariableId,
};
use rustc_hash::FxHashMap;

use scanner::Scanner;

/// A declaration an identifier can name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Decl {
    Variable(VariableId),
    Param(ParamId),
    Function(FunctionId),
    Struct(StructDeclId),
    Alias(AliasId),
}

impl Decl {
    fn from_global(decl: GlobalDecl) -> Option<Decl> {
        match decl {
            GlobalDecl::Variable(id) => Some(Decl::Variable(id)),
            GlobalDecl::Function(id) => Some(Decl::Function(id)),
            GlobalDecl::Struct(id) => Some(Decl::Struct(id)),
            GlobalDecl::Alias(id) => Some(Decl::Alias(id)),
            GlobalDecl::Enable(_) | GlobalDecl::StaticAssert(_) => None,
        }
    }
}

/// Result of dependency analysis.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    resolved: FxHashMap<NodeId, Decl>,
    shadows: Vec<(Decl, Decl)>,
    ordered_globals: Vec<GlobalDecl>,
}

/// A module-scope declaration during analysis.
struct Global {
    decl: GlobalDecl,
    name: Option<Name>,
    span: Span,
    kind: &'static str,
}

/// A use of one global by another.
#[derive(Copy, Clone, Debug)]
struct Edge {
    to: usize,
    /// First reference, for cycle notes.
    span: Span,
    call: bool,
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum Visit {
    Unvisited,
    OnStack,
    Done,
}

impl DependencyGraph {
    /// Analyse `module`. Errors are reported into `sink`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(
        module: &Module,
        interner: &StringInterner,
        sink: &mut DiagnosticSink,
    ) -> Result<Self, ErrorGuaranteed> {
        let mut failed: Option<ErrorGuaranteed> = None;
        let globals = collect_globals(module);

        let mut by_name: FxHashMap<Name, usize> = FxHashMap::default();
        for (index, global) in globals.iter().enumerate() {
            let Some(name) = global.name else { continue };
            if let Some(&previous) = by_name.get(&name) {
                let text = interner.lookup(name);
                failed = Some(sink.add_error(
                    ErrorCode::E1002,
                    format!("redeclaration of '{text}'"),
                    global.span,
                ));
                sink.add_note(
                    format!("'{text}' previously declared here"),
                    globals[previous].span,
                );
            } else {
                by_name.insert(name, index);
            }
        }

        let mut graph = DependencyGraph::default();
        let mut edges = Vec::with_capacity(globals.len());
        for global in &globals {
            let mut scanner = Scanner::new(
                module,
                interner,
                &mut *sink,
                &globals,
                &by_name,
                &mut graph.resolved,
                &mut graph.shadows,
            );
            scanner.global(global.decl);
            let (global_edges, error) = scanner.finish();
            edges.push(global_edges);
            failed = failed.or(error);
        }

        if let Some(guarantee) = failed {
            return Err(guarantee);
        }

        graph.sort(&globals, &edges, interner, sink)?;
        tracing::debug!(
            globals = graph.ordered_globals.len(),
            resolved = graph.resolved.len(),
            shadows = graph.shadows.len(),
            "dependency graph built"
        );
        Ok(graph)
    }

    /// The declaration an identifier expression, call target identifier or
    /// named type refers to. `None` for builtin functions.
    pub fn resolved(&self, node: NodeId) -> Option<Decl> {
        self.resolved.get(&node).copied()
    }

    /// `(shadowing, shadowed)` pairs for local and parameter declarations.
    pub fn shadows(&self) -> &[(Decl, Decl)] {
        &self.shadows
    }

    /// Module-scope declarations in resolution order.
    pub fn ordered_globals(&self) -> &[GlobalDecl] {
        &self.ordered_globals
    }

    /// Topological sort: `enable` directives first, then depth-first
    /// post-order in declaration order.
    fn sort(
        &mut self,
        globals: &[Global],
        edges: &[Vec<Edge>],
        interner: &StringInterner,
        sink: &mut DiagnosticSink,
    ) -> Result<(), ErrorGuaranteed> {
        self.ordered_globals.extend(
            globals
                .iter()
                .filter(|g| matches!(g.decl, GlobalDecl::Enable(_)))
                .map(|g| g.decl),
        );

        let mut state = vec![Visit::Unvisited; globals.len()];
        for root in 0..globals.len() {
            if state[root] != Visit::Unvisited || matches!(globals[root].decl, GlobalDecl::Enable(_))
            {
                continue;
            }
            // (global, index of the next edge to follow)
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            state[root] = Visit::OnStack;
            while let Some(&(node, next)) = stack.last() {
                let Some(&edge) = edges[node].get(next) else {
                    state[node] = Visit::Done;
                    self.ordered_globals.push(globals[node].decl);
                    stack.pop();
                    continue;
                };
                let top = stack.len() - 1;
                stack[top].1 += 1;
                match state[edge.to] {
                    Visit::Done => {}
                    Visit::OnStack => {
                        return Err(report_cycle(&stack, edge, globals, edges, interner, sink));
                    }
                    Visit::Unvisited => {
                        state[edge.to] = Visit::OnStack;
                        stack.push((edge.to, 0));
                    }
                }
            }
        }
        Ok(())
    }
}

fn collect_globals(module: &Module) -> Vec<Global> {
    module
        .globals()
        .iter()
        .map(|&decl| {
            let (name, kind) = match decl {
                GlobalDecl::Enable(_) => (None, "enable"),
                GlobalDecl::StaticAssert(_) => (None, "static_assert"),
                GlobalDecl::Alias(id) => (Some(module.alias(id).name), "alias"),
                GlobalDecl::Struct(id) => (Some(module.struct_decl(id).name), "struct"),
                GlobalDecl::Function(id) => (Some(module.function(id).name), "function"),
                GlobalDecl::Variable(id) => {
                    let var = module.variable(id);
                    (Some(var.name), var.kind.keyword())
                }
            };
            Global {
                decl,
                name,
                span: module.global_span(decl),
                kind,
            }
        })
        .collect()
}

/// Report the cycle closed by `closing`, whose target is on `stack`.
fn report_cycle(
    stack: &[(usize, usize)],
    closing: Edge,
    globals: &[Global],
    edges: &[Vec<Edge>],
    interner: &StringInterner,
    sink: &mut DiagnosticSink,
) -> ErrorGuaranteed {
    let start = stack
        .iter()
        .position(|&(node, _)| node == closing.to)
        .unwrap_or(0);
    let name_of = |index: usize| globals[index].name.map_or("", |n| interner.lookup(n));

    // Edges followed along the cycle: each stack entry's last followed edge,
    // then the closing edge.
    let mut cycle: Vec<(usize, Edge)> = stack[start..stack.len() - 1]
        .iter()
        .filter_map(|&(node, next)| {
            next.checked_sub(1)
                .and_then(|i| edges[node].get(i))
                .map(|&edge| (node, edge))
        })
        .collect();
    if let Some(&(last, _)) = stack.last() {
        cycle.push((last, closing));
    }

    let mut path: Vec<String> = cycle
        .iter()
        .map(|&(from, _)| format!("'{}'", name_of(from)))
        .collect();
    path.push(format!("'{}'", name_of(closing.to)));

    let guarantee = sink.add_error(
        ErrorCode::E1003,
        format!("cyclic dependency found: {}", path.join(" -> ")),
        globals[closing.to].span,
    );
    for (from, edge) in cycle {
        let verb = if edge.call { "calls" } else { "references" };
        sink.add_note(
            format!(
                "{} '{}' {verb} {} '{}' here",
                globals[from].kind,
                name_of(from),
                globals[edge.to].kind,
                name_of(edge.to)
            ),
            edge.span,
        );
    }
    guarantee
}

#[cfg(test)]
mod tests;
