// Copyright 2025 STARGA Inc.
// Licensed under the Apache License, Version 2.0 (the “License”);
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at:
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an “AS IS” BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Part of the Cady project (symbolic differentiation and code generation).

//! Traversals over the expression DAG.
//!
//! All walks use explicit stacks and visit each shared node once.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;

use super::{Expr, Node};

/// Bindings directly referenced by `expr`, without descending into them.
///
/// When `expr` is itself a binding the walk starts at the expression it
/// wraps, so a statement never lists itself. Results are in first-visit
/// order (left operand before right) and unique by name.
pub fn collect_binding_dependencies(expr: &Expr) -> Vec<Expr> {
    let start = expr.bound_expr().unwrap_or(expr);
    let mut seen_nodes = FxHashSet::default();
    let mut seen_names = FxHashSet::default();
    let mut deps = Vec::new();
    let mut stack = vec![start];
    while let Some(current) = stack.pop() {
        if !seen_nodes.insert(current.as_ptr()) {
            continue;
        }
        if let Some(name) = current.binding_name() {
            if seen_names.insert(name.to_string()) {
                deps.push(current.clone());
            }
            continue;
        }
        for child in current.children().into_iter().rev() {
            stack.push(child);
        }
    }
    deps
}

/// Every binding node reachable from `expr`, dependencies before
/// dependents.
///
/// The root itself is included last when it is a binding. Each node
/// appears once; two distinct nodes that share a name are both reported,
/// so callers can reject the clash.
pub fn depth_first_bindings(expr: &Expr) -> Vec<Expr> {
    depth_first_bindings_pruned(expr, |_| false)
}

/// Like [`depth_first_bindings`], but does not descend into (or report)
/// bindings for which `stop` returns true. The root is always expanded.
pub fn depth_first_bindings_pruned<F>(expr: &Expr, stop: F) -> Vec<Expr>
where
    F: Fn(&Expr) -> bool,
{
    let mut order = Vec::new();
    let mut visited = FxHashSet::default();
    // (node, children already pushed)
    let mut stack = vec![(expr.clone(), false)];
    while let Some((current, expanded)) = stack.pop() {
        if expanded {
            if current.is_binding() {
                order.push(current);
            }
            continue;
        }
        if !visited.insert(current.as_ptr()) {
            continue;
        }
        if current.is_binding() && !current.ptr_eq(expr) && stop(&current) {
            continue;
        }
        let children: Vec<Expr> = current.children().into_iter().cloned().collect();
        stack.push((current, true));
        for child in children.into_iter().rev() {
            stack.push((child, false));
        }
    }
    order
}

/// Names of the free variables `expr` reads, not looking through bindings.
pub fn free_variables(expr: &Expr) -> BTreeSet<String> {
    let start = expr.bound_expr().unwrap_or(expr);
    let mut names = BTreeSet::new();
    let mut visited = FxHashSet::default();
    let mut stack = vec![start];
    while let Some(current) = stack.pop() {
        if !visited.insert(current.as_ptr()) {
            continue;
        }
        match current.node() {
            Node::Variable(name) => {
                names.insert(name.clone());
            }
            Node::Binding { .. } => {}
            _ => stack.extend(current.children()),
        }
    }
    names
}
