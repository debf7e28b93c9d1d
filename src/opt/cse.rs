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

//! Structural hash-consing (common subexpression elimination).
//!
//! [`Deduplicator::dedup`] turns a tree into a DAG where every distinct
//! non-constant operation, and every input variable, sits behind exactly one
//! named binding. The binding names are `<prefix><n>` with a per-instance
//! counter, so one instance can be fed several expressions and they will
//! share bindings with each other. Names passed to
//! [`reserve`](Deduplicator::reserve) are skipped.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::expr::{Expr, Node, OpKind};

type Key = (OpKind, Vec<*const Node>);

pub struct Deduplicator {
    prefix: String,
    // Values keep every canonical child alive, so the addresses in the keys
    // stay valid for the table's lifetime.
    table: FxHashMap<Key, Expr>,
    memo: FxHashMap<*const Node, (Expr, Expr)>,
    reserved: FxHashSet<String>,
    counter: usize,
    created: usize,
}

impl Deduplicator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Deduplicator {
            prefix: prefix.into(),
            table: FxHashMap::default(),
            memo: FxHashMap::default(),
            reserved: FxHashSet::default(),
            counter: 0,
            created: 0,
        }
    }

    /// Never generate `name`.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.reserved.insert(name.into());
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// How many bindings this instance has introduced.
    pub fn bindings_created(&self) -> usize {
        self.created
    }

    /// Canonicalize `expr`, wrapping each new operation in a binding.
    ///
    /// Existing bindings pass through untouched. Constants are shared but
    /// never wrapped.
    pub fn dedup(&mut self, expr: &Expr) -> Expr {
        if let Some((_, canonical)) = self.memo.get(&expr.as_ptr()) {
            return canonical.clone();
        }
        let canonical = match expr.node() {
            Node::Binding { .. } => expr.clone(),
            _ => {
                let rebuilt = self.canonical_children(expr);
                self.intern(rebuilt, |node| !matches!(node.node(), Node::Constant(_)))
            }
        };
        self.memo
            .insert(expr.as_ptr(), (expr.clone(), canonical.clone()));
        canonical
    }

    /// Canonicalize the operands of `expr` but leave the root itself
    /// unwrapped, so the caller can bind it under a name of its choosing.
    ///
    /// A terminal root has no operands; it is deduplicated as a whole.
    pub fn dedup_operands(&mut self, expr: &Expr) -> Expr {
        match expr.node() {
            Node::Constant(_) | Node::Variable(_) | Node::Binding { .. } => self.dedup(expr),
            _ => self.canonical_children(expr),
        }
    }

    fn canonical_children(&mut self, expr: &Expr) -> Expr {
        let rebuilt: Result<Expr, std::convert::Infallible> =
            expr.try_map_children(|child| Ok(self.dedup(child)));
        match rebuilt {
            Ok(expr) => expr,
            Err(never) => match never {},
        }
    }

    /// Look `node` up by shape; register it (wrapped when `wrap` says so)
    /// if this is the first time it is seen.
    fn intern(&mut self, node: Expr, wrap: impl Fn(&Expr) -> bool) -> Expr {
        let key: Key = (
            node.kind(),
            node.children().into_iter().map(Expr::as_ptr).collect(),
        );
        if let Some(existing) = self.table.get(&key) {
            return existing.clone();
        }
        let canonical = if wrap(&node) {
            let name = self.next_name();
            self.created += 1;
            log::trace!("cse: {name} = {node}");
            Expr::bind(name, node)
        } else {
            node
        };
        self.table.insert(key, canonical.clone());
        canonical
    }

    fn next_name(&mut self) -> String {
        loop {
            let name = format!("{}{}", self.prefix, self.counter);
            self.counter += 1;
            if !self.reserved.contains(&name) {
                return name;
            }
        }
    }
}
