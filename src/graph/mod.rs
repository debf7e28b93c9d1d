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

//! Statement dependency graph.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]; the id of a
//! statement is its position in the list the graph was built from, so
//! iterating ids in order is iterating statements in declaration order.

use rustc_hash::FxHashMap;

use crate::expr::{collect_binding_dependencies, depth_first_bindings, Expr, ExprError};
use crate::ir::{Instr, Program};
use crate::opt::FoldError;

pub mod dot;

pub use dot::to_dot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GraphError {
    /// A statement references a binding that was not declared before it.
    #[error("statement '{statement}' depends on undeclared '{name}'")]
    UnresolvedDependency { name: String, statement: String },
    #[error("statement '{0}' is declared twice")]
    DuplicateStatement(String),
    #[error("statement {index} is not a binding")]
    NotABinding { index: usize },
    #[error("graph has no statements")]
    Empty,
    #[error(transparent)]
    Expr(#[from] ExprError),
    #[error(transparent)]
    Fold(#[from] FoldError),
}

#[derive(Debug, Clone)]
pub struct GraphNode {
    binding: Expr,
    name: String,
    dependencies: Vec<NodeId>,
    dependents: Vec<NodeId>,
}

impl GraphNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The statement handle (a binding).
    pub fn binding(&self) -> &Expr {
        &self.binding
    }

    /// The expression the statement binds.
    pub fn value(&self) -> &Expr {
        // Only bindings are admitted into the graph.
        self.binding.bound_expr().unwrap_or(&self.binding)
    }

    /// Statements this one reads.
    pub fn dependencies(&self) -> &[NodeId] {
        &self.dependencies
    }

    /// Statements that read this one.
    pub fn dependents(&self) -> &[NodeId] {
        &self.dependents
    }

    /// True for a statement that only forwards an input variable.
    pub fn is_input_leaf(&self) -> bool {
        self.dependencies.is_empty() && self.value().variable_name().is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    index: FxHashMap<String, NodeId>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from statements in declaration order.
    pub fn build(statements: &[Expr]) -> Result<Self, GraphError> {
        let mut graph = DependencyGraph::new();
        for (index, statement) in statements.iter().enumerate() {
            if !statement.is_binding() {
                return Err(GraphError::NotABinding { index });
            }
            graph.add(statement)?;
        }
        log::debug!("dependency graph: {} statement(s)", graph.len());
        Ok(graph)
    }

    /// Build the graph of every binding reachable from `root`, root last.
    pub fn from_root(root: &Expr) -> Result<Self, GraphError> {
        Self::build(&depth_first_bindings(root))
    }

    /// Append one statement. Its dependencies must already be present.
    pub fn add(&mut self, binding: &Expr) -> Result<NodeId, GraphError> {
        let name = binding
            .binding_name()
            .ok_or(GraphError::NotABinding {
                index: self.nodes.len(),
            })?
            .to_string();
        if self.index.contains_key(&name) {
            return Err(GraphError::DuplicateStatement(name));
        }

        let mut dependencies = Vec::new();
        for dep in collect_binding_dependencies(binding) {
            let dep_name = dep.binding_name().unwrap_or_default();
            match self.index.get(dep_name) {
                Some(&id) => dependencies.push(id),
                None => {
                    return Err(GraphError::UnresolvedDependency {
                        name: dep_name.to_string(),
                        statement: name,
                    })
                }
            }
        }

        let id = NodeId(self.nodes.len());
        for &dep in &dependencies {
            self.nodes[dep.0].dependents.push(id);
        }
        self.index.insert(name.clone(), id);
        self.nodes.push(GraphNode {
            binding: binding.clone(),
            name,
            dependencies,
            dependents: Vec::new(),
        });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.0]
    }

    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Ids in declaration order.
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = NodeId> + ExactSizeIterator {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &GraphNode)> {
        self.nodes.iter().enumerate().map(|(idx, node)| (NodeId(idx), node))
    }

    /// Statements nothing else reads.
    pub fn sinks(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.dependents.is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    /// Plain (non-differentiated) evaluation: declare every statement in
    /// order, then annotate the last statement and return it.
    pub fn emit_instructions(&self, program: &mut Program) -> Result<(), GraphError> {
        let last = self.ids().next_back().ok_or(GraphError::Empty)?;
        for (_, node) in self.nodes() {
            program.declare(&node.binding);
        }
        let sink = self.node(last);
        let chain: Vec<String> = depth_first_bindings(&sink.binding)
            .iter()
            .filter_map(|b| b.binding_name().map(str::to_string))
            .collect();
        program.push(Instr::Comment(chain.join(" ")));
        program.push(Instr::Return(sink.binding.clone()));
        Ok(())
    }
}
