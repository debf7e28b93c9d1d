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

//! Graphviz rendering of a dependency graph.
//!
//! Each statement is a record with three fields: its value, its forward
//! tangent `D[name]` and its reverse adjoint `B[name]`, written in terms of
//! the neighbouring statements. Blue edges carry the local partial used by
//! forward mode, red edges the one used by reverse mode.

use std::fmt::Write;

use crate::expr::Expr;
use crate::opt::ConstantFolder;

use super::{DependencyGraph, GraphError, NodeId};

pub fn to_dot(graph: &DependencyGraph) -> Result<String, GraphError> {
    let mut folder = ConstantFolder::new();
    let mut nodes = String::new();
    let mut edges = String::new();
    // Rank 0 holds every statement without dependencies; each other
    // statement gets its own rank, in declaration order.
    let mut ranks: Vec<Vec<&str>> = vec![Vec::new()];

    for (id, node) in graph.nodes() {
        let name = node.name();
        if node.dependencies().is_empty() {
            ranks[0].push(name);
        } else {
            ranks.push(vec![name]);
        }

        let mut label = format!("<expr>{name} = {}", node.value());

        label.push_str(&format!("|<diff>D[{name}]"));
        if !node.dependencies().is_empty() {
            let mut terms = Vec::new();
            for &dep in node.dependencies() {
                let dep_name = graph.node(dep).name();
                let partial = folder.fold(&node.value().diff(dep_name)?)?;
                terms.push(Expr::product(partial.clone(), Expr::var(format!("D[{dep_name}]"))));
                writeln!(
                    &mut edges,
                    "{dep_name}:diff -> {name}:diff [color=blue,label=\"{}\"];",
                    escape_label(&partial.to_string())
                )
                .expect("write to string cannot fail");
            }
            label.push_str(&format!(" = {}", folder.fold(&sum_all(terms))?));
        }

        label.push_str(&format!("|<bdiff>B[{name}]"));
        if !node.dependents().is_empty() {
            let mut terms = Vec::new();
            for &child in node.dependents() {
                let child_name = graph.node(child).name();
                let partial = folder.fold(&local_partial(graph, child, name)?)?;
                terms.push(Expr::product(partial.clone(), Expr::var(format!("B[{child_name}]"))));
                writeln!(
                    &mut edges,
                    "{child_name}:bdiff -> {name}:bdiff [color=red,label=\"{}\"];",
                    escape_label(&partial.to_string())
                )
                .expect("write to string cannot fail");
            }
            label.push_str(&format!(" = {}", folder.fold(&sum_all(terms))?));
        }

        writeln!(
            &mut nodes,
            "{name}[shape=record, label=\"{}\"];",
            escape_record(&label)
        )
        .expect("write to string cannot fail");
        log::trace!("dot: emitted node {}", id.0);
    }

    let mut out = String::from("digraph{\n");
    out.push_str(&nodes);
    out.push_str(&edges);
    out.push_str("node [shape = none];\n");
    let chain: Vec<String> = (0..ranks.len()).map(|idx| idx.to_string()).collect();
    writeln!(&mut out, "{}[arrowhead=none,shape=none]", chain.join("->"))
        .expect("write to string cannot fail");
    for (idx, names) in ranks.iter().enumerate() {
        let mut members = idx.to_string();
        for name in names {
            members.push(',');
            members.push_str(name);
        }
        writeln!(&mut out, "{{rank=same;{members}}}").expect("write to string cannot fail");
    }
    out.push_str("}\n");
    Ok(out)
}

fn local_partial(graph: &DependencyGraph, of: NodeId, wrt: &str) -> Result<Expr, GraphError> {
    Ok(graph.node(of).value().diff(wrt)?)
}

fn sum_all(terms: Vec<Expr>) -> Expr {
    terms
        .into_iter()
        .reduce(Expr::sum)
        .unwrap_or_else(Expr::zero)
}

/// Escape text placed inside a quoted edge label.
fn escape_label(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape a record label, keeping the `|` field separators and `<port>`
/// markers this module inserts itself.
fn escape_record(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_port = false;
    let mut field_start = true;
    for c in label.chars() {
        match c {
            '|' if !in_port => {
                field_start = true;
                out.push(c);
                continue;
            }
            '<' if field_start => in_port = true,
            '>' if in_port => in_port = false,
            '<' | '>' | '{' | '}' | '"' | '\\' => out.push('\\'),
            _ => {}
        }
        field_start = false;
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_records_and_edges() {
        let x = Expr::var("x");
        let a = Expr::bind("a", Expr::product(x.clone(), x));
        let b = Expr::bind("b", Expr::call(crate::expr::Elementary::Exp, a.clone()));
        let graph = DependencyGraph::build(&[a, b]).unwrap();
        let dot = to_dot(&graph).unwrap();
        assert!(dot.starts_with("digraph{\n"));
        assert!(dot.contains("a:diff -> b:diff [color=blue,label=\"std::exp(a)\"];"));
        assert!(dot.contains("b:bdiff -> a:bdiff [color=red"));
        assert!(dot.contains("{rank=same;0,a}"));
        assert!(dot.contains("{rank=same;1,b}"));
    }

    #[test]
    fn record_escaping_keeps_ports() {
        assert_eq!(escape_record("<expr>a = {b}|<diff>c"), "<expr>a = \\{b\\}|<diff>c");
    }
}
