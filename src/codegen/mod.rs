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

//! C++ source emission for instruction programs.
//!
//! The emitted function has the shape
//!
//! ```text
//! double f(double x, double* d_x, double y, double* d_y)
//! {
//!     double w0 = x;
//!     ...
//!     *d_x = __rev_ad_w0;
//!     return f;
//! }
//! ```
//!
//! Instructions are rendered in order, one per line.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::ir::{Instr, Program};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EmitOptions {
    /// Spaces per indentation level inside the function body.
    #[serde(default = "default_indent")]
    pub indent: usize,
    /// Declare locals as `double const`.
    #[serde(default)]
    pub const_locals: bool,
    /// Prepend the `#include` lines the body needs.
    #[serde(default)]
    pub preamble: bool,
}

fn default_indent() -> usize {
    4
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            const_locals: false,
            preamble: false,
        }
    }
}

/// Pointer parameter receiving the partial for `arg`.
pub fn output_slot(arg: &str) -> String {
    format!("d_{arg}")
}

pub fn emit_program(program: &Program, options: &EmitOptions) -> String {
    let mut out = String::new();
    if options.preamble {
        out.push_str("#include <cmath>\n#include <limits>\n\n");
    }
    let params: Vec<String> = program
        .args
        .iter()
        .map(|arg| {
            if program.partials {
                format!("double {arg}, double* {}", output_slot(arg))
            } else {
                format!("double {arg}")
            }
        })
        .collect();
    writeln!(&mut out, "double {}({})", program.name, params.join(", "))
        .expect("write to string cannot fail");
    out.push_str("{\n");

    let pad = " ".repeat(options.indent);
    let local = if options.const_locals {
        "double const"
    } else {
        "double"
    };
    for instr in &program.body {
        let written = match instr {
            Instr::Declare { name, value } => writeln!(&mut out, "{pad}{local} {name} = {value};"),
            Instr::Comment(text) => writeln!(&mut out, "{pad}// {text}"),
            Instr::WriteOutput { arg, value } => {
                writeln!(&mut out, "{pad}*{} = {value};", output_slot(arg))
            }
            Instr::Return(value) => writeln!(&mut out, "{pad}return {value};"),
        };
        written.expect("write to string cannot fail");
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;

    fn square_program() -> Program {
        let x = Expr::var("x");
        let y = Expr::bind("y", Expr::product(x.clone(), x.clone()));
        let mut program = Program::new("square", vec!["x".into()]);
        program.declare(&y);
        program.push(Instr::WriteOutput {
            arg: "x".into(),
            value: Expr::product(Expr::constant(2.0), x),
        });
        program.push(Instr::Return(y));
        program
    }

    #[test]
    fn emits_signature_and_body_in_order() {
        let text = emit_program(&square_program(), &EmitOptions::default());
        assert_eq!(
            text,
            "double square(double x, double* d_x)\n{\n    double y = ((x)*(x));\n    *d_x = ((2.0)*(x));\n    return y;\n}\n"
        );
    }

    #[test]
    fn options_change_layout_only() {
        let options = EmitOptions {
            indent: 2,
            const_locals: true,
            preamble: true,
        };
        let text = emit_program(&square_program(), &options);
        assert!(text.starts_with("#include <cmath>\n#include <limits>\n\ndouble square("));
        assert!(text.contains("\n  double const y = ((x)*(x));\n"));
    }
}
