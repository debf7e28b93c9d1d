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

use std::fmt::Write;

use crate::ir::{Function, Instr, Program};

/// Format a [`Function`] into a stable, human-readable string.
pub fn format_function(function: &Function) -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "fn {}({}) {{",
        function.name(),
        function.args().join(", ")
    )
    .expect("write to string cannot fail");
    for statement in function.statements() {
        let name = statement.binding_name().unwrap_or("?");
        let written = match statement.bound_expr() {
            Some(value) => writeln!(&mut out, "  {name} = {value}"),
            None => writeln!(&mut out, "  ? = {statement}"),
        };
        written.expect("write to string cannot fail");
    }
    let result = function
        .result()
        .and_then(|stmt| stmt.binding_name())
        .unwrap_or("<none>");
    writeln!(&mut out, "}}  // result = {result}").expect("write to string cannot fail");
    out
}

/// Format a [`Program`] as an instruction listing (not C++).
pub fn format_program(program: &Program) -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "program {}({}) {{",
        program.name,
        program.args.join(", ")
    )
    .expect("write to string cannot fail");
    for (idx, instr) in program.body.iter().enumerate() {
        format_instr(idx, instr, &mut out);
    }
    writeln!(&mut out, "}}").expect("write to string cannot fail");
    out
}

fn format_instr(idx: usize, instr: &Instr, out: &mut String) {
    let written = match instr {
        Instr::Declare { name, value } => writeln!(out, "  {idx:>4}  let {name} = {value}"),
        Instr::Comment(text) => writeln!(out, "  {idx:>4}  # {text}"),
        Instr::WriteOutput { arg, value } => writeln!(out, "  {idx:>4}  out d_{arg} = {value}"),
        Instr::Return(value) => writeln!(out, "  {idx:>4}  ret {value}"),
    };
    written.expect("write to string cannot fail");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;

    #[test]
    fn function_listing_is_stable() {
        let mut f = Function::new("sq");
        let x = f.add_argument("x");
        f.add_statement("y", Expr::product(x.clone(), x));
        assert_eq!(
            format_function(&f),
            "fn sq(x) {\n  y = ((x)*(x))\n}  // result = y\n"
        );
    }

    #[test]
    fn program_listing_numbers_instructions() {
        let mut p = Program::new("sq", vec!["x".into()]);
        p.push(Instr::Return(Expr::var("x")));
        assert_eq!(format_program(&p), "program sq(x) {\n     0  ret x\n}\n");
    }
}
