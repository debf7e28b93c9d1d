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

//! Statement lists and instruction programs.
//!
//! A [`Function`] is what the user builds: named inputs plus an ordered
//! list of bindings, the last of which is the result. A [`Program`] is what
//! the AD drivers produce: a straight-line instruction sequence that the
//! code emitter renders one instruction per line.

use std::fmt;

use crate::expr::{Expr, ExprError};

pub mod print;
pub mod verify;

pub use print::{format_function, format_program};
pub use verify::{verify_function, verify_program, IrVerifyError};

#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    args: Vec<String>,
    statements: Vec<Expr>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            statements: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn statements(&self) -> &[Expr] {
        &self.statements
    }

    /// Declare an input and return the variable that reads it.
    pub fn add_argument(&mut self, name: impl Into<String>) -> Expr {
        let name = name.into();
        let var = Expr::var(name.clone());
        self.args.push(name);
        var
    }

    /// Append an already built binding.
    pub fn push_statement(&mut self, binding: Expr) -> Result<Expr, ExprError> {
        if !binding.is_binding() {
            return Err(ExprError::NotABinding(binding.kind().label().to_string()));
        }
        self.statements.push(binding.clone());
        Ok(binding)
    }

    /// Bind `expr` under `name` and append it. The returned handle is what
    /// later statements use to refer to this one.
    pub fn add_statement(&mut self, name: impl Into<String>, expr: Expr) -> Expr {
        let binding = Expr::bind(name, expr);
        self.statements.push(binding.clone());
        binding
    }

    /// The final statement, which is the function's value.
    pub fn result(&self) -> Option<&Expr> {
        self.statements.last()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_function(self))
    }
}

#[derive(Debug, Clone)]
pub enum Instr {
    /// `double name = value;`
    Declare { name: String, value: Expr },
    Comment(String),
    /// `*d_arg = value;`
    WriteOutput { arg: String, value: Expr },
    Return(Expr),
}

impl Instr {
    /// Declaration of a binding under its own name. `None` for anything
    /// that is not a binding.
    pub fn declare(binding: &Expr) -> Option<Instr> {
        let name = binding.binding_name()?;
        let value = binding.bound_expr()?;
        Some(Instr::Declare {
            name: name.to_string(),
            value: value.clone(),
        })
    }

    /// Name this instruction introduces, if any.
    pub fn defines(&self) -> Option<&str> {
        match self {
            Instr::Declare { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Straight-line program computing a value and, unless built with
/// [`Program::value_only`], one partial per argument.
#[derive(Debug, Clone)]
pub struct Program {
    pub name: String,
    pub args: Vec<String>,
    /// Whether every argument has an output slot for its partial.
    pub partials: bool,
    pub body: Vec<Instr>,
}

impl Program {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
            partials: true,
            body: Vec::new(),
        }
    }

    /// A program that only computes the value; it has no output slots.
    pub fn value_only(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            partials: false,
            ..Self::new(name, args)
        }
    }

    pub fn push(&mut self, instr: Instr) {
        self.body.push(instr);
    }

    /// Push a declaration for `binding`. Non-bindings are ignored.
    pub fn declare(&mut self, binding: &Expr) {
        if let Some(instr) = Instr::declare(binding) {
            self.body.push(instr);
        }
    }

    pub fn declarations(&self) -> usize {
        self.body
            .iter()
            .filter(|instr| instr.defines().is_some())
            .count()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_program(self))
    }
}
