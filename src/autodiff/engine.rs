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

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::Naming;
use crate::expr::{depth_first_bindings_pruned, Expr, ExprError};
use crate::graph::GraphError;
use crate::ir::{verify_function, Function, Instr, IrVerifyError, Program};
use crate::opt::{ConstantFolder, FoldError};

use super::{forward, reverse, symbolic};

/// Propagation strategy used to compute the partials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// One tangent per (statement, input) pair, statements in order.
    Forward,
    /// One adjoint per statement of the fully deduplicated DAG.
    #[default]
    Reverse,
    /// Differentiate the inlined expression once per input, sharing
    /// subexpressions across all partials.
    Symbolic,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Forward => "forward",
            Mode::Reverse => "reverse",
            Mode::Symbolic => "symbolic",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = AutodiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Mode::Forward),
            "reverse" => Ok(Mode::Reverse),
            "symbolic" => Ok(Mode::Symbolic),
            other => Err(AutodiffError::UnknownMode(other.to_string())),
        }
    }
}

/// Errors returned by the AD drivers.
#[derive(Debug, thiserror::Error)]
pub enum AutodiffError {
    #[error("unknown differentiation mode '{0}' (expected forward, reverse or symbolic)")]
    UnknownMode(String),
    /// A statement reuses the name of an argument, an output slot or an
    /// earlier declaration.
    #[error("name '{0}' is already taken")]
    NameCollision(String),
    #[error(transparent)]
    Verify(#[from] IrVerifyError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Expr(#[from] ExprError),
    #[error(transparent)]
    Fold(#[from] FoldError),
}

/// Differentiate `function` with respect to all of its arguments.
///
/// The returned program declares the primal and derivative values, writes
/// one output slot per argument and returns the function's value.
pub fn differentiate(
    function: &Function,
    mode: Mode,
    naming: &Naming,
) -> Result<Program, AutodiffError> {
    verify_function(function)?;
    let program = match mode {
        Mode::Forward => forward::differentiate(function, naming)?,
        Mode::Reverse => reverse::differentiate(function, naming)?,
        Mode::Symbolic => symbolic::differentiate(function, naming)?,
    };
    log::debug!(
        "{mode} mode: {} declaration(s), {} instruction(s) for '{}'",
        program.declarations(),
        program.body.len(),
        function.name()
    );
    Ok(program)
}

/// Incrementally assembles a [`Program`], refusing duplicate names.
pub(super) struct ProgramBuilder {
    program: Program,
    declared: BTreeMap<String, Expr>,
    /// Arguments and output slots; never declarable.
    reserved: BTreeSet<String>,
    /// Names handed out or announced but possibly not declared yet.
    claimed: BTreeSet<String>,
    written: BTreeSet<String>,
    folder: ConstantFolder,
}

impl ProgramBuilder {
    pub(super) fn new(function: &Function) -> Self {
        let args = function.args().to_vec();
        let mut reserved: BTreeSet<String> = args.iter().cloned().collect();
        reserved.extend(args.iter().map(|arg| crate::codegen::output_slot(arg)));
        Self {
            program: Program::new(function.name(), args),
            declared: BTreeMap::new(),
            reserved,
            claimed: BTreeSet::new(),
            written: BTreeSet::new(),
            folder: ConstantFolder::new(),
        }
    }

    pub(super) fn args(&self) -> &[String] {
        &self.program.args
    }

    /// Names a generator must not hand out: arguments and output slots.
    pub(super) fn reserved(&self) -> impl Iterator<Item = &str> {
        self.reserved.iter().map(String::as_str)
    }

    /// Announce a name that will be declared later, so that
    /// [`fresh_name`](Self::fresh_name) avoids it.
    pub(super) fn claim(&mut self, name: &str) {
        self.claimed.insert(name.to_string());
    }

    /// `candidate`, or `candidate_<n>` for the smallest `n` that is free.
    /// The returned name is claimed.
    pub(super) fn fresh_name(&mut self, candidate: String) -> String {
        let mut name = candidate.clone();
        let mut suffix = 0;
        while self.is_taken(&name) {
            suffix += 1;
            name = format!("{candidate}_{suffix}");
        }
        if suffix > 0 {
            log::trace!("'{candidate}' is taken, using '{name}'");
        }
        self.claimed.insert(name.clone());
        name
    }

    fn is_taken(&self, name: &str) -> bool {
        self.reserved.contains(name)
            || self.declared.contains_key(name)
            || self.claimed.contains(name)
    }

    /// Declare `binding` under its own name.
    pub(super) fn declare(&mut self, binding: &Expr) -> Result<(), AutodiffError> {
        let name = binding
            .binding_name()
            .ok_or_else(|| ExprError::NotABinding(binding.kind().label().to_string()))?;
        if self.reserved.contains(name) || self.declared.contains_key(name) {
            return Err(AutodiffError::NameCollision(name.to_string()));
        }
        self.declared.insert(name.to_string(), binding.clone());
        if let Some(instr) = Instr::declare(binding) {
            self.program.push(instr);
        }
        Ok(())
    }

    /// Declare every binding `expr` reaches that is not declared yet,
    /// dependencies first. Returns how many were added.
    ///
    /// A binding whose name is already declared for a different node is a
    /// collision.
    pub(super) fn declare_reachable(&mut self, expr: &Expr) -> Result<usize, AutodiffError> {
        let pending = depth_first_bindings_pruned(expr, |binding| self.is_declared(binding));
        let mut added = 0;
        for binding in pending {
            if !self.is_declared(&binding) {
                self.declare(&binding)?;
                added += 1;
            }
        }
        Ok(added)
    }

    fn is_declared(&self, binding: &Expr) -> bool {
        binding
            .binding_name()
            .and_then(|name| self.declared.get(name))
            .is_some_and(|declared| declared.ptr_eq(binding))
    }

    pub(super) fn comment(&mut self, text: impl Into<String>) {
        self.program.push(Instr::Comment(text.into()));
    }

    pub(super) fn write_output(&mut self, arg: &str, value: Expr) {
        self.written.insert(arg.to_string());
        self.program.push(Instr::WriteOutput {
            arg: arg.to_string(),
            value,
        });
    }

    /// Write `0.0` to every slot not written yet, then return `value`.
    pub(super) fn finish(mut self, value: Expr) -> Program {
        let missing: Vec<String> = self
            .program
            .args
            .iter()
            .filter(|arg| !self.written.contains(*arg))
            .cloned()
            .collect();
        for arg in missing {
            log::trace!("no dependency on '{arg}', writing a zero partial");
            self.write_output(&arg, Expr::zero());
        }
        self.program.push(Instr::Return(value));
        self.program
    }

    pub(super) fn folder(&mut self) -> &mut ConstantFolder {
        &mut self.folder
    }
}
