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

use crate::eval::{bind_inputs, Bindings, EvalError, Evaluator};
use crate::ir::{Instr, Program};

/// Value and partials produced by running a program.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    /// One partial per argument, in argument order. Empty for value-only
    /// programs.
    pub gradient: Vec<f64>,
}

/// Execute `program` the way the emitted C++ would: names are read from
/// earlier declarations only, never recomputed.
pub fn run_program(program: &Program, inputs: &[f64]) -> Result<Evaluation, EvalError> {
    let mut env = bind_inputs(&program.args, inputs)?;
    let mut slots: Vec<Option<f64>> = vec![None; program.args.len()];

    for instr in &program.body {
        match instr {
            Instr::Declare { name, value } => {
                let computed = Evaluator::new(&env, Bindings::Lookup).eval(value)?;
                env.insert(name.clone(), computed);
            }
            Instr::Comment(_) => {}
            Instr::WriteOutput { arg, value } => {
                let idx = program
                    .args
                    .iter()
                    .position(|candidate| candidate == arg)
                    .ok_or_else(|| EvalError::UnknownOutput(arg.clone()))?;
                slots[idx] = Some(Evaluator::new(&env, Bindings::Lookup).eval(value)?);
            }
            Instr::Return(value) => {
                let value = Evaluator::new(&env, Bindings::Lookup).eval(value)?;
                let gradient = if program.partials {
                    collect_slots(program, slots)?
                } else {
                    Vec::new()
                };
                return Ok(Evaluation { value, gradient });
            }
        }
    }
    Err(EvalError::MissingReturn)
}

fn collect_slots(program: &Program, slots: Vec<Option<f64>>) -> Result<Vec<f64>, EvalError> {
    program
        .args
        .iter()
        .zip(slots)
        .map(|(arg, slot)| slot.ok_or_else(|| EvalError::UnwrittenOutput(arg.clone())))
        .collect()
}
