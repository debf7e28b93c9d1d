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

use std::collections::BTreeSet;

use crate::expr::{collect_binding_dependencies, free_variables, Expr};
use crate::ir::{Function, Instr, Program};

/// Structured errors returned by the function and program verifiers.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IrVerifyError {
    /// The function has no statements, so it has no result.
    #[error("function '{0}' has no statements")]
    EmptyFunction(String),
    /// A name cannot be emitted as a C++ identifier.
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("argument '{0}' is declared twice")]
    DuplicateArgument(String),
    /// Two statements (or a statement and an argument) share a name.
    #[error("duplicate definition of '{0}'")]
    DuplicateDefinition(String),
    /// A statement slot holds something other than a binding.
    #[error("statement {index} is not a binding")]
    NotABinding { index: usize },
    /// A statement reads an undeclared variable or a later statement.
    #[error("statement '{statement}' depends on undeclared '{name}'")]
    UnresolvedDependency { name: String, statement: String },
    /// An instruction reads a name that no earlier instruction declared.
    #[error("use of undeclared '{name}' at instruction {instr_index}")]
    UseBeforeDeclaration { name: String, instr_index: usize },
    #[error("output slot for unknown argument '{0}'")]
    UnknownOutput(String),
    #[error("output slot d_{0} is written more than once")]
    OutputWrittenTwice(String),
    #[error("output slot d_{0} is never written")]
    MissingOutput(String),
    #[error("program has no return instruction")]
    MissingReturn,
    #[error("instruction {instr_index} follows the return")]
    CodeAfterReturn { instr_index: usize },
}

/// Verify that a [`Function`] is well-formed.
///
/// Names are valid identifiers and unique across arguments and statements;
/// every statement only reads arguments and earlier statements.
pub fn verify_function(function: &Function) -> Result<(), IrVerifyError> {
    if function.statements().is_empty() {
        return Err(IrVerifyError::EmptyFunction(function.name().to_string()));
    }
    check_identifier(function.name())?;

    let args: BTreeSet<&str> = function.args().iter().map(String::as_str).collect();
    let mut seen_args = BTreeSet::new();
    for arg in function.args() {
        check_identifier(arg)?;
        if !seen_args.insert(arg.as_str()) {
            return Err(IrVerifyError::DuplicateArgument(arg.clone()));
        }
    }

    let mut defined: BTreeSet<String> = BTreeSet::new();
    for (index, statement) in function.statements().iter().enumerate() {
        let name = statement
            .binding_name()
            .ok_or(IrVerifyError::NotABinding { index })?;
        check_identifier(name)?;

        for dep in collect_binding_dependencies(statement) {
            let dep_name = dep.binding_name().unwrap_or_default();
            if !defined.contains(dep_name) {
                return Err(IrVerifyError::UnresolvedDependency {
                    name: dep_name.to_string(),
                    statement: name.to_string(),
                });
            }
        }
        for var in free_variables(statement) {
            if !args.contains(var.as_str()) {
                return Err(IrVerifyError::UnresolvedDependency {
                    name: var,
                    statement: name.to_string(),
                });
            }
        }

        if args.contains(name) || !defined.insert(name.to_string()) {
            return Err(IrVerifyError::DuplicateDefinition(name.to_string()));
        }
    }
    Ok(())
}

/// Verify that a [`Program`] only reads declared names, writes each output
/// slot exactly once and ends in a return.
pub fn verify_program(program: &Program) -> Result<(), IrVerifyError> {
    let mut declared: BTreeSet<String> = BTreeSet::new();
    for arg in &program.args {
        check_identifier(arg)?;
        if !declared.insert(arg.clone()) {
            return Err(IrVerifyError::DuplicateArgument(arg.clone()));
        }
    }
    let mut written: BTreeSet<&str> = BTreeSet::new();
    let mut returned = false;

    for (instr_index, instr) in program.body.iter().enumerate() {
        if returned {
            return Err(IrVerifyError::CodeAfterReturn { instr_index });
        }
        match instr {
            Instr::Declare { name, value } => {
                check_reads(value, &declared, instr_index)?;
                check_identifier(name)?;
                if !declared.insert(name.clone()) {
                    return Err(IrVerifyError::DuplicateDefinition(name.clone()));
                }
            }
            Instr::Comment(_) => {}
            Instr::WriteOutput { arg, value } => {
                check_reads(value, &declared, instr_index)?;
                if !program.partials || !program.args.contains(arg) {
                    return Err(IrVerifyError::UnknownOutput(arg.clone()));
                }
                if !written.insert(arg.as_str()) {
                    return Err(IrVerifyError::OutputWrittenTwice(arg.clone()));
                }
            }
            Instr::Return(value) => {
                check_reads(value, &declared, instr_index)?;
                returned = true;
            }
        }
    }

    if !returned {
        return Err(IrVerifyError::MissingReturn);
    }
    if !program.partials {
        return Ok(());
    }
    if let Some(missing) = program
        .args
        .iter()
        .find(|arg| !written.contains(arg.as_str()))
    {
        return Err(IrVerifyError::MissingOutput(missing.clone()));
    }
    Ok(())
}

/// Every name `value` reads when rendered.
fn read_names(value: &Expr) -> Vec<String> {
    if let Some(name) = value.binding_name() {
        return vec![name.to_string()];
    }
    let mut names: Vec<String> = collect_binding_dependencies(value)
        .iter()
        .filter_map(|dep| dep.binding_name().map(str::to_string))
        .collect();
    names.extend(free_variables(value));
    names
}

fn check_reads(
    value: &Expr,
    declared: &BTreeSet<String>,
    instr_index: usize,
) -> Result<(), IrVerifyError> {
    match read_names(value)
        .into_iter()
        .find(|name| !declared.contains(name))
    {
        Some(name) => Err(IrVerifyError::UseBeforeDeclaration { name, instr_index }),
        None => Ok(()),
    }
}

fn check_identifier(name: &str) -> Result<(), IrVerifyError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(IrVerifyError::InvalidIdentifier(name.to_string()))
    }
}
