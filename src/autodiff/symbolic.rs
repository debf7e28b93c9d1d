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

use crate::config::Naming;
use crate::graph::GraphError;
use crate::ir::{Function, Program};
use crate::opt::{inline, Deduplicator};

use super::engine::{AutodiffError, ProgramBuilder};

/// Total derivative of the inlined result per input, all partials and the
/// value sharing one CSE table.
pub(super) fn differentiate(
    function: &Function,
    naming: &Naming,
) -> Result<Program, AutodiffError> {
    let result = function.result().ok_or(GraphError::Empty)?;
    let flat = inline(result);
    let mut builder = ProgramBuilder::new(function);
    let mut cse = Deduplicator::new(naming.symbol_prefix.as_str());
    for name in builder.reserved() {
        cse.reserve(name);
    }

    let args = builder.args().to_vec();
    for arg in &args {
        let derivative = flat.diff(arg)?;
        let folded = builder.folder().fold(derivative.as_expr())?;
        let head = cse.dedup(&folded);
        let added = builder.declare_reachable(&head)?;
        log::trace!("symbolic: d/d{arg} needed {added} new declaration(s)");
        builder.write_output(arg, head);
    }

    let value = builder.folder().fold(flat.as_expr())?;
    let head = cse.dedup(&value);
    builder.declare_reachable(&head)?;
    log::debug!(
        "symbolic: {} shared binding(s) for {} input(s)",
        cse.bindings_created(),
        args.len()
    );
    Ok(builder.finish(head))
}
