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

//! Static automatic differentiation of statement lists.
//!
//! All derivative code is built at generation time; nothing is taped at run
//! time. The entry point is [`differentiate`], which consumes a verified
//! [`Function`](crate::ir::Function) and produces a straight-line
//! [`Program`](crate::ir::Program) computing the value and every partial.
//!
//! Three drivers share the same chain-rule helpers:
//!
//! * [`Mode::Forward`] carries one tangent per statement and input over the
//!   user's own statements.
//! * [`Mode::Reverse`] deduplicates the inlined result into one statement per
//!   operation and carries one adjoint per statement back to the inputs.
//! * [`Mode::Symbolic`] differentiates the inlined result once per input and
//!   lets CSE share the work between partials.

mod engine;
mod forward;
mod reverse;
mod rules;
mod symbolic;

pub use engine::{differentiate, AutodiffError, Mode};
