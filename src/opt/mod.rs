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

//! Rewrite passes over expression DAGs.
//!
//! Each pass owns its memo table, keyed by node identity, so a shared
//! sub-DAG is rewritten once and the sharing survives the rewrite.

pub mod cse;
pub mod fold;
pub mod inline;

pub use cse::Deduplicator;
pub use fold::{fold, ConstantFolder, FoldError};
pub use inline::{inline, Inliner};
