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

//! Cady command-line generator: build a reference model, differentiate it
//! and write the C++ source, the instruction listing or a DOT graph.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use cady::ir::format_program;
use cady::models;
use cady::pipeline::{dependency_dot, generate, generate_value};
use cady::{GenerateOptions, Mode};

#[derive(Parser, Debug)]
#[command(author, version, about = None, long_about = None)]
struct Cli {
    /// Model to generate (black_scholes|rosenbrock).
    #[arg(value_name = "MODEL")]
    model: String,
    /// Differentiation mode (forward|reverse|symbolic). Overrides the config.
    #[arg(long, value_name = "MODE")]
    mode: Option<String>,
    /// TOML file with generation options.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Write the result here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Number of variables for models that take one.
    #[arg(long, value_name = "N", default_value_t = 2)]
    dims: usize,
    /// Print the instruction listing instead of C++.
    #[arg(long)]
    emit_ir: bool,
    /// Print the statement dependency graph in Graphviz format.
    #[arg(long, conflicts_with = "emit_ir")]
    emit_dot: bool,
    /// Only compute the value, without partials.
    #[arg(long)]
    value_only: bool,
    /// Print the effective options as TOML and exit.
    #[arg(long)]
    print_config: bool,
    /// More logging (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut options = match &cli.config {
        Some(path) => GenerateOptions::from_path(path)?,
        None => GenerateOptions::default(),
    };
    if let Some(mode) = &cli.mode {
        options = options.with_mode(mode.parse::<Mode>()?);
    }
    if cli.print_config {
        return write_output(cli.output.as_ref(), &options.to_toml()?);
    }

    let function = models::by_name(&cli.model, cli.dims)?;
    log::debug!(
        "model '{}' has {} argument(s) and {} statement(s)",
        cli.model,
        function.args().len(),
        function.statements().len()
    );

    let text = if cli.emit_dot {
        dependency_dot(&function)?
    } else {
        let products = if cli.value_only {
            generate_value(&function, &options.emit)?
        } else {
            generate(&function, &options)?
        };
        if cli.emit_ir {
            format_program(&products.program)
        } else {
            products.source
        }
    };
    write_output(cli.output.as_ref(), &text)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn write_output(path: Option<&PathBuf>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            print!("{text}");
            Ok(())
        }
    }
}
