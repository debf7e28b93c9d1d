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

use std::fs;
use std::process::Command;

fn cadyc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cadyc"))
}

#[test]
fn writes_cpp_to_stdout() {
    let output = cadyc()
        .args(["black_scholes", "--mode", "forward"])
        .output()
        .expect("failed to run cadyc");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("double black(double t, double* d_t"));
    assert!(stdout.contains("__diff_"));
}

#[test]
fn writes_to_the_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rosen.cpp");
    let status = cadyc()
        .args(["rosenbrock", "--dims", "3", "--output"])
        .arg(&path)
        .status()
        .expect("failed to run cadyc");
    assert!(status.success());
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("double rosenbrock(double x0, double* d_x0"));
    assert!(text.contains("*d_x2 = "));
}

#[test]
fn config_file_sets_the_mode() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("cady.toml");
    fs::write(&config, "mode = \"symbolic\"\n[emit]\npreamble = true\n").unwrap();
    let output = cadyc()
        .args(["black_scholes", "--config"])
        .arg(&config)
        .output()
        .expect("failed to run cadyc");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("#include <cmath>\n"));
    assert!(stdout.contains("__symbol_"));
}

#[test]
fn emits_ir_dot_and_value_only_code() {
    let ir = cadyc()
        .args(["black_scholes", "--emit-ir"])
        .output()
        .expect("failed to run cadyc");
    assert!(String::from_utf8(ir.stdout)
        .unwrap()
        .starts_with("program black(t, T, r, S, K, vol) {\n"));

    let dot = cadyc()
        .args(["black_scholes", "--emit-dot"])
        .output()
        .expect("failed to run cadyc");
    assert!(String::from_utf8(dot.stdout).unwrap().starts_with("digraph{\n"));

    let value = cadyc()
        .args(["black_scholes", "--value-only"])
        .output()
        .expect("failed to run cadyc");
    let text = String::from_utf8(value.stdout).unwrap();
    assert!(text.starts_with("double black(double t, double T,"));
    assert!(!text.contains("d_t"));
}

#[test]
fn print_config_round_trips() {
    let output = cadyc()
        .args(["black_scholes", "--mode", "forward", "--print-config"])
        .output()
        .expect("failed to run cadyc");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    let options = cady::GenerateOptions::from_toml_str(&text).unwrap();
    assert_eq!(options.mode, cady::Mode::Forward);
}

#[test]
fn bad_input_fails() {
    for args in [
        vec!["heston"],
        vec!["rosenbrock", "--dims", "1"],
        vec!["black_scholes", "--mode", "sideways"],
    ] {
        let output = cadyc().args(&args).output().expect("failed to run cadyc");
        assert!(!output.status.success(), "{args:?} should fail");
        assert!(!output.stderr.is_empty());
    }
}
