use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use itertools::Itertools;

use crate::context::Report;


const TESTCASES: usize = 6;

fn load_input_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<String>> {
    let source = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("reading {}", path.as_ref().display()))?;
    Ok(source.lines().map(str::to_owned).collect_vec())
}

fn load_output_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Report>> {
    let source = std::fs::read(path.as_ref())
        .with_context(|| format!("reading {}", path.as_ref().display()))?;
    let result: Vec<Report> = serde_json::from_slice(&source)?;
    Ok(result)
}

/// Pairs every line of `test_inputs/<n>.vp` with the matching entry of
/// `test_outputs/<n>.json`.
pub fn load_test_pair(testcase: usize) -> anyhow::Result<Vec<(String, Report)>> {
    if testcase < 1 || testcase > TESTCASES { bail!("Testcase out of bounds"); }

    let base_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let input = load_input_file(base_path.join("test_inputs").join(format!("{}.vp", testcase)))?;
    let output = load_output_file(base_path.join("test_outputs").join(format!("{}.json", testcase)))?;

    if input.len() != output.len() { bail!("Input and output of testcase {} does not match", testcase); }
    Ok(input.into_iter().zip(output).collect_vec())
}

pub fn all_testcases() -> impl Iterator<Item = usize> {
    1..=TESTCASES
}
