// Copyright 2023 RisingWave Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Runner of the lookup script `lookup.out`.
//!
//! ```text
//! document <json>
//! lookup <path>
//! <expected json>
//! lookup <path>
//! ERROR:  <expected error message>
//! ```
//!
//! A `document` line applies to every `lookup` after it.

use std::str::FromStr;

use jsonpath_lookup::lookup;
use libtest_mimic::{Arguments, Failed, Trial};
use serde_json::Value;

fn main() {
    let args = Arguments::from_args();

    let tests = parse_script(include_str!("lookup.out"));

    libtest_mimic::run(&args, tests).exit();
}

fn parse_script(script: &'static str) -> Vec<Trial> {
    let mut tests = vec![];
    let mut document = "null";
    let mut lines = script
        .lines()
        .enumerate()
        // skip comments and blank lines
        .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with("-- "));
    while let Some((line_no, line)) = lines.next() {
        if let Some(json) = line.strip_prefix("document ") {
            document = json;
            continue;
        }
        let Some(path) = line.strip_prefix("lookup ") else {
            panic!("lookup.out:{}: unexpected line: {line}", line_no + 1);
        };
        let (_, expected) = lines.next().expect("eof");
        let expected = match expected.strip_prefix("ERROR:  ") {
            Some(msg) => Err(msg),
            None => Ok(expected),
        };
        tests.push(Trial::test(
            format!("lookup.out:{}", line_no + 1),
            move || test(document, path, expected),
        ));
    }
    tests
}

fn test(document: &str, path: &str, expected: Result<&str, &str>) -> Result<(), Failed> {
    let document = Value::from_str(document).map_err(|e| format!("invalid document: {e}"))?;
    match (lookup(&document, path), expected) {
        (Ok(actual), Ok(expected)) => {
            let expected =
                Value::from_str(expected).map_err(|e| format!("invalid expected value: {e}"))?;
            if actual == expected {
                Ok(())
            } else {
                Err(format!("expected: {expected}, got: {actual}").into())
            }
        }
        (Err(e), Err(msg)) if e.to_string().contains(msg) => Ok(()),
        (actual, expected) => Err(format!("expected: {expected:?}, got: {actual:?}").into()),
    }
}
