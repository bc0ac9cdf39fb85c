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

use std::io::{BufRead, Write};

use jsonpath_lookup::JsonPath;
use tracing_subscriber::EnvFilter;

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("json: ");
        std::io::stdout().flush()?;
        let Some(json) = lines.next().transpose()? else {
            return Ok(());
        };

        print!("path: ");
        std::io::stdout().flush()?;
        let Some(path) = lines.next().transpose()? else {
            return Ok(());
        };

        let json: serde_json::Value = match serde_json::from_str(&json) {
            Ok(json) => json,
            Err(err) => {
                println!("invalid json: {err}");
                continue;
            }
        };
        let path = match JsonPath::new(path.trim()) {
            Ok(path) => path,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        tracing::debug!(%path, "compiled");
        match path.lookup(&json) {
            Ok(value) => println!("{value:#}"),
            Err(err) => println!("{err}"),
        }
    }
}
