// Dweve xmlchunk - Bounded-memory XML Element Extraction
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! xmlchunk Command Line Interface

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use xmlchunk_cli::cli::Commands;

/// xmlchunk - split large XML documents into fundamental elements
///
/// Reads the input in fixed-size chunks, so memory use stays bounded no matter
/// how large the document is.
///
/// # Examples
///
/// ```bash
/// # Print every <product> element on its own line
/// xmlchunk split catalog.xml --tag product
///
/// # Write each <product> to its own file
/// xmlchunk split catalog.xml --tag product --output-dir products/
///
/// # Count <product> elements, reading 64 KiB at a time
/// xmlchunk count catalog.xml --tag product --chunk-size 65536
/// ```
#[derive(Parser)]
#[command(name = "xmlchunk")]
#[command(author, version, about = "xmlchunk - bounded-memory XML element extraction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout carries fragments only.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("xmlchunk=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
