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

//! CLI command definitions and argument parsing.

use crate::commands::{self, ChunkOptions};
use crate::error::CliError;
use clap::Subcommand;
use std::path::PathBuf;

/// Top-level CLI commands.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use xmlchunk_cli::cli::Commands;
///
/// #[derive(Parser)]
/// struct Cli {
///     #[command(subcommand)]
///     command: Commands,
/// }
/// ```
#[derive(Subcommand)]
pub enum Commands {
    /// Extract every fundamental element
    ///
    /// Prints each element on its own line, or writes each one to
    /// `<DIR>/<tag>_<n>.xml` when `--output-dir` is given.
    Split {
        #[command(flatten)]
        options: ChunkOptions,

        /// Directory to write one file per element into
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Count fundamental elements
    Count {
        #[command(flatten)]
        options: ChunkOptions,
    },
}

impl Commands {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - An `--entity` argument is malformed
    /// - The input cannot be opened or read
    /// - The document is not well-formed or fundamental elements nest
    /// - An output file cannot be written
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            Commands::Split {
                options,
                output_dir,
            } => commands::split(&options, output_dir.as_deref()),
            Commands::Count { options } => commands::count(&options),
        }
    }
}
