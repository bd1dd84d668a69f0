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

//! CLI command implementations

mod count;
mod split;

pub use count::count;
pub use split::{fragment_file_name, split};

use crate::error::CliError;
use clap::Args;
use std::fs::File;
use std::path::{Path, PathBuf};
use xmlchunk::{ChunkerConfig, ChunkerError, XmlChunker};

/// Environment variable holding the chunk size used when `--chunk-size` is
/// not given.
pub const CHUNK_SIZE_ENV: &str = "XMLCHUNK_CHUNK_SIZE";

/// Input options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct ChunkOptions {
    /// Input XML file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Name of the fundamental element to extract
    #[arg(short, long, value_name = "NAME")]
    pub tag: String,

    /// Bytes read per chunk [default: $XMLCHUNK_CHUNK_SIZE or 1048576]
    #[arg(short, long, value_name = "BYTES")]
    pub chunk_size: Option<usize>,

    /// Entity to declare in the DOCTYPE (repeatable)
    #[arg(short, long = "entity", value_name = "NAME=VALUE")]
    pub entities: Vec<String>,
}

/// Get the chunk size from the environment, if set to a valid number.
fn chunk_size_from_env() -> Option<usize> {
    std::env::var(CHUNK_SIZE_ENV)
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
}

/// Split a `NAME=VALUE` argument. The value may itself contain `=`.
///
/// # Examples
///
/// ```
/// use xmlchunk_cli::commands::parse_entity;
///
/// assert_eq!(
///     parse_entity("eq=a=b").unwrap(),
///     ("eq".to_string(), "a=b".to_string())
/// );
/// assert!(parse_entity("novalue").is_err());
/// ```
pub fn parse_entity(arg: &str) -> Result<(String, String), CliError> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(CliError::invalid_input(format!(
            "entity '{}' must have the form NAME=VALUE",
            arg
        ))),
    }
}

/// Build the chunker configuration for `options`.
///
/// `--chunk-size` wins over `XMLCHUNK_CHUNK_SIZE`, which wins over the
/// library default.
pub fn chunk_config(options: &ChunkOptions) -> Result<ChunkerConfig, CliError> {
    let entities = options
        .entities
        .iter()
        .map(|arg| parse_entity(arg))
        .collect::<Result<Vec<_>, _>>()?;

    let mut config = ChunkerConfig::new(options.tag.as_str())?;
    if let Some(size) = options.chunk_size.or_else(chunk_size_from_env) {
        config.set_chunk_size(size)?;
    }
    for (name, value) in entities {
        config.add_entity(name, value)?;
    }
    Ok(config)
}

/// Open the input document. Failure is reported as a configuration error,
/// the same way [`XmlChunker::open`] reports it.
pub fn open_input(path: &Path) -> Result<File, CliError> {
    File::open(path).map_err(|e| {
        ChunkerError::config(format!("cannot open {}: {}", path.display(), e)).into()
    })
}

/// Build a chunker reading `options.file`.
pub fn open_chunker(options: &ChunkOptions) -> Result<XmlChunker<File>, CliError> {
    let config = chunk_config(options)?;
    Ok(XmlChunker::with_config(open_input(&options.file)?, config))
}
