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

//! Split command - extract fundamental elements to stdout or to files

use super::{chunk_config, open_input, ChunkOptions};
use crate::error::CliError;
use std::cell::Cell;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use xmlchunk::{ChunkerConfig, ParseSummary, XmlChunker};

/// File name for the `index`-th (1-based) fragment of `tag`.
///
/// # Examples
///
/// ```
/// use xmlchunk_cli::commands::fragment_file_name;
///
/// assert_eq!(fragment_file_name("box", 7), "box_000007.xml");
/// ```
pub fn fragment_file_name(tag: &str, index: usize) -> String {
    format!("{}_{:06}.xml", tag, index)
}

/// Extract every fundamental element of `options.file`.
///
/// Without `output_dir`, each fragment is printed to stdout on its own line.
/// With it, the directory is created if needed and fragment `n` is written to
/// [`fragment_file_name`]`(tag, n)` inside it.
///
/// The first failed write ends the run: the rest of the input is not read.
///
/// # Errors
///
/// Returns `Err` if:
/// - The input cannot be opened or is not well-formed
/// - The output directory or a fragment file cannot be written
/// - Writing to stdout fails
pub fn split(options: &ChunkOptions, output_dir: Option<&Path>) -> Result<(), CliError> {
    let config = chunk_config(options)?;
    let input = open_input(&options.file)?;

    match output_dir {
        None => {
            let stdout = io::stdout();
            write_lines(input, config, &mut stdout.lock())?;
        }
        Some(dir) => {
            fs::create_dir_all(dir).map_err(|e| CliError::io_error(dir, e))?;
            let mut index = 0;
            let summary = extract(input, config, |fragment| {
                index += 1;
                let path: PathBuf = dir.join(fragment_file_name(&options.tag, index));
                fs::write(&path, fragment).map_err(|e| CliError::io_error(path, e))
            })?;
            info!(fragments = summary.fragments, dir = %dir.display(), "wrote fragments");
        }
    }

    Ok(())
}

/// Write each fragment of `input` to `out`, one per line.
fn write_lines<R: Read, W: Write>(
    input: R,
    config: ChunkerConfig,
    out: &mut W,
) -> Result<ParseSummary, CliError> {
    let summary = extract(input, config, |fragment| {
        writeln!(out, "{}", fragment).map_err(|e| CliError::io_error("<stdout>", e))
    })?;
    out.flush().map_err(|e| CliError::io_error("<stdout>", e))?;
    Ok(summary)
}

/// Run the chunker over `input`, handing each fragment to `write`.
///
/// After the first write error no further input is read, and that error is
/// returned instead of the read failure it causes.
fn extract<R, F>(input: R, config: ChunkerConfig, mut write: F) -> Result<ParseSummary, CliError>
where
    R: Read,
    F: FnMut(&str) -> Result<(), CliError>,
{
    let stopped = Cell::new(false);
    let chunker = XmlChunker::with_config(
        StopReader {
            inner: input,
            stopped: &stopped,
        },
        config,
    );

    let mut failure = None;
    let result = chunker.for_each_fragment(|fragment| {
        if failure.is_some() {
            return;
        }
        if let Err(e) = write(fragment) {
            failure = Some(e);
            stopped.set(true);
        }
    });

    match failure {
        Some(err) => Err(err),
        None => Ok(result?),
    }
}

/// Reader that fails every read once `stopped` is set.
struct StopReader<'a, R> {
    inner: R,
    stopped: &'a Cell<bool>,
}

impl<R: Read> Read for StopReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.stopped.get() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "output closed"));
        }
        self.inner.read(buf)
    }
}
