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

//! Count command - number of fundamental elements in a document

use super::{open_chunker, ChunkOptions};
use crate::error::CliError;

/// Print the number of fundamental elements in `options.file` to stdout.
///
/// # Errors
///
/// Returns `Err` if the input cannot be opened or is not well-formed.
pub fn count(options: &ChunkOptions) -> Result<(), CliError> {
    let summary = open_chunker(options)?.for_each_fragment(|_| {})?;
    println!("{}", summary.fragments);
    Ok(())
}
