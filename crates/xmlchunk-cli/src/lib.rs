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

//! xmlchunk CLI library for command-line parsing and execution.
//!
//! # Commands
//!
//! - **split**: Print each fundamental element, or write each to its own file
//! - **count**: Print the number of fundamental elements
//!
//! Both commands take the input file, the fundamental tag name, an optional
//! chunk size and any number of `--entity NAME=VALUE` declarations.
//!
//! # Examples
//!
//! ```no_run
//! use xmlchunk_cli::commands::{count, ChunkOptions};
//!
//! # fn main() -> Result<(), xmlchunk_cli::error::CliError> {
//! let options = ChunkOptions {
//!     file: "catalog.xml".into(),
//!     tag: "product".to_string(),
//!     chunk_size: Some(64 * 1024),
//!     entities: vec!["copy=(c)".to_string()],
//! };
//! count(&options)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! - `XMLCHUNK_CHUNK_SIZE`: chunk size in bytes when `--chunk-size` is absent
//! - `RUST_LOG`: log filter for diagnostics on stderr (default `xmlchunk=warn`)

pub mod cli;
pub mod commands;
pub mod error;
