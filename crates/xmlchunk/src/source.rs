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

//! Fixed-size chunk reader.
//!
//! Reads the underlying stream in chunks of a configurable size and flags the
//! final one. The sequence is lazy, finite and not restartable.

use crate::config::{validate_chunk_size, DEFAULT_CHUNK_SIZE};
use crate::error::ChunkerResult;
use std::io::Read;
use tracing::debug;

/// One chunk of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Raw bytes of the chunk. Empty only for a final chunk.
    pub bytes: Vec<u8>,
    /// Whether this is the last chunk of the stream.
    pub is_last: bool,
}

/// Lazy reader producing [`Chunk`]s from a byte stream.
///
/// A chunk shorter than the configured size marks the end of the stream. When
/// the stream length is an exact multiple of the chunk size, an empty final
/// chunk is produced so the consumer still sees `is_last`.
///
/// # Examples
///
/// ```rust
/// use xmlchunk::ChunkSource;
/// use std::io::Cursor;
///
/// let mut source = ChunkSource::with_chunk_size(Cursor::new("abcdefg"), 3).unwrap();
///
/// let first = source.next_chunk().unwrap().unwrap();
/// assert_eq!(first.bytes, b"abc");
/// assert!(!first.is_last);
///
/// source.next_chunk().unwrap();
/// let last = source.next_chunk().unwrap().unwrap();
/// assert_eq!(last.bytes, b"g");
/// assert!(last.is_last);
///
/// assert_eq!(source.next_chunk().unwrap(), None);
/// ```
pub struct ChunkSource<R: Read> {
    reader: R,
    chunk_size: usize,
    bytes_read: u64,
    chunks_read: usize,
    exhausted: bool,
}

impl<R: Read> ChunkSource<R> {
    /// Create a source with the default chunk size.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            chunk_size: DEFAULT_CHUNK_SIZE,
            bytes_read: 0,
            chunks_read: 0,
            exhausted: false,
        }
    }

    /// Create a source with a specific chunk size. Zero is rejected.
    pub fn with_chunk_size(reader: R, chunk_size: usize) -> ChunkerResult<Self> {
        validate_chunk_size(chunk_size)?;
        let mut source = Self::new(reader);
        source.chunk_size = chunk_size;
        Ok(source)
    }

    /// Change the chunk size for chunks read from now on.
    pub fn set_chunk_size(&mut self, chunk_size: usize) -> ChunkerResult<()> {
        validate_chunk_size(chunk_size)?;
        self.chunk_size = chunk_size;
        Ok(())
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Total bytes read so far.
    #[inline]
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Number of chunks produced so far.
    #[inline]
    pub fn chunks_read(&self) -> usize {
        self.chunks_read
    }

    /// Read the next chunk, or `None` once the final chunk has been produced.
    pub fn next_chunk(&mut self) -> ChunkerResult<Option<Chunk>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut bytes = Vec::with_capacity(self.chunk_size);
        (&mut self.reader)
            .take(self.chunk_size as u64)
            .read_to_end(&mut bytes)?;

        let is_last = bytes.len() < self.chunk_size;
        if is_last {
            self.exhausted = true;
        }
        self.bytes_read += bytes.len() as u64;
        self.chunks_read += 1;

        debug!(
            chunk = self.chunks_read,
            len = bytes.len(),
            is_last,
            "read chunk"
        );

        Ok(Some(Chunk { bytes, is_last }))
    }
}

impl<R: Read> Iterator for ChunkSource<R> {
    type Item = ChunkerResult<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => None,
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChunkerError;
    use std::io::{self, Cursor};

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"))
        }
    }

    /// Hands out at most `step` bytes per read call.
    struct TrickleReader {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for TrickleReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    // ==================== Chunking ====================

    #[test]
    fn test_chunks_cover_input() {
        let source = ChunkSource::with_chunk_size(Cursor::new("0123456789"), 4).unwrap();
        let chunks: Vec<_> = source.collect::<Result<_, _>>().unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].bytes, b"0123");
        assert_eq!(chunks[1].bytes, b"4567");
        assert_eq!(chunks[2].bytes, b"89");
        assert!(!chunks[0].is_last);
        assert!(!chunks[1].is_last);
        assert!(chunks[2].is_last);
    }

    #[test]
    fn test_exact_multiple_yields_empty_final_chunk() {
        let source = ChunkSource::with_chunk_size(Cursor::new("abcdef"), 3).unwrap();
        let chunks: Vec<_> = source.collect::<Result<_, _>>().unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks[2].bytes.is_empty());
        assert!(chunks[2].is_last);
    }

    #[test]
    fn test_empty_input() {
        let mut source = ChunkSource::new(Cursor::new(""));
        let chunk = source.next_chunk().unwrap().unwrap();
        assert!(chunk.bytes.is_empty());
        assert!(chunk.is_last);
        assert_eq!(source.next_chunk().unwrap(), None);
    }

    #[test]
    fn test_short_reads_fill_chunks() {
        let reader = TrickleReader {
            data: b"hello world".to_vec(),
            pos: 0,
            step: 2,
        };
        let mut source = ChunkSource::with_chunk_size(reader, 5).unwrap();
        let first = source.next_chunk().unwrap().unwrap();
        assert_eq!(first.bytes, b"hello");
        assert!(!first.is_last);
    }

    #[test]
    fn test_counters() {
        let mut source = ChunkSource::with_chunk_size(Cursor::new("abcdefg"), 3).unwrap();
        while source.next_chunk().unwrap().is_some() {}
        assert_eq!(source.bytes_read(), 7);
        assert_eq!(source.chunks_read(), 3);
    }

    // ==================== Configuration ====================

    #[test]
    fn test_zero_chunk_size_rejected_at_construction() {
        let result = ChunkSource::with_chunk_size(Cursor::new("abc"), 0);
        assert!(matches!(result, Err(ChunkerError::Configuration(_))));
    }

    #[test]
    fn test_set_chunk_size_affects_later_reads() {
        let mut source = ChunkSource::with_chunk_size(Cursor::new("abcdefghij"), 2).unwrap();
        assert_eq!(source.next_chunk().unwrap().unwrap().bytes, b"ab");
        source.set_chunk_size(5).unwrap();
        assert_eq!(source.next_chunk().unwrap().unwrap().bytes, b"cdefg");
        assert!(source.set_chunk_size(0).is_err());
        assert_eq!(source.chunk_size(), 5);
    }

    // ==================== Errors ====================

    #[test]
    fn test_read_failure_is_io_error() {
        let mut source = ChunkSource::new(FailingReader);
        assert!(matches!(source.next(), Some(Err(ChunkerError::Io(_)))));
        assert!(source.next().is_none());
    }
}
