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

//! Fragment delivery.
//!
//! The reconstructor hands each finished fragment to a [`FragmentSink`].
//! [`Dispatcher`] is the sink used by [`XmlChunker`](crate::XmlChunker): it
//! calls the caller's handler with the fragment followed by a fixed list of
//! trailing arguments.
//!
//! # Example
//!
//! ```rust
//! use xmlchunk::{Dispatcher, FragmentSink};
//!
//! let mut seen = Vec::new();
//! {
//!     let mut dispatcher = Dispatcher::new(
//!         |fragment: &str, args: &[String]| seen.push(format!("{} {}", args[0], fragment)),
//!         vec!["crate-7".to_string()],
//!     );
//!     dispatcher.dispatch("<box/>");
//!     assert_eq!(dispatcher.dispatched(), 1);
//! }
//! assert_eq!(seen, vec!["crate-7 <box/>"]);
//! ```

/// Receiver of completed fragments, in document order.
pub trait FragmentSink {
    fn dispatch(&mut self, fragment: &str);
}

impl FragmentSink for Vec<String> {
    fn dispatch(&mut self, fragment: &str) {
        self.push(fragment.to_string());
    }
}

/// Invokes a handler with each fragment plus preconfigured trailing arguments.
///
/// The handler's signature fixes both invocability and arity at compile time,
/// so there is nothing left to validate when parsing starts.
pub struct Dispatcher<H, A> {
    handler: H,
    trailing: Vec<A>,
    dispatched: usize,
}

impl<H, A> Dispatcher<H, A>
where
    H: FnMut(&str, &[A]),
{
    pub fn new(handler: H, trailing: Vec<A>) -> Self {
        Self {
            handler,
            trailing,
            dispatched: 0,
        }
    }

    /// Number of fragments delivered so far.
    #[inline]
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Trailing arguments passed after each fragment.
    #[inline]
    pub fn trailing(&self) -> &[A] {
        &self.trailing
    }
}

impl<H, A> FragmentSink for Dispatcher<H, A>
where
    H: FnMut(&str, &[A]),
{
    fn dispatch(&mut self, fragment: &str) {
        (self.handler)(fragment, &self.trailing);
        self.dispatched += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_arguments_follow_fragment() {
        let mut calls: Vec<(String, Vec<i32>)> = Vec::new();
        {
            let mut dispatcher = Dispatcher::new(
                |fragment: &str, args: &[i32]| calls.push((fragment.to_string(), args.to_vec())),
                vec![1, 2, 3],
            );
            dispatcher.dispatch("<a></a>");
            dispatcher.dispatch("<b></b>");
            assert_eq!(dispatcher.dispatched(), 2);
            assert_eq!(dispatcher.trailing(), &[1, 2, 3]);
        }
        assert_eq!(
            calls,
            vec![
                ("<a></a>".to_string(), vec![1, 2, 3]),
                ("<b></b>".to_string(), vec![1, 2, 3]),
            ]
        );
    }

    #[test]
    fn test_no_trailing_arguments() {
        let mut count = 0;
        {
            let handler = |_fragment: &str, args: &[()]| {
                assert!(args.is_empty());
                count += 1;
            };
            let mut dispatcher = Dispatcher::new(handler, Vec::new());
            dispatcher.dispatch("<a></a>");
        }
        assert_eq!(count, 1);
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<String> = Vec::new();
        sink.dispatch("<x></x>");
        assert_eq!(sink, vec!["<x></x>".to_string()]);
    }
}
