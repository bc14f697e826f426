// MIT License
//
// Copyright (c) 2021 Gregory Meyer
//
// Permission is hereby granted, free of charge, to any person
// obtaining a copy of this software and associated documentation files
// (the "Software"), to deal in the Software without restriction,
// including without limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of the Software,
// and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS
// BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN
// ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! A fixed-capacity concurrent hash table from strings to strings.
//!
//! [`Table`] splits its keys across `2^b` buckets using the top `b` bits of a
//! 32-bit [hash]. Each bucket is a chain of nodes behind its own reader-writer
//! lock, so threads working on different buckets never wait for each other.
//! The bucket count is chosen at construction and never changes.
//!
//! Tables can be written to and read back from any byte stream, optionally
//! wrapped in raw DEFLATE; see [`persist`].
//!
//! ```
//! use sht::Table;
//!
//! let table = Table::with_capacity(256).unwrap();
//!
//! assert_eq!(table.put("x", "1"), None);
//! assert_eq!(table.put("x", "2"), Some("1".to_string()));
//! assert_eq!(table.get("x"), Some("2".to_string()));
//! assert_eq!(table.len(), 1);
//! ```
//!
//! [hash]: hasher::hash

pub mod error;
pub mod hasher;
pub mod persist;
pub mod table;

pub use error::{Error, Result};
pub use persist::Compression;
pub use table::{Entry, Node, Table};
