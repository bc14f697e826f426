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

use crate::{
    error::Result,
    hasher,
    persist::mutf8,
};

use std::io::{Read, Write};

/// An immutable key-value pair and the precomputed hash of its key.
///
/// A `Node` is always detached: the link to its successor belongs to the
/// bucket chain that owns it, so every insertion moves exactly one pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    key: String,
    hash: u32,
    value: String,
}

impl Node {
    /// Creates a node, hashing `key` with [`hasher::hash`].
    ///
    /// [`hasher::hash`]: crate::hasher::hash
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        let key = key.into();
        let hash = hasher::hash(&key);

        Self::with_hash(key, hash, value.into())
    }

    pub(crate) fn with_hash(key: String, hash: u32, value: String) -> Self {
        debug_assert_eq!(hash, hasher::hash(&key));

        Self { key, hash, value }
    }

    /// Returns the key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the hash of the key, as computed by [`hasher::hash`].
    ///
    /// [`hasher::hash`]: crate::hasher::hash
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Returns the value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consumes the node, returning its key and value.
    pub fn into_parts(self) -> (String, String) {
        (self.key, self.value)
    }

    pub(crate) fn into_value(self) -> String {
        self.value
    }

    /// Returns true if this node holds `key`, whose hash is `hash`.
    ///
    /// The hash is compared first; equal hashes alone never count as a match.
    #[inline]
    pub(crate) fn matches(&self, hash: u32, key: &str) -> bool {
        self.hash == hash && self.key == key
    }

    /// Writes the key then the value as length-prefixed modified UTF-8.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        mutf8::write_str(&mut writer, &self.key)?;
        mutf8::write_str(&mut writer, &self.value)
    }

    /// Reads a node written by [`write_to`], rehashing its key.
    ///
    /// [`write_to`]: #method.write_to
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let key = mutf8::read_str(&mut reader)?;
        let value = mutf8::read_str(&mut reader)?;

        Ok(Self::new(key, value))
    }
}
