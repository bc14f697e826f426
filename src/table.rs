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

//! A fixed-capacity hash table with one lock per bucket.

mod entry;
mod node;


pub use entry::Entry;
pub use node::Node;

use crate::{
    error::{Error, Result},
    hasher,
};

use std::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Fewest bucket bits a table will be created with.
pub const MIN_BITS: u32 = 2;

/// Most bucket bits a table may be created with.
pub const MAX_BITS: u32 = 24;

/// Bucket bits used by [`Table::new`].
pub const DEFAULT_BITS: u32 = 4;

/// Concurrent string-to-string hash table with chained buckets.
///
/// The table holds exactly `2^b` buckets for a bit-width `b` fixed at
/// construction; it never grows or rehashes. Keys are routed by the top `b`
/// bits of their [hash], so every operation touches exactly one bucket and
/// operations on different buckets never contend.
///
/// Each bucket is an [`Entry`] guarded by its own reader-writer lock. There is
/// no table-wide lock: [`clear`] empties one bucket at a time, and a reader
/// running alongside it may see some buckets already empty and others not yet.
///
/// The total length is a relaxed atomic counter updated after the bucket
/// mutation it accounts for, not atomically with it. A concurrent reader may
/// briefly observe a pair that is not yet counted. Once writers have returned
/// the counter is exact.
///
/// [hash]: crate::hasher::hash
/// [`clear`]: #method.clear
pub struct Table {
    buckets: Box<[Entry]>,
    len: AtomicUsize,
    shift: u32,
}

impl Table {
    /// Creates an empty table with `2^4` buckets.
    pub fn new() -> Self {
        Self::allocate(DEFAULT_BITS)
    }

    /// Creates an empty table with at least `capacity` buckets.
    ///
    /// The bucket count is the smallest power of two no less than `capacity`,
    /// and no less than `2^MIN_BITS`. Fails with [`Error::InvalidArgument`] if
    /// that would need more than [`MAX_BITS`] bits.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let bits = match capacity {
            0 | 1 => 0,
            _ => usize::BITS - (capacity - 1).leading_zeros(),
        };

        Self::with_bits(bits)
    }

    /// Creates an empty table with `2^bits` buckets.
    ///
    /// `bits` is raised to [`MIN_BITS`] if it is smaller. Fails with
    /// [`Error::InvalidArgument`] if `bits` is greater than [`MAX_BITS`].
    pub fn with_bits(bits: u32) -> Result<Self> {
        if bits > MAX_BITS {
            return Err(Error::invalid_argument(format!(
                "bit count too large: {} > {}",
                bits, MAX_BITS
            )));
        }

        Ok(Self::allocate(bits.max(MIN_BITS)))
    }

    fn allocate(bits: u32) -> Self {
        debug_assert!((MIN_BITS..=MAX_BITS).contains(&bits));

        let buckets: Vec<_> = (0..1usize << bits).map(|_| Entry::new()).collect();

        tracing::debug!(buckets = buckets.len(), "allocated table");

        Self::from_buckets(buckets.into_boxed_slice(), 0)
    }

    /// `buckets.len()` must be a power of two between `2^MIN_BITS` and
    /// `2^MAX_BITS`.
    pub(crate) fn from_buckets(buckets: Box<[Entry]>, len: usize) -> Self {
        debug_assert!(buckets.len().is_power_of_two());

        let bits = buckets.len().trailing_zeros();

        Self {
            buckets,
            len: AtomicUsize::new(len),
            shift: 32 - bits,
        }
    }

    /// Returns the number of pairs stored in this table.
    ///
    /// Pairs added with [`add`] are counted even if they shadow an earlier
    /// pair with the same key. Because the table can be updated concurrently,
    /// this reflects the mutations that have returned to their callers;
    /// in-progress mutations may or may not be counted.
    ///
    /// [`add`]: #method.add
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Returns true if this table holds no counted pairs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of buckets, which never changes.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns how far a hash is shifted right to select its bucket.
    pub fn shift(&self) -> u32 {
        self.shift
    }

    /// Returns the index of the bucket `key` belongs to.
    pub fn bucket_index(&self, key: &str) -> usize {
        self.index_from_hash(hasher::hash(key))
    }

    /// Returns the number of nodes in the `index`-th bucket, or [`None`] if
    /// there is no such bucket.
    ///
    /// [`None`]: https://doc.rust-lang.org/std/option/enum.Option.html#variant.None
    pub fn bucket_len(&self, index: usize) -> Option<usize> {
        self.buckets.get(index).map(Entry::len)
    }

    /// Returns a copy of the value most recently stored under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        let hash = hasher::hash(key);

        self.bucket(hash).get_hashed(hash, key)
    }

    /// Returns a copy of the first value in `hash`'s bucket whose key hashes
    /// to `hash`.
    ///
    /// Keys are not compared; see [`Entry::get_by_hash`].
    pub fn get_by_hash(&self, hash: u32) -> Option<String> {
        self.bucket(hash).get_by_hash(hash)
    }

    /// Returns true if some pair is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Adds a pair without checking whether `key` is already present.
    ///
    /// The new pair shadows any existing pair with the same key, and both are
    /// counted by [`len`]. Use [`put`] to replace instead.
    ///
    /// [`len`]: #method.len
    /// [`put`]: #method.put
    pub fn add<K: Into<String>, V: Into<String>>(&self, key: K, value: V) {
        let node = Node::new(key, value);

        self.bucket(node.hash()).add(node);
        self.len.fetch_add(1, Ordering::Relaxed);
    }

    /// Inserts a pair, then returns the value previously stored under `key`.
    ///
    /// If `key` was not present the pair is appended to its bucket, the length
    /// grows by one and [`None`] is returned.
    ///
    /// [`None`]: https://doc.rust-lang.org/std/option/enum.Option.html#variant.None
    pub fn put<K: Into<String>, V: Into<String>>(&self, key: K, value: V) -> Option<String> {
        let node = Node::new(key, value);
        let previous = self.bucket(node.hash()).put(node);

        if previous.is_none() {
            self.len.fetch_add(1, Ordering::Relaxed);
        }

        previous
    }

    /// Inserts a pair at `position` within its bucket's chain, without
    /// checking for an existing pair with the same key.
    ///
    /// See [`Entry::insert`] for how `position` is interpreted.
    pub fn insert<K: Into<String>, V: Into<String>>(&self, key: K, value: V, position: usize) {
        let node = Node::new(key, value);

        self.bucket(node.hash()).insert(node, position);
        self.len.fetch_add(1, Ordering::Relaxed);
    }

    /// Empties every bucket, then resets the length to zero.
    ///
    /// Buckets are cleared one at a time under their own locks. Concurrent
    /// readers may observe a mix of cleared and uncleared buckets, and pairs
    /// added while `clear` runs may survive it without being counted.
    pub fn clear(&self) {
        for bucket in self.buckets.iter() {
            bucket.clear();
        }

        self.len.store(0, Ordering::Relaxed);
    }

    /// Reserved for collapsing shadowed duplicates; currently does nothing.
    pub fn optimize(&self) {}

    pub(crate) fn buckets(&self) -> &[Entry] {
        &self.buckets
    }

    fn bucket(&self, hash: u32) -> &Entry {
        &self.buckets[self.index_from_hash(hash)]
    }

    fn index_from_hash(&self, hash: u32) -> usize {
        (hash >> self.shift) as usize
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}
