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

use super::node::Node;

use crate::{
    error::Result,
    hasher,
    persist::mutf8,
};

use std::{
    fmt,
    io::{Read, Write},
    mem,
};

use parking_lot::RwLock;

/// One bucket: a chain of nodes guarded by a reader-writer lock.
///
/// Lookups share the lock; every mutation holds it exclusively for its whole
/// duration. Guards are scoped, so the lock is released on every exit path.
/// Chains are ordered most-recently-prepended first, and lookups return the
/// first match from the head.
#[derive(Default)]
pub struct Entry {
    chain: RwLock<Chain>,
}

impl Entry {
    /// Creates an empty bucket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in this bucket's chain.
    ///
    /// Duplicate keys added with [`add`] are all counted.
    ///
    /// [`add`]: #method.add
    pub fn len(&self) -> usize {
        self.chain.read().len
    }

    /// Returns true if this bucket's chain has no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the value of the first node whose hash is `hash`.
    ///
    /// Keys are not compared, so two keys with equal hashes are
    /// indistinguishable here. Use [`get`] when that matters.
    ///
    /// [`get`]: #method.get
    pub fn get_by_hash(&self, hash: u32) -> Option<String> {
        let chain = self.chain.read();

        chain
            .iter()
            .find(|node| node.hash() == hash)
            .map(|node| node.value().to_string())
    }

    /// Returns a copy of the value of the first node holding `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_hashed(hasher::hash(key), key)
    }

    pub(crate) fn get_hashed(&self, hash: u32, key: &str) -> Option<String> {
        let chain = self.chain.read();

        chain
            .iter()
            .find(|node| node.matches(hash, key))
            .map(|node| node.value().to_string())
    }

    /// Returns a copy of the node `position` links from the head.
    ///
    /// Returns [`None`] if the chain has `position` or fewer nodes.
    ///
    /// [`None`]: https://doc.rust-lang.org/std/option/enum.Option.html#variant.None
    pub fn node_at(&self, position: usize) -> Option<Node> {
        self.chain.read().iter().nth(position).cloned()
    }

    /// Prepends `node` without looking for an existing node with its key.
    ///
    /// If the key is already present, the new node shadows the old one for
    /// every later lookup. The old node stays in the chain and keeps
    /// counting towards [`len`].
    ///
    /// [`len`]: #method.len
    pub fn add(&self, node: Node) {
        self.chain.write().push_front(node);
    }

    /// Inserts `node` so that `position` nodes precede it.
    ///
    /// A `position` of zero makes `node` the new head; a `position` past the
    /// end of the chain appends it to the tail. No duplicate check is made, and
    /// an earlier node with the same key keeps shadowing `node`.
    pub fn insert(&self, node: Node, position: usize) {
        self.chain.write().insert(node, position);
    }

    /// Replaces the node holding the same key as `node`, or appends `node`.
    ///
    /// The replacement takes the old node's place in the chain. Returns the
    /// replaced value, or [`None`] if `node` was appended and the chain grew.
    ///
    /// [`None`]: https://doc.rust-lang.org/std/option/enum.Option.html#variant.None
    pub fn put(&self, node: Node) -> Option<String> {
        self.chain.write().put(node)
    }

    /// Removes every node from this bucket.
    pub fn clear(&self) {
        self.chain.write().clear();
    }

    /// Takes the exclusive lock and leaves the chain untouched.
    ///
    /// Collapsing shadowed duplicates is not performed; callers must not
    /// depend on this changing any observable state.
    pub fn optimize(&self) {
        let _chain = self.chain.write();
    }

    /// Writes the node count as a big-endian `i32`, then every node in chain
    /// order.
    ///
    /// The bucket is read-locked for the whole write, so the count always
    /// agrees with the pairs that follow it.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let chain = self.chain.read();

        mutf8::write_count(&mut writer, chain.len, "bucket length")?;

        for node in chain.iter() {
            node.write_to(&mut writer)?;
        }

        Ok(())
    }

    /// Reads a bucket written by [`write_to`], preserving its chain order.
    ///
    /// [`write_to`]: #method.write_to
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let len = mutf8::read_count(&mut reader, "bucket length")?;

        let mut nodes = Vec::with_capacity(len.min(1024));

        for _ in 0..len {
            nodes.push(Node::read_from(&mut reader)?);
        }

        let mut chain = Chain::default();

        for node in nodes.into_iter().rev() {
            chain.push_front(node);
        }

        Ok(Self {
            chain: RwLock::new(chain),
        })
    }

    #[cfg(test)]
    pub(crate) fn nodes(&self) -> Vec<Node> {
        self.chain.read().iter().cloned().collect()
    }

    #[cfg(test)]
    pub(crate) fn lock_exclusive(&self) -> impl Sized + '_ {
        self.chain.write()
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain = self.chain.read();

        f.debug_list()
            .entries(chain.iter().map(|node| (node.key(), node.value())))
            .finish()
    }
}

type Link = Option<Box<ChainNode>>;

struct ChainNode {
    node: Node,
    next: Link,
}

#[derive(Default)]
struct Chain {
    head: Link,
    len: usize,
}

impl Chain {
    fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    fn push_front(&mut self, node: Node) {
        let next = self.head.take();
        self.head = Some(Box::new(ChainNode { node, next }));
        self.len += 1;
    }

    fn insert(&mut self, node: Node, position: usize) {
        let mut link = &mut self.head;

        for _ in 0..position {
            match link {
                Some(chain_node) => link = &mut chain_node.next,
                None => break,
            }
        }

        let next = link.take();
        *link = Some(Box::new(ChainNode { node, next }));
        self.len += 1;
    }

    fn put(&mut self, node: Node) -> Option<String> {
        let mut link = &mut self.head;

        while let Some(chain_node) = link {
            if chain_node.node.matches(node.hash(), node.key()) {
                let previous = mem::replace(&mut chain_node.node, node);

                return Some(previous.into_value());
            }

            link = &mut chain_node.next;
        }

        *link = Some(Box::new(ChainNode { node, next: None }));
        self.len += 1;

        None
    }

    // unlinks one node at a time; dropping the head box directly would recurse
    // once per node
    fn clear(&mut self) {
        let mut link = self.head.take();

        while let Some(mut chain_node) = link {
            link = chain_node.next.take();
        }

        self.len = 0;
    }
}

impl Drop for Chain {
    fn drop(&mut self) {
        self.clear();
    }
}

struct Iter<'a> {
    next: Option<&'a ChainNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|chain_node| {
            self.next = chain_node.next.as_deref();

            &chain_node.node
        })
    }
}
