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

//! The string hash used for bucket routing and in-bucket comparisons.
//!
//! Keys are hashed with 32-bit MurmurHash3 over their UTF-16 code units using
//! a fixed seed. The algorithm decides which bucket every persisted pair lands
//! in, so it must not change between writing and reading a table.

/// Seed mixed into every hash.
pub const SEED: u32 = 0x7A84_105F;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

/// Hashes `key` to a 32-bit value.
///
/// Code units are consumed in pairs as little-endian 32-bit blocks; a trailing
/// unpaired unit is mixed as the tail. The result is deterministic across
/// processes and platforms.
pub fn hash(key: &str) -> u32 {
    let mut h1 = SEED;
    let mut units = key.encode_utf16();
    let mut count: u32 = 0;

    loop {
        let lo = match units.next() {
            Some(lo) => lo,
            None => break,
        };

        match units.next() {
            Some(hi) => {
                count = count.wrapping_add(2);

                h1 ^= mix_k1(u32::from(lo) | (u32::from(hi) << 16));
                h1 = h1.rotate_left(13);
                h1 = h1.wrapping_mul(5).wrapping_add(0xe654_6b64);
            }
            None => {
                count = count.wrapping_add(1);

                h1 ^= mix_k1(u32::from(lo));
            }
        }
    }

    h1 ^= count.wrapping_mul(2);

    fmix(h1)
}

#[inline]
fn mix_k1(k1: u32) -> u32 {
    k1.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

#[inline]
fn fmix(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;

    h
}
