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

//! Big-endian integers and length-prefixed modified UTF-8 strings.
//!
//! Modified UTF-8 differs from standard UTF-8 in two places: U+0000 is written
//! as the two bytes `C0 80`, and characters outside the basic multilingual
//! plane are written as a surrogate pair, three bytes per surrogate. Every
//! string is preceded by its encoded length as a big-endian `u16`.

use crate::error::{Error, Result};

use std::io::{Read, Write};

/// Largest encoded string length that fits the two-byte prefix.
pub(crate) const MAX_ENCODED_LEN: usize = u16::MAX as usize;

pub(crate) fn write_i32<W: Write>(writer: &mut W, value: i32) -> Result<()> {
    writer.write_all(&value.to_be_bytes())?;

    Ok(())
}

pub(crate) fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut buf = [0; 4];
    reader.read_exact(&mut buf).map_err(Error::from_read)?;

    Ok(i32::from_be_bytes(buf))
}

/// Writes a count as a big-endian `i32`.
pub(crate) fn write_count<W: Write>(writer: &mut W, count: usize, what: &str) -> Result<()> {
    let count = i32::try_from(count)
        .map_err(|_| Error::invalid_argument(format!("{} {} does not fit in 32 bits", what, count)))?;

    write_i32(writer, count)
}

/// Reads a big-endian `i32` that must not be negative.
pub(crate) fn read_count<R: Read>(reader: &mut R, what: &str) -> Result<usize> {
    let count = read_i32(reader)?;

    usize::try_from(count).map_err(|_| Error::format(format!("negative {}: {}", what, count)))
}

pub(crate) fn encoded_len(s: &str) -> usize {
    s.encode_utf16().map(unit_len).sum()
}

fn unit_len(unit: u16) -> usize {
    match unit {
        0x0001..=0x007f => 1,
        0x0000 | 0x0080..=0x07ff => 2,
        _ => 3,
    }
}

/// Writes `s` as a length-prefixed modified UTF-8 string.
pub(crate) fn write_str<W: Write>(writer: &mut W, s: &str) -> Result<()> {
    let len = encoded_len(s);

    if len > MAX_ENCODED_LEN {
        return Err(Error::invalid_argument(format!(
            "string encodes to {} bytes, more than {}",
            len, MAX_ENCODED_LEN
        )));
    }

    let mut buf = Vec::with_capacity(len + 2);
    buf.extend_from_slice(&(len as u16).to_be_bytes());

    for unit in s.encode_utf16() {
        match unit_len(unit) {
            1 => buf.push(unit as u8),
            2 => {
                buf.push(0xc0 | ((unit >> 6) & 0x1f) as u8);
                buf.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                buf.push(0xe0 | ((unit >> 12) & 0x0f) as u8);
                buf.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                buf.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }

    writer.write_all(&buf)?;

    Ok(())
}

/// Reads a length-prefixed modified UTF-8 string.
pub(crate) fn read_str<R: Read>(reader: &mut R) -> Result<String> {
    let mut prefix = [0; 2];
    reader.read_exact(&mut prefix).map_err(Error::from_read)?;

    let mut bytes = vec![0; usize::from(u16::from_be_bytes(prefix))];
    reader.read_exact(&mut bytes).map_err(Error::from_read)?;

    decode(&bytes)
}

fn decode(bytes: &[u8]) -> Result<String> {
    // ASCII without NUL is identical in both encodings
    if bytes.iter().all(|&b| b != 0 && b < 0x80) {
        return String::from_utf8(bytes.to_vec()).map_err(|e| Error::format(e.to_string()));
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b0 = bytes[i];

        let (unit, width) = match b0 >> 4 {
            0x0..=0x7 => (u16::from(b0), 1),
            0xc | 0xd => {
                let b1 = continuation(bytes, i + 1)?;

                ((u16::from(b0 & 0x1f) << 6) | b1, 2)
            }
            0xe => {
                let b1 = continuation(bytes, i + 1)?;
                let b2 = continuation(bytes, i + 2)?;

                ((u16::from(b0 & 0x0f) << 12) | (b1 << 6) | b2, 3)
            }
            _ => {
                return Err(Error::format(format!(
                    "malformed input around byte {}",
                    i
                )))
            }
        };

        units.push(unit);
        i += width;
    }

    char::decode_utf16(units.iter().copied())
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::format(e.to_string()))
}

fn continuation(bytes: &[u8], i: usize) -> Result<u16> {
    match bytes.get(i) {
        Some(&b) if b & 0xc0 == 0x80 => Ok(u16::from(b & 0x3f)),
        Some(_) => Err(Error::format(format!("malformed input around byte {}", i))),
        None => Err(Error::format("partial character at end of input")),
    }
}
