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

//! Binary persistence for [`Table`].
//!
//! A persisted table is laid out as follows, all integers big-endian:
//!
//! ```text
//! 4 bytes   magic marker C7 'N' 'S' 'S'
//! i32       bucket count
//! i32       total number of pairs
//! per bucket, in index order:
//!   i32     number of pairs in the bucket
//!   per pair, in chain order:
//!     u16 + bytes   key as modified UTF-8
//!     u16 + bytes   value as modified UTF-8
//! ```
//!
//! With [`Compression::Deflate`] the whole layout above is the payload of a
//! raw DEFLATE stream, with no zlib header or trailer.
//!
//! [`Table`]: crate::Table

pub(crate) mod mutf8;

use crate::{
    error::{Error, Result},
    table::{Entry, Table, MAX_BITS, MIN_BITS},
};

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

#[cfg(feature = "deflate")]
use flate2::{read::DeflateDecoder, write::DeflateEncoder};

/// Marker at the start of every persisted table.
pub const MAGIC: [u8; 4] = [0xc7, b'N', b'S', b'S'];

/// How the persisted byte stream is wrapped.
///
/// A table must be read back with the same mode it was written with; a
/// mismatch fails with [`Error::Format`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Compression {
    /// Bytes are written as-is.
    #[default]
    None,
    /// Bytes are compressed into a raw DEFLATE stream at `level`, from 0
    /// (store) to 9 (best).
    #[cfg(feature = "deflate")]
    Deflate { level: u32 },
}

impl Compression {
    /// Compression level used by [`Compression::deflate`].
    pub const DEFAULT_LEVEL: u32 = 8;

    /// Raw DEFLATE at [`DEFAULT_LEVEL`](Self::DEFAULT_LEVEL).
    #[cfg(feature = "deflate")]
    pub fn deflate() -> Self {
        Compression::Deflate {
            level: Self::DEFAULT_LEVEL,
        }
    }

    /// Returns true unless this is [`Compression::None`].
    pub fn is_compressed(&self) -> bool {
        !matches!(self, Compression::None)
    }
}

impl Table {
    /// Writes this table to `writer`.
    ///
    /// Each bucket is read-locked while it is written; the table as a whole is
    /// not locked, so a table mutated concurrently is captured one bucket at a
    /// time. When compressing, the encoder is flushed and finished before
    /// returning. `writer` is flushed in every mode.
    pub fn write_to<W: Write>(&self, writer: W, compression: Compression) -> Result<()> {
        tracing::debug!(
            capacity = self.capacity(),
            len = self.len(),
            compressed = compression.is_compressed(),
            ?compression,
            "writing table"
        );

        match compression {
            Compression::None => {
                let mut writer = writer;

                self.write_envelope(&mut writer)?;
                writer.flush()?;
            }
            #[cfg(feature = "deflate")]
            Compression::Deflate { level } => {
                if level > 9 {
                    return Err(Error::invalid_argument(format!(
                        "compression level {} is not between 0 and 9",
                        level
                    )));
                }

                let mut encoder = DeflateEncoder::new(writer, flate2::Compression::new(level));

                self.write_envelope(&mut encoder)?;
                encoder.flush()?;

                let mut writer = encoder.finish()?;
                writer.flush()?;
            }
        }

        Ok(())
    }

    /// Reads a table written by [`write_to`] with the same `compression`.
    ///
    /// The table is only returned once every bucket has been read. The stored
    /// total is checked against the bucket lengths; if they disagree the sum
    /// of the bucket lengths is used.
    ///
    /// [`write_to`]: #method.write_to
    pub fn read_from<R: Read>(reader: R, compression: Compression) -> Result<Self> {
        match compression {
            Compression::None => Self::read_envelope(reader),
            #[cfg(feature = "deflate")]
            Compression::Deflate { .. } => {
                let mut decoder = DeflateDecoder::new(Source::new(reader));

                Self::read_envelope(&mut decoder).map_err(|err| {
                    if decoder.get_ref().failed {
                        err
                    } else {
                        err.classify_inflate()
                    }
                })
            }
        }
    }

    /// Writes this table to a new file at `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P, compression: Compression) -> Result<()> {
        let file = File::create(path)?;

        self.write_to(BufWriter::new(file), compression)
    }

    /// Reads a table from the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P, compression: Compression) -> Result<Self> {
        let file = File::open(path)?;

        Self::read_from(BufReader::new(file), compression)
    }

    /// Returns this table's persisted form.
    pub fn to_bytes(&self, compression: Compression) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes, compression)?;

        Ok(bytes)
    }

    fn write_envelope<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&MAGIC)?;
        mutf8::write_count(writer, self.capacity(), "capacity")?;
        mutf8::write_count(writer, self.len(), "table length")?;

        for bucket in self.buckets() {
            bucket.write_to(&mut *writer)?;
        }

        Ok(())
    }

    fn read_envelope<R: Read>(mut reader: R) -> Result<Self> {
        let mut head = [0; 4];
        reader.read_exact(&mut head).map_err(Error::from_read)?;

        if head != MAGIC {
            return Err(Error::format("head mismatch"));
        }

        let capacity = mutf8::read_count(&mut reader, "capacity")?;

        if !capacity.is_power_of_two()
            || capacity < 1 << MIN_BITS
            || capacity > 1 << MAX_BITS
        {
            return Err(Error::format(format!(
                "capacity {} is not a power of two between {} and {}",
                capacity,
                1usize << MIN_BITS,
                1usize << MAX_BITS
            )));
        }

        let stored_len = mutf8::read_count(&mut reader, "table length")?;

        tracing::debug!(capacity, len = stored_len, "reading table");

        let mut buckets = Vec::with_capacity(capacity.min(1024));
        let mut len = 0usize;

        for index in 0..capacity {
            let bucket = Entry::read_from(&mut reader)?;
            let bucket_len = bucket.len();

            tracing::trace!(index, len = bucket_len, "read bucket");

            len += bucket_len;
            buckets.push(bucket);
        }

        if len != stored_len {
            tracing::warn!(
                stored = stored_len,
                counted = len,
                "stored table length disagrees with bucket lengths"
            );
        }

        Ok(Self::from_buckets(buckets.into_boxed_slice(), len))
    }
}

/// Byte source of a decoder, remembering whether it ever failed.
#[cfg(feature = "deflate")]
struct Source<R> {
    inner: R,
    failed: bool,
}

#[cfg(feature = "deflate")]
impl<R> Source<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            failed: false,
        }
    }
}

#[cfg(feature = "deflate")]
impl<R: Read> Read for Source<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let result = self.inner.read(buf);

        if let Err(err) = &result {
            self.failed |= err.kind() != std::io::ErrorKind::Interrupted;
        }

        result
    }
}
