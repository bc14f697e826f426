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

//! Errors returned by table construction and persistence.

use std::{error, fmt, io};

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The ways a table operation can fail.
///
/// Lock acquisition never fails, so only construction and persistence return
/// errors. In-memory operations on an existing [`Table`] are infallible.
///
/// [`Table`]: crate::Table
#[derive(Debug)]
pub enum Error {
    /// A caller violated a precondition, such as requesting more than 24 bits
    /// of buckets or persisting a string too long to encode.
    InvalidArgument(String),
    /// A persisted stream was missing its magic marker, was truncated, or was
    /// otherwise malformed.
    Format(String),
    /// The underlying byte source or sink failed.
    Io(io::Error),
}

impl Error {
    pub(crate) fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub(crate) fn format<S: Into<String>>(message: S) -> Self {
        Error::Format(message.into())
    }

    /// Classifies an error raised while reading a persisted stream.
    ///
    /// Running out of bytes means the stream itself is bad, not the source it
    /// came from. Every other failure is the source's and is kept as-is.
    pub(crate) fn from_read(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::Format("truncated stream".to_string()),
            _ => Error::Io(err),
        }
    }

    /// Reclassifies an error raised by a DEFLATE decoder.
    ///
    /// Only call this when the decoder's own source did not fail; the decoder
    /// reports undecodable input as `InvalidInput` or `InvalidData`.
    #[cfg(feature = "deflate")]
    pub(crate) fn classify_inflate(self) -> Self {
        match self {
            Error::Io(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData
                ) =>
            {
                Error::Format(format!("corrupt stream: {}", err))
            }
            other => other,
        }
    }

    /// Returns true if this is an [`Error::Format`].
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }

    /// Returns true if this is an [`Error::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(message) => write!(f, "invalid argument: {}", message),
            Error::Format(message) => write!(f, "format error: {}", message),
            Error::Io(err) => write!(f, "i/o failure: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
