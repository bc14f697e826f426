use sht::{Compression, Error, Table};

use std::io::{self, Read, Write};

fn filled(capacity: usize, count: usize) -> Table {
    let table = Table::with_capacity(capacity).unwrap();

    for i in 0..count {
        table.add(format!("k{}", i), format!("{:x}", i.wrapping_mul(0x9e37_79b9)));
    }

    table
}

fn assert_same(read: &Table, table: &Table, count: usize) {
    assert_eq!(read.capacity(), table.capacity());
    assert_eq!(read.len(), table.len());

    for i in 0..count {
        let key = format!("k{}", i);

        assert_eq!(read.get(&key), table.get(&key), "key {}", key);
    }
}

#[test]
fn file_round_trip_uncompressed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kv.bin");
    let table = filled(16384, 32768);

    table.save(&path, Compression::None).unwrap();

    let read = Table::load(&path, Compression::None).unwrap();
    assert_same(&read, &table, 32768);
}

#[cfg(feature = "deflate")]
#[test]
fn file_round_trip_compressed() {
    let dir = tempfile::tempdir().unwrap();
    let plain_path = dir.path().join("kv.bin");
    let packed_path = dir.path().join("kv.dfl.bin");
    let table = filled(16384, 32768);

    table.save(&plain_path, Compression::None).unwrap();
    table.save(&packed_path, Compression::deflate()).unwrap();

    let plain_len = std::fs::metadata(&plain_path).unwrap().len();
    let packed_len = std::fs::metadata(&packed_path).unwrap().len();
    assert!(packed_len < plain_len);

    let read = Table::load(&packed_path, Compression::deflate()).unwrap();
    assert_same(&read, &table, 32768);

    assert!(Table::load(&packed_path, Compression::None)
        .unwrap_err()
        .is_format());
    assert!(Table::load(&plain_path, Compression::deflate())
        .unwrap_err()
        .is_format());
}

#[cfg(feature = "deflate")]
#[test]
fn every_level_round_trips() {
    let table = filled(64, 500);

    for level in 0..=9 {
        let compression = Compression::Deflate { level };
        let bytes = table.to_bytes(compression).unwrap();
        let read = Table::read_from(bytes.as_slice(), compression).unwrap();

        assert_same(&read, &table, 500);
    }
}

#[test]
fn non_ascii_round_trip() {
    let table = Table::new();
    let pairs = [
        ("日本語", "値"),
        ("nul\0key", "\0"),
        ("🦀", "crab 🦀 crab"),
        ("", "empty key"),
        ("empty value", ""),
    ];

    for (key, value) in pairs {
        table.put(key, value);
    }

    let bytes = table.to_bytes(Compression::None).unwrap();
    let read = Table::read_from(bytes.as_slice(), Compression::None).unwrap();

    for (key, value) in pairs {
        assert_eq!(read.get(key).as_deref(), Some(value));
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();

    match Table::load(dir.path().join("absent.bin"), Compression::None) {
        Err(Error::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::NotFound),
        other => panic!("unexpected result: {:?}", other),
    }
}

struct FailingWriter {
    remaining: usize,
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }

        let n = buf.len().min(self.remaining);
        self.remaining -= n;

        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn sink_failure_is_propagated() {
    let table = filled(16, 100);

    match table.write_to(FailingWriter { remaining: 50 }, Compression::None) {
        Err(Error::Io(err)) => assert_eq!(err.to_string(), "disk full"),
        other => panic!("unexpected result: {:?}", other),
    }

    // the table is untouched by a failed write
    assert_eq!(table.len(), 100);
    assert_eq!(table.get("k0"), Some(format!("{:x}", 0)));
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
    }
}

#[test]
fn source_failure_is_propagated() {
    match Table::read_from(FailingReader, Compression::None) {
        Err(Error::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::ConnectionReset),
        other => panic!("unexpected result: {:?}", other),
    }
}

struct CorruptingReader;

impl Read for CorruptingReader {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::InvalidData, "record mac mismatch"))
    }
}

#[test]
fn invalid_data_from_source_is_an_io_error() {
    match Table::read_from(CorruptingReader, Compression::None) {
        Err(Error::Io(err)) => {
            assert_eq!(err.kind(), io::ErrorKind::InvalidData);
            assert_eq!(err.to_string(), "record mac mismatch");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[cfg(feature = "deflate")]
#[test]
fn invalid_data_from_source_is_an_io_error_when_compressed() {
    match Table::read_from(CorruptingReader, Compression::deflate()) {
        Err(Error::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::InvalidData),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[cfg(feature = "deflate")]
#[test]
fn undecodable_deflate_is_a_format_error() {
    // 0b111 sets the final-block bit with the reserved block type
    let err = Table::read_from(&[0x07u8, 0, 0, 0][..], Compression::deflate()).unwrap_err();

    assert!(err.is_format(), "{:?}", err);
}

#[test]
fn error_messages_name_the_problem() {
    let err = Table::with_bits(30).unwrap_err();
    assert!(err.to_string().contains("bit count too large"));

    let err = Table::read_from(&b"NOPE"[..], Compression::None).unwrap_err();
    assert_eq!(err.to_string(), "format error: head mismatch");
}
