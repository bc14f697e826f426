use proptest::prelude::*;
use sht::{Compression, Table};

use std::collections::HashMap;

#[cfg(feature = "deflate")]
fn compression(compressed: bool) -> Compression {
    if compressed {
        Compression::deflate()
    } else {
        Compression::None
    }
}

#[cfg(not(feature = "deflate"))]
fn compression(_compressed: bool) -> Compression {
    Compression::None
}

// Model add/put/get/clear against a HashMap plus a count of shadowed copies.
proptest! {
    #[test]
    fn prop_table_matches_model(
        bits in 2u32..=6,
        ops in proptest::collection::vec((0u8..=3u8, 0usize..64usize, 0u32..1000u32), 1..200),
    ) {
        let table = Table::with_bits(bits).unwrap();
        let mut model: HashMap<String, String> = HashMap::new();
        let mut nodes = 0usize;

        for (op, raw_k, raw_v) in ops {
            let key = format!("k{}", raw_k);
            let value = format!("v{}", raw_v);

            match op {
                // add always grows the chain and shadows the old value
                0 => {
                    table.add(key.as_str(), value.as_str());
                    model.insert(key.clone(), value);
                    nodes += 1;
                }
                // put only grows when the key is new
                1 => {
                    let previous = table.put(key.as_str(), value.as_str());
                    let expected = model.insert(key.clone(), value);
                    if expected.is_none() {
                        nodes += 1;
                    }
                    prop_assert_eq!(previous, expected);
                }
                2 => {
                    prop_assert_eq!(table.get(&key), model.get(&key).cloned());
                }
                3 => {
                    if raw_v % 16 == 0 {
                        table.clear();
                        model.clear();
                        nodes = 0;
                    }
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(table.len(), nodes);
        }

        for (key, value) in model.iter() {
            prop_assert_eq!(table.get(key), Some(value.clone()));
        }
    }

    #[test]
    fn prop_persisted_table_answers_the_same(
        bits in 2u32..=8,
        pairs in proptest::collection::vec(("\\PC{0,12}", "\\PC{0,12}", any::<bool>()), 0..100),
        compressed in any::<bool>(),
    ) {
        let compression = compression(compressed);
        let table = Table::with_bits(bits).unwrap();

        for (key, value, shadow) in pairs.iter() {
            if *shadow {
                table.add(key.as_str(), value.as_str());
            } else {
                table.put(key.as_str(), value.as_str());
            }
        }

        let bytes = table.to_bytes(compression).unwrap();
        let read = Table::read_from(bytes.as_slice(), compression).unwrap();

        prop_assert_eq!(read.capacity(), table.capacity());
        prop_assert_eq!(read.len(), table.len());

        for index in 0..table.capacity() {
            prop_assert_eq!(read.bucket_len(index), table.bucket_len(index));
        }

        for (key, _, _) in pairs.iter() {
            prop_assert_eq!(read.get(key), table.get(key));
        }
    }
}
