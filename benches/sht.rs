use sht::{Compression, Table};

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_single_thread_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("sht: single threaded put");

    for numel in [8usize, 64, 512, 4096, 32768] {
        group.bench_with_input(BenchmarkId::from_parameter(numel), &numel, |b, &numel| {
            let table = Table::with_capacity(numel).unwrap();

            for i in 0..numel {
                table.put(i.to_string(), i.to_string());
            }

            let key = (numel + 1).to_string();

            b.iter(|| table.put(criterion::black_box(key.as_str()), "x"))
        });
    }

    group.finish();
}

fn bench_single_thread_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("sht: single threaded get");

    for numel in [8usize, 64, 512, 4096, 32768] {
        group.bench_with_input(BenchmarkId::from_parameter(numel), &numel, |b, &numel| {
            let table = Table::with_capacity(numel).unwrap();

            for i in 0..numel {
                table.put(i.to_string(), i.to_string());
            }

            let key = (numel / 2).to_string();

            b.iter(|| table.get(criterion::black_box(key.as_str())))
        });
    }

    group.finish();
}

fn bench_multi_thread_put(c: &mut Criterion) {
    let num_threads = num_cpus::get();

    let table = Arc::new(Table::with_capacity(4096).unwrap());
    let keep_going = Arc::new(AtomicBool::new(true));

    let threads: Vec<_> = (0..num_threads - 1)
        .map(|i| {
            let table = table.clone();
            let keep_going = keep_going.clone();
            let key = i.to_string();

            thread::spawn(move || {
                while keep_going.load(Ordering::SeqCst) {
                    table.put(criterion::black_box(key.as_str()), "x");
                }
            })
        })
        .collect();

    let key = (num_threads + 1).to_string();

    c.bench_function("sht: multithreaded put", move |b| {
        b.iter(|| table.put(criterion::black_box(key.as_str()), "x"))
    });

    keep_going.store(false, Ordering::SeqCst);

    let _: Vec<_> = threads.into_iter().map(|t| t.join()).collect();
}

fn bench_multi_thread_contended_put(c: &mut Criterion) {
    let num_threads = num_cpus::get();

    let table = Arc::new(Table::with_capacity(4096).unwrap());
    let keep_going = Arc::new(AtomicBool::new(true));

    let threads: Vec<_> = (0..num_threads - 1)
        .map(|_| {
            let table = table.clone();
            let keep_going = keep_going.clone();

            thread::spawn(move || {
                while keep_going.load(Ordering::SeqCst) {
                    table.put(criterion::black_box("0"), "0");
                }
            })
        })
        .collect();

    c.bench_function("sht: contended multithreaded put", move |b| {
        b.iter(|| table.put(criterion::black_box("0"), "0"))
    });

    keep_going.store(false, Ordering::SeqCst);

    let _: Vec<_> = threads.into_iter().map(|t| t.join()).collect();
}

fn bench_serialize(c: &mut Criterion) {
    let table = Table::with_capacity(16384).unwrap();

    for i in 0..32768 {
        table.add(format!("k{}", i), format!("{:x}", i));
    }

    c.bench_function("sht: serialize 32768 pairs", |b| {
        b.iter(|| table.to_bytes(Compression::None).unwrap())
    });

    let bytes = table.to_bytes(Compression::None).unwrap();

    c.bench_function("sht: deserialize 32768 pairs", |b| {
        b.iter(|| Table::read_from(criterion::black_box(bytes.as_slice()), Compression::None).unwrap())
    });
}

criterion_group!(
    benches,
    bench_single_thread_put,
    bench_single_thread_get,
    bench_multi_thread_put,
    bench_multi_thread_contended_put,
    bench_serialize,
);
criterion_main!(benches);
