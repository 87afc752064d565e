#![allow(clippy::missing_panics_doc)]

#[cfg(any(feature = "benchmark-encode", feature = "benchmark-decode"))]
use std::{thread::sleep, time::Duration};

#[cfg(any(feature = "benchmark-encode", feature = "benchmark-decode"))]
use criterion::{black_box, BatchSize, BenchmarkId};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
#[cfg(any(feature = "benchmark-encode", feature = "benchmark-decode"))]
use rand::distributions::{DistString, Standard};
use rand::{rngs::SmallRng, SeedableRng};

const SEED: u64 = 0x5EED_5EED;
const CHARS: [usize; 3] = [16, 32, 63];
const LIBRARIES: [&str; 2] = ["uts46", "idna"];

fn encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    let mut _rng = SmallRng::seed_from_u64(SEED);

    for lib in LIBRARIES {
        for chars in CHARS {
            group.throughput(Throughput::Elements(u64::try_from(chars).unwrap()));

            match lib {
                #[cfg(all(feature = "benchmark-encode", feature = "benchmark-idna"))]
                "idna" => {
                    group.bench_function(BenchmarkId::new(lib, chars), |b| {
                        b.iter_batched_ref(
                            || Standard.sample_string(&mut _rng, chars),
                            |i| black_box(idna::punycode::encode_str(i)).unwrap(),
                            BatchSize::SmallInput,
                        );
                    });
                    sleep(Duration::from_secs(5));
                }

                #[cfg(feature = "benchmark-encode")]
                "uts46" => {
                    group.bench_function(BenchmarkId::new(lib, chars), |b| {
                        b.iter_batched_ref(
                            || Standard.sample_string(&mut _rng, chars),
                            |i| black_box(uts46::punycode::encode(i)).unwrap(),
                            BatchSize::SmallInput,
                        );
                    });
                    sleep(Duration::from_secs(5));
                }

                // skip disabled benchmark
                #[allow(unreachable_patterns)]
                _ => (),
            }
        }
    }
}

fn decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    let mut _rng = SmallRng::seed_from_u64(SEED);

    for lib in LIBRARIES {
        for chars in CHARS {
            group.throughput(Throughput::Elements(u64::try_from(chars).unwrap()));

            match lib {
                #[cfg(all(feature = "benchmark-decode", feature = "benchmark-idna"))]
                "idna" => {
                    group.bench_function(BenchmarkId::new(lib, chars), |b| {
                        b.iter_batched_ref(
                            || {
                                uts46::punycode::encode(&Standard.sample_string(&mut _rng, chars))
                                    .unwrap()
                            },
                            |i| black_box(idna::punycode::decode_to_string(i)).unwrap(),
                            BatchSize::SmallInput,
                        );
                    });
                    sleep(Duration::from_secs(5));
                }

                #[cfg(feature = "benchmark-decode")]
                "uts46" => {
                    group.bench_function(BenchmarkId::new(lib, chars), |b| {
                        b.iter_batched_ref(
                            || {
                                uts46::punycode::encode(&Standard.sample_string(&mut _rng, chars))
                                    .unwrap()
                            },
                            |i| black_box(uts46::punycode::decode(i)).unwrap(),
                            BatchSize::SmallInput,
                        );
                    });
                    sleep(Duration::from_secs(5));
                }

                // skip disabled benchmark
                #[allow(unreachable_patterns)]
                _ => (),
            }
        }
    }
}

criterion_group!(benches, encode, decode);
criterion_main!(benches);
