use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ssrmine_core::scanner::{scan_sequence, MotifTable, ScanParams};
use ssrmine_core::Sequence;

/// Deterministic pseudo-random genome with embedded SSR runs.
fn synthetic_sequence(len: usize) -> Sequence {
    const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];
    let mut state = 0x9e3779b97f4a7c15u64;
    let mut data = Vec::with_capacity(len);

    while data.len() < len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;

        // Roughly one run per 500 bases of background.
        if state % 512 == 0 {
            let motif = match (state >> 8) % 3 {
                0 => &b"AT"[..],
                1 => &b"CAG"[..],
                _ => &b"AAAG"[..],
            };
            let repeats = 5 + (state >> 16) as usize % 8;
            for _ in 0..repeats {
                data.extend_from_slice(motif);
            }
        } else {
            data.push(BASES[(state >> 32) as usize % 4]);
        }
    }
    data.truncate(len);

    Sequence::new("bench".to_string(), data)
}

fn bench_scan(c: &mut Criterion) {
    let seq = synthetic_sequence(1_000_000);
    let params = ScanParams {
        motifs: MotifTable::parse("1=10,2=7,3=6,4=5,5=4,6=4").unwrap(),
        flank_len: 100,
        min_ssr_len: 10,
        max_ssr_len: 10_000,
    };

    c.bench_function("scan_1mb", |b| {
        b.iter(|| scan_sequence(black_box(&seq), black_box(&params)))
    });
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
