use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stata_dta::{Dataset, DtaReader, DtaWriter};
use std::io::Cursor;

fn sample_dataset(rows: usize) -> Dataset {
    let mut ds = Dataset::new();
    ds.push_integer_column(
        "id",
        (0..rows).map(|i| Some(i as i32)).collect(),
    )
    .unwrap();
    ds.push_real_column(
        "value",
        (0..rows).map(|i| Some(i as f64 * 0.25)).collect(),
    )
    .unwrap();
    ds.push_text_column(
        "code",
        (0..rows).map(|i| format!("c{:06}", i % 1000)).collect(),
    )
    .unwrap();
    ds
}

fn bench_encode(c: &mut Criterion) {
    let ds = sample_dataset(10_000);
    c.bench_function("encode_10k_rows", |b| {
        b.iter(|| {
            let mut buf = Vec::new();
            DtaWriter::new(&mut buf).write(black_box(&ds)).unwrap();
            buf
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let ds = sample_dataset(10_000);
    let mut bytes = Vec::new();
    DtaWriter::new(&mut bytes).write(&ds).unwrap();
    c.bench_function("decode_10k_rows", |b| {
        b.iter(|| {
            DtaReader::new(Cursor::new(black_box(&bytes)))
                .unwrap()
                .read()
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
