use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sawlink_core::{
    decoder::{decode_frame_from_bytes, decode_frame_from_bytes_zero_copy},
    encoder::FrameBuilder,
    Seq,
};

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [16, 256, 1024, 8192] {
        let payload_bytes = Bytes::from(vec![0x42u8; size]);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                FrameBuilder::data(Seq::Zero)
                    .payload(payload_bytes.clone())
                    .build()
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [16, 256, 1024, 8192] {
        let encoded = FrameBuilder::data(Seq::One)
            .payload(Bytes::from(vec![0x42u8; size]))
            .build()
            .unwrap();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::new("copy", size), &encoded, |b, data| {
            b.iter(|| decode_frame_from_bytes(black_box(data)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("zero_copy", size), &encoded, |b, data| {
            b.iter(|| decode_frame_from_bytes_zero_copy(black_box(data.clone())).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
