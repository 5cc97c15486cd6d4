use bytes::Bytes;
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use respwire::protocol::VERSION_KEY;
use respwire::serialize::{Serialization, Tlv};
use respwire::{HEADER_LENGTH, Outcome, ResponseCodec, ResponseHeader, Throwable, Value};

fn int_list(len: usize) -> Outcome {
    let items = (0..len).map(|i| Value::Int(i as i32)).collect();
    Outcome::from_value(Value::List(items)).with_attachment(VERSION_KEY, "2.7.5")
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let codec = ResponseCodec::new();
    let header = ResponseHeader::response(Tlv::ID, 1);

    // Binary payload (1 KB)
    let binary = Outcome::from_value(Value::Binary(vec![0u8; 1024]));
    group.throughput(Throughput::Bytes(1024));
    group.bench_function("build_binary_1kb", |b| {
        b.iter(|| {
            black_box(codec.build(&header, &binary).unwrap());
        });
    });

    // Structured payload with attachments
    let list = int_list(256);
    group.bench_function("build_list_256", |b| {
        b.iter(|| {
            black_box(codec.build(&header, &list).unwrap());
        });
    });

    let exception = Outcome::from_error(Throwable::new("service unavailable"));
    group.bench_function("build_exception", |b| {
        b.iter(|| {
            black_box(codec.build(&header, &exception).unwrap());
        });
    });

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let codec = ResponseCodec::new();
    let header = ResponseHeader::response(Tlv::ID, 1);

    let binary = codec
        .build(&header, &Outcome::from_value(Value::Binary(vec![0u8; 1024])))
        .unwrap();
    group.throughput(Throughput::Bytes(1024));
    group.bench_function("parse_binary_1kb", |b| {
        b.iter(|| {
            let mut out: Outcome<Bytes> = Outcome::default();
            codec.parse(&binary[HEADER_LENGTH..], &mut out).unwrap();
            black_box(out);
        });
    });

    let list = codec.build(&header, &int_list(256)).unwrap();
    group.bench_function("parse_list_256", |b| {
        b.iter(|| {
            let mut out: Outcome<Vec<i32>> = Outcome::default();
            codec.parse(&list[HEADER_LENGTH..], &mut out).unwrap();
            black_box(out);
        });
    });

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let codec = ResponseCodec::new();
    let header = ResponseHeader::response(Tlv::ID, 1);
    let outcome = int_list(64);

    group.bench_function("roundtrip_list_64", |b| {
        b.iter(|| {
            let frame = codec.build(&header, &outcome).unwrap();
            let mut out: Outcome<Vec<i32>> = Outcome::default();
            black_box(codec.parse_frame(&frame, &mut out).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_parse, bench_roundtrip);
criterion_main!(benches);
