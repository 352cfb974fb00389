use bytes::BytesMut;
use chat_proto::{Command, LineCodec};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tokio_util::codec::{Decoder, Encoder};

// Framing cost of the session hot path: decode a burst of inbound lines,
// parse each, encode the same number of outbound lines.

const BURST: usize = 256;

fn inbound_burst() -> Vec<u8> {
    (0..BURST)
        .map(|i| format!("BCST message number {i} for everyone\r\n"))
        .collect::<String>()
        .into_bytes()
}

fn decode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("framing");
    let raw = inbound_burst();
    group.throughput(Throughput::Bytes(raw.len() as u64));

    group.bench_function("decode_and_parse_burst", |b| {
        b.iter(|| {
            let mut codec = LineCodec::new();
            let mut buf = BytesMut::from(&raw[..]);
            let mut n = 0;
            while let Ok(Some(line)) = codec.decode(&mut buf) {
                black_box(Command::parse(&line));
                n += 1;
            }
            assert_eq!(n, BURST);
        })
    });

    group.finish();
}

fn encode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("framing");
    group.throughput(Throughput::Elements(BURST as u64));

    group.bench_function("encode_burst", |b| {
        b.iter(|| {
            let mut codec = LineCodec::new();
            let mut buf = BytesMut::with_capacity(BURST * 48);
            for i in 0..BURST {
                codec
                    .encode(format!("BCST [alice] message number {i}"), &mut buf)
                    .unwrap();
            }
            black_box(buf.len())
        })
    });

    group.finish();
}

criterion_group!(benches, decode_benchmark, encode_benchmark);
criterion_main!(benches);
