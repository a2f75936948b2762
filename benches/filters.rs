use criterion::{criterion_group, criterion_main, Criterion};
use pdfcore::object::Stream;
use pdfcore::{Dictionary, Object};

fn stream_with_filters(filters: &[&str], content: &[u8]) -> Stream {
    let mut dict = Dictionary::new();
    if filters.len() == 1 {
        dict.set("Filter", Object::Name(filters[0].as_bytes().to_vec()));
    } else {
        dict.set(
            "Filter",
            Object::Array(filters.iter().map(|f| Object::Name(f.as_bytes().to_vec())).collect()),
        );
    }
    let mut stream = Stream::new(dict, Vec::new());
    stream.set_content(content.to_vec());
    stream
}

fn page_content_payload() -> Vec<u8> {
    "BT /F1 12 Tf 72 720 Td (Hello, world!) Tj ET\n".repeat(400).into_bytes()
}

fn bench_flate_encode(c: &mut Criterion) {
    let payload = page_content_payload();

    c.bench_function("flate_encode", |b| {
        b.iter(|| {
            let mut stream = stream_with_filters(&["FlateDecode"], &payload);
            stream.encode().unwrap();
        })
    });
}

fn bench_flate_decode(c: &mut Criterion) {
    let payload = page_content_payload();
    let mut stream = stream_with_filters(&["FlateDecode"], &payload);
    stream.encode().unwrap();
    let raw = stream.raw.clone();
    let dict = stream.dict.clone();

    c.bench_function("flate_decode", |b| {
        b.iter(|| {
            let mut stream = Stream::new(dict.clone(), raw.clone());
            stream.decode().unwrap();
        })
    });
}

fn bench_lzw_round_trip(c: &mut Criterion) {
    let payload = page_content_payload();

    c.bench_function("lzw_round_trip", |b| {
        b.iter(|| {
            let mut stream = stream_with_filters(&["LZWDecode"], &payload);
            stream.encode().unwrap();
            stream.content = None;
            stream.decode().unwrap();
        })
    });
}

criterion_group!(benches, bench_flate_encode, bench_flate_decode, bench_lzw_round_trip);
criterion_main!(benches);
