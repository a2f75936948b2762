use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion};
use pdfcore::writer::{ObjectStreamBuilder, ObjectStreamConfig};
use pdfcore::{dictionary, Document, Object, SaveOptions};

fn document_with_packable_objects(count: u32) -> Document {
    let mut doc = Document::new();
    for i in 0..count {
        let id = doc.new_object_id();
        doc.objects.insert(
            id,
            dictionary! {
                "Type" => "TestObj",
                "Value" => Object::Integer(i as i64),
            }
            .into(),
        );
    }
    doc.refresh_size();
    doc
}

fn bench_object_stream_compress(c: &mut Criterion) {
    let doc = document_with_packable_objects(100);
    let config = ObjectStreamConfig::default();

    c.bench_function("object_stream_compress", |b| {
        b.iter(|| {
            let mut doc_clone = doc.clone();
            let _ = ObjectStreamBuilder::build(&mut doc_clone, &config, None).unwrap();
        })
    });
}

fn bench_object_stream_parse(c: &mut Criterion) {
    let mut doc = document_with_packable_objects(100);
    let options = SaveOptions::builder().use_xref_streams(true).use_object_streams(true).build();
    let mut buffer = Vec::new();
    doc.save_with_options(&mut buffer, options).unwrap();

    c.bench_function("object_stream_parse", |b| {
        b.iter(|| {
            let _ = Document::load_from(Cursor::new(&buffer)).unwrap();
        })
    });
}

criterion_group!(benches, bench_object_stream_compress, bench_object_stream_parse);
criterion_main!(benches);
