use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion};
use pdfcore::{dictionary, Document, Object, SaveOptions, Xref, XrefEntry};

fn sample_document(page_count: u32) -> Document {
    let mut doc = Document::new();
    let pages_id = doc.new_object_id();
    let page_ids: Vec<Object> = (0..page_count)
        .map(|_| {
            let page_id = doc.new_object_id();
            doc.objects.insert(
                page_id,
                dictionary! {
                    "Type" => "Page",
                    "Parent" => Object::Reference(pages_id),
                }
                .into(),
            );
            Object::Reference(page_id)
        })
        .collect();
    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => page_count as i64,
        }
        .into(),
    );
    let catalog_id = doc.new_object_id();
    doc.objects.insert(
        catalog_id,
        dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        }
        .into(),
    );
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.refresh_size();
    doc
}

fn bench_xref_insert_and_merge(c: &mut Criterion) {
    c.bench_function("xref_insert_and_merge", |b| {
        b.iter(|| {
            let mut table = Xref::new(0);
            for id in 1..=1000u32 {
                table.insert(id, XrefEntry::Normal { offset: id * 20, generation: 0 });
            }
            table.size = table.max_id() + 1;

            let mut older = Xref::new(0);
            for id in 1..=500u32 {
                older.insert(id, XrefEntry::Normal { offset: id * 10, generation: 0 });
            }
            older.size = older.max_id() + 1;

            table.merge(older);
        })
    });
}

fn bench_load_classic_xref(c: &mut Criterion) {
    let mut doc = sample_document(300);
    let buffer = doc.save_to_bytes().unwrap();

    c.bench_function("load_classic_xref", |b| {
        b.iter(|| {
            Document::load_from(Cursor::new(&buffer)).unwrap();
        })
    });
}

fn bench_load_xref_stream(c: &mut Criterion) {
    let mut doc = sample_document(300);
    let options = SaveOptions::builder().use_xref_streams(true).build();
    let mut buffer = Vec::new();
    doc.save_with_options(&mut buffer, options).unwrap();

    c.bench_function("load_xref_stream", |b| {
        b.iter(|| {
            Document::load_from(Cursor::new(&buffer)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_xref_insert_and_merge,
    bench_load_classic_xref,
    bench_load_xref_stream
);
criterion_main!(benches);
