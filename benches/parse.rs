use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion};
use pdfcore::{dictionary, Document, IncrementalDocument, Object};

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

fn bench_load(c: &mut Criterion) {
    let buffer = sample_document(50).save_to_bytes().unwrap();

    c.bench_function("load", |b| {
        b.iter(|| {
            Document::load_from(Cursor::new(&buffer)).unwrap();
        })
    });
}

fn bench_load_incremental_pdf(c: &mut Criterion) {
    let original = sample_document(10).save_to_bytes().unwrap();
    let mut incremental: IncrementalDocument = original.as_slice().try_into().unwrap();
    incremental.document.new_object_id();
    let mut buffer = Vec::new();
    incremental.save_to(&mut buffer).unwrap();

    c.bench_function("load_incremental_pdf", |b| {
        b.iter(|| {
            Document::load_from(Cursor::new(&buffer)).unwrap();
        })
    });
}

criterion_group!(benches, bench_load, bench_load_incremental_pdf);
criterion_main!(benches);
