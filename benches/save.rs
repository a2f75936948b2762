use criterion::{criterion_group, criterion_main, Criterion};
use pdfcore::{dictionary, Document, Object, SaveOptions};

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

fn bench_save_standard(c: &mut Criterion) {
    let doc = sample_document(200);

    c.bench_function("save_standard", |b| {
        b.iter(|| {
            let mut output = Vec::new();
            let mut doc_clone = doc.clone();
            doc_clone.save_to(&mut output).unwrap();
        })
    });
}

fn bench_save_modern(c: &mut Criterion) {
    let doc = sample_document(200);

    c.bench_function("save_modern", |b| {
        b.iter(|| {
            let mut output = Vec::new();
            let options = SaveOptions::builder()
                .use_xref_streams(true)
                .use_object_streams(true)
                .build();
            let mut doc_clone = doc.clone();
            doc_clone.save_with_options(&mut output, options).unwrap();
        })
    });
}

criterion_group!(benches, bench_save_standard, bench_save_modern);
criterion_main!(benches);
