use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion};
use pdfcore::dictionary;
use pdfcore::encryption::{decrypt_object, CryptMethod, EncryptionState};
use pdfcore::object::Stream;
use pdfcore::{Dictionary, Document, Object};

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

fn bench_load_large(c: &mut Criterion) {
    let buffer = sample_document(500).save_to_bytes().unwrap();

    c.bench_function("load_large", |b| {
        b.iter(|| {
            Document::load_from(Cursor::new(&buffer)).unwrap();
        })
    });
}

// Stands in for the per-object decrypt cost `reader::load_objects_raw`/
// `load_encrypted_document` pay on every indirect object of an encrypted
// file, without needing a real owner/user-password-derived fixture.
fn bench_decrypt_streams(c: &mut Criterion) {
    let state = EncryptionState {
        file_key: vec![0x5Au8; 16],
        stream_method: CryptMethod::Aes128,
        string_method: CryptMethod::Aes128,
        v: 4,
        r: 4,
        encrypt_metadata: true,
    };
    let payload = vec![0x11u8; 4096];
    let stream = Stream::new(Dictionary::new(), payload);

    c.bench_function("decrypt_streams", |b| {
        b.iter(|| {
            let mut obj = Object::Stream(stream.clone());
            decrypt_object(&state, (1, 0), &mut obj).unwrap();
        })
    });
}

criterion_group!(benches, bench_load_large, bench_decrypt_streams);
criterion_main!(benches);
