use crate::dictionary::Dictionary;
use crate::object::Object;
use crate::Document;

fn build_document(page_count: u32, outline_titles: &[&str]) -> Document {
    let mut doc = Document::new();

    let pages_id = doc.new_object_id();
    let mut page_ids = Vec::new();
    for _ in 0..page_count {
        let page_id = doc.new_object_id();
        doc.objects.insert(
            page_id,
            Object::Dictionary({
                let mut d = Dictionary::new();
                d.set("Type", Object::Name(b"Page".to_vec()));
                d.set("Parent", Object::Reference(pages_id));
                d
            }),
        );
        page_ids.push(page_id);
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary({
            let mut d = Dictionary::new();
            d.set("Type", Object::Name(b"Pages".to_vec()));
            d.set("Kids", Object::Array(page_ids.iter().map(|&id| Object::Reference(id)).collect()));
            d.set("Count", Object::Integer(page_count as i64));
            d
        }),
    );

    let catalog_id = doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    if !outline_titles.is_empty() {
        let outlines_id = doc.new_object_id();
        let item_ids: Vec<_> = outline_titles.iter().map(|_| doc.new_object_id()).collect();
        for (i, (&item_id, &title)) in item_ids.iter().zip(outline_titles.iter()).enumerate() {
            let mut item = Dictionary::new();
            item.set("Title", Object::string_literal(title));
            item.set("Parent", Object::Reference(outlines_id));
            if i > 0 {
                item.set("Prev", Object::Reference(item_ids[i - 1]));
            }
            if i + 1 < item_ids.len() {
                item.set("Next", Object::Reference(item_ids[i + 1]));
            }
            doc.objects.insert(item_id, Object::Dictionary(item));
        }
        let mut outlines = Dictionary::new();
        outlines.set("Type", Object::Name(b"Outlines".to_vec()));
        outlines.set("Count", Object::Integer(item_ids.len() as i64));
        if let Some(&first) = item_ids.first() {
            outlines.set("First", Object::Reference(first));
        }
        if let Some(&last) = item_ids.last() {
            outlines.set("Last", Object::Reference(last));
        }
        doc.objects.insert(outlines_id, Object::Dictionary(outlines));
        catalog.set("Outlines", Object::Reference(outlines_id));
    }

    doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.refresh_size();
    doc
}

// S6: merge doc A (3 pages, 1 outline root) into B (2 pages, no outlines) ->
// 5 pages; 1 outline root on the merged document.
#[test]
fn merge_pages_and_adopts_source_outline() {
    let source = build_document(3, &["Chapter 1"]);
    let mut dest = build_document(2, &[]);

    dest.insert_pages(&source, None).unwrap();

    let pages = dest.get_pages();
    assert_eq!(pages.len(), 5);

    let catalog = dest.get_catalog().unwrap();
    let outlines_ref = catalog.get(b"Outlines").and_then(Object::as_reference).unwrap();
    let outlines = dest.get_dictionary(outlines_ref).unwrap();
    assert_eq!(outlines.get(b"Count").and_then(Object::as_i64).unwrap(), 1);

    // every reference in the merged graph resolves (invariant 7)
    for id in dest.reachable_objects() {
        assert!(dest.get_object(id).is_ok());
    }
}

#[test]
fn merge_appends_to_existing_outline() {
    let source = build_document(1, &["From source"]);
    let mut dest = build_document(1, &["From dest"]);

    dest.insert_pages(&source, None).unwrap();

    let catalog = dest.get_catalog().unwrap();
    let outlines_ref = catalog.get(b"Outlines").and_then(Object::as_reference).unwrap();
    let outlines = dest.get_dictionary(outlines_ref).unwrap();
    assert_eq!(outlines.get(b"Count").and_then(Object::as_i64).unwrap(), 2);

    let first = outlines.get(b"First").and_then(Object::as_reference).unwrap();
    let last = outlines.get(b"Last").and_then(Object::as_reference).unwrap();
    assert_ne!(first, last);

    let first_next = dest.get_dictionary(first).unwrap().get(b"Next").and_then(Object::as_reference).unwrap();
    assert_eq!(first_next, last);
}

#[test]
fn merge_selected_pages_only() {
    let source = build_document(3, &[]);
    let mut dest = build_document(1, &[]);

    dest.insert_pages(&source, Some(&[2])).unwrap();

    assert_eq!(dest.get_pages().len(), 2);
}
