use crate::dictionary::Dictionary;
use crate::object::{Object, Stream};

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

// S5: a stream piped through FlateDecode then ASCII85Decode decodes back
// to the original payload, and re-encoding reproduces the original raw bytes.
#[test]
fn flate_then_ascii85_round_trip() {
    let mut stream = stream_with_filters(&["FlateDecode", "ASCII85Decode"], b"Hello");
    stream.encode().unwrap();
    let original_raw = stream.raw.clone();

    stream.content = None;
    stream.decode().unwrap();
    assert_eq!(stream.content.as_deref(), Some(b"Hello".as_slice()));

    stream.encode().unwrap();
    assert_eq!(stream.raw, original_raw);
}

#[test]
fn ascii_hex_round_trip() {
    let mut stream = stream_with_filters(&["ASCIIHexDecode"], b"binary\x00\x01\x02data");
    stream.encode().unwrap();
    stream.content = None;
    stream.decode().unwrap();
    assert_eq!(stream.content.as_deref(), Some(b"binary\x00\x01\x02data".as_slice()));
}

#[test]
fn run_length_round_trip() {
    let payload = b"aaaaaaaaaabbbbbccccccccccccccccc";
    let mut stream = stream_with_filters(&["RunLengthDecode"], payload);
    stream.encode().unwrap();
    stream.content = None;
    stream.decode().unwrap();
    assert_eq!(stream.content.as_deref(), Some(payload.as_slice()));
}

#[test]
fn lzw_round_trip() {
    let payload = b"The quick brown fox jumps over the lazy dog. The quick brown fox.";
    let mut stream = stream_with_filters(&["LZWDecode"], payload);
    stream.encode().unwrap();
    stream.content = None;
    stream.decode().unwrap();
    assert_eq!(stream.content.as_deref(), Some(payload.as_slice()));
}

// No /Filter at all: content is copied straight to raw, uncompressed.
#[test]
fn no_filter_is_identity() {
    let mut stream = Stream::new(Dictionary::new(), Vec::new());
    stream.set_content(b"plain bytes".to_vec());
    stream.encode().unwrap();
    assert_eq!(stream.raw, b"plain bytes");
    assert_eq!(stream.dict.get(b"Length").and_then(Object::as_i64).unwrap(), 11);
}

#[test]
fn unsupported_filter_name_errors() {
    let mut dict = Dictionary::new();
    dict.set("Filter", Object::Name(b"BogusDecode".to_vec()));
    let mut stream = Stream::new(dict, b"data".to_vec());
    assert!(stream.decode().is_err());
}
