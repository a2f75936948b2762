use super::key_derivation;
use super::{CryptMethod, EncryptionState};
use crate::object::{Object, StringFormat};

fn state(r: i64, stream_method: CryptMethod, string_method: CryptMethod, key_len: usize) -> EncryptionState {
    EncryptionState {
        file_key: vec![0x42u8; key_len],
        stream_method,
        string_method,
        v: if r >= 5 { 5 } else { 2 },
        r,
        encrypt_metadata: true,
    }
}

#[test]
fn rc4_string_round_trip() {
    let state = state(3, CryptMethod::Rc4, CryptMethod::Rc4, 16);
    let id = (7, 0);
    let mut obj = Object::String(b"a secret value".to_vec(), StringFormat::Literal);

    super::encrypt_object(&state, id, &mut obj).unwrap();
    assert_ne!(obj, Object::String(b"a secret value".to_vec(), StringFormat::Literal));

    super::decrypt_object(&state, id, &mut obj).unwrap();
    assert_eq!(obj, Object::String(b"a secret value".to_vec(), StringFormat::Literal));
}

#[test]
fn aes128_stream_body_round_trip() {
    use crate::dictionary::Dictionary;
    use crate::object::Stream;

    let state = state(4, CryptMethod::Aes128, CryptMethod::Aes128, 16);
    let id = (9, 0);
    let mut stream = Stream::new(Dictionary::new(), b"stream payload, sixteen+ bytes long".to_vec());
    let mut obj = Object::Stream(stream.clone());

    super::encrypt_object(&state, id, &mut obj).unwrap();
    let Object::Stream(encrypted) = &obj else { panic!("still a stream") };
    assert_ne!(encrypted.raw, stream.raw);

    super::decrypt_object(&state, id, &mut obj).unwrap();
    let Object::Stream(decrypted) = &obj else { panic!("still a stream") };
    stream.dict = decrypted.dict.clone();
    assert_eq!(decrypted.raw, stream.raw);
}

#[test]
fn r6_passwords_are_saslprep_normalized() {
    // SASLprep maps a non-ASCII-space codepoint to ordinary space (RFC 4013
    // refers to this as a "commonly mapped to nothing"/"mapped to space"
    // codepoint); an ASCII password should pass through unchanged.
    assert_eq!(key_derivation::normalize_r6_password("password"), b"password");
}

#[test]
fn object_key_differs_per_object() {
    let file_key = vec![0xAAu8; 16];
    let key_a = key_derivation::object_key(&file_key, (1, 0), false);
    let key_b = key_derivation::object_key(&file_key, (2, 0), false);
    assert_ne!(key_a, key_b);
}
