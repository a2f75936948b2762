//! Component E: the encryption engine. Implements the PDF standard security
//! handler across every algorithm version (V1/2/4/5) and revision (R2-R6),
//! authenticates a caller-supplied password against `/O` and `/U`, derives
//! the file encryption key and per-object keys, and applies RC4/AES-128/
//! AES-256 to strings and stream bodies.

pub mod pkcs5;

mod aes_cipher;
mod key_derivation;
mod rc4;

#[cfg(test)]
mod tests;

use log::warn;

use crate::dictionary::Dictionary;
use crate::error::{DecryptionError, Result};
use crate::object::{Object, Stream};
use crate::{Document, Error, ObjectId};

pub use key_derivation::Permissions;

const PAD_BYTES: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08, 0x2E, 0x2E, 0x00,
    0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

/// The cipher actually applied to strings and stream bodies, as resolved
/// from `/V`, `/CF`, `/StmF` and `/StrF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptMethod {
    Identity,
    Rc4,
    Aes128,
    Aes256,
}

/// Everything needed to decrypt (or, symmetrically, encrypt) the objects of
/// one document: the resolved file encryption key and which cipher to run
/// it through for strings vs. streams.
#[derive(Debug, Clone)]
pub struct EncryptionState {
    pub file_key: Vec<u8>,
    pub stream_method: CryptMethod,
    pub string_method: CryptMethod,
    pub v: i64,
    pub r: i64,
    pub encrypt_metadata: bool,
}

fn pad_password(password: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let n = password.len().min(32);
    out[..n].copy_from_slice(&password[..n]);
    out[n..].copy_from_slice(&PAD_BYTES[..32 - n]);
    out
}

fn get_bytes<'a>(dict: &'a Dictionary, key: &[u8]) -> Option<&'a [u8]> {
    dict.get(key).ok().and_then(|o| o.as_str().ok())
}

fn crypt_filter_method(dict: &Dictionary, filter_name: &[u8]) -> CryptMethod {
    if filter_name == b"Identity" {
        return CryptMethod::Identity;
    }
    let cf = match dict.get(b"CF").and_then(Object::as_dict) {
        Ok(cf) => cf,
        Err(_) => return CryptMethod::Rc4,
    };
    let entry = match cf.get(filter_name).and_then(Object::as_dict) {
        Ok(entry) => entry,
        Err(_) => return CryptMethod::Rc4,
    };
    match entry.get(b"CFM").and_then(Object::as_name) {
        Ok(b"V2") => CryptMethod::Rc4,
        Ok(b"AESV2") => CryptMethod::Aes128,
        Ok(b"AESV3") => CryptMethod::Aes256,
        Ok(b"None") => CryptMethod::Identity,
        _ => CryptMethod::Rc4,
    }
}

impl EncryptionState {
    /// Authenticate `password` against the document's `/Encrypt` dictionary
    /// (trying it first as the user password, then, per §3.6's algorithm 7,
    /// as the owner password) and derive the file encryption key.
    pub fn decode(document: &Document, password: &str) -> Result<EncryptionState> {
        let encrypt_ref = document
            .trailer
            .get(b"Encrypt")
            .and_then(Object::as_reference)
            .map_err(|_| Error::Decryption(DecryptionError::MissingEntry("Encrypt")))?;
        let encrypt_obj = document
            .objects
            .get(&encrypt_ref)
            .ok_or(Error::Decryption(DecryptionError::MissingEntry("Encrypt")))?;
        let dict = encrypt_obj.as_dict()?;

        let v = dict.get(b"V").and_then(Object::as_i64).unwrap_or(0);
        let r = dict.get(b"R").and_then(Object::as_i64).unwrap_or(2);
        let length_bits = dict.get(b"Length").and_then(Object::as_i64).unwrap_or(40);
        let encrypt_metadata = dict.get(b"EncryptMetadata").and_then(Object::as_bool).unwrap_or(true);

        let id0 = document
            .trailer
            .get(b"ID")
            .and_then(Object::as_array)
            .ok()
            .and_then(|a| a.first())
            .and_then(|o| o.as_str().ok())
            .unwrap_or(&[]);

        let o = get_bytes(dict, b"O").ok_or(DecryptionError::MissingEntry("O"))?;
        let u = get_bytes(dict, b"U").ok_or(DecryptionError::MissingEntry("U"))?;
        let p = dict.get(b"P").and_then(Object::as_i64).unwrap_or(0) as i32;

        let (file_key, _perms_ok) = if r >= 5 {
            let oe = get_bytes(dict, b"OE").unwrap_or(&[]);
            let ue = get_bytes(dict, b"UE").unwrap_or(&[]);
            let perms = get_bytes(dict, b"Perms").unwrap_or(&[]);
            let normalized = key_derivation::normalize_r6_password(password);
            let key = key_derivation::authenticate_r6(&normalized, o, u, oe, ue, r)?;
            let perms_ok = key_derivation::check_perms(&key, perms, p, encrypt_metadata).unwrap_or(false);
            if !perms_ok {
                warn!("/Perms validation failed for R6 AES-256 encryption dictionary");
            }
            (key, perms_ok)
        } else {
            let key_len_bytes = (length_bits / 8).clamp(5, 16) as usize;
            let key = key_derivation::authenticate_r234(password.as_bytes(), o, u, p, id0, key_len_bytes, r, encrypt_metadata)?;
            (key, true)
        };

        let (stream_method, string_method) = if v >= 4 {
            let stmf = dict.get(b"StmF").and_then(Object::as_name).unwrap_or(b"Identity");
            let strf = dict.get(b"StrF").and_then(Object::as_name).unwrap_or(b"Identity");
            (crypt_filter_method(dict, stmf), crypt_filter_method(dict, strf))
        } else {
            (CryptMethod::Rc4, CryptMethod::Rc4)
        };

        Ok(EncryptionState {
            file_key,
            stream_method,
            string_method,
            v,
            r,
            encrypt_metadata,
        })
    }

    fn object_key(&self, id: ObjectId, aes: bool) -> Vec<u8> {
        if self.r >= 5 {
            return self.file_key.clone();
        }
        key_derivation::object_key(&self.file_key, id, aes)
    }
}

fn apply_method(method: CryptMethod, key: &[u8], data: &[u8], encrypting: bool) -> Result<Vec<u8>> {
    match method {
        CryptMethod::Identity => Ok(data.to_vec()),
        CryptMethod::Rc4 => Ok(rc4::rc4(key, data)),
        CryptMethod::Aes128 | CryptMethod::Aes256 => {
            if encrypting {
                aes_cipher::encrypt(key, data)
            } else {
                aes_cipher::decrypt(key, data)
            }
        }
    }
}

fn transform_object(state: &EncryptionState, id: ObjectId, obj: &mut Object, encrypting: bool) -> Result<()> {
    match obj {
        Object::String(bytes, _) => {
            let aes = matches!(state.string_method, CryptMethod::Aes128 | CryptMethod::Aes256);
            let key = state.object_key(id, aes);
            *bytes = apply_method(state.string_method, &key, bytes, encrypting)?;
        }
        Object::Array(arr) => {
            for item in arr.iter_mut() {
                transform_object(state, id, item, encrypting)?;
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                transform_object(state, id, value, encrypting)?;
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                transform_object(state, id, value, encrypting)?;
            }
            transform_stream_body(state, id, stream, encrypting)?;
        }
        _ => {}
    }
    Ok(())
}

fn transform_stream_body(state: &EncryptionState, id: ObjectId, stream: &mut Stream, encrypting: bool) -> Result<()> {
    let is_metadata = stream.dict.has_type(b"Metadata");
    if is_metadata && !state.encrypt_metadata {
        return Ok(());
    }
    let uses_identity_crypt = stream
        .filters()
        .first()
        .is_some_and(|(name, _)| name == b"Crypt");
    if uses_identity_crypt {
        return Ok(());
    }
    let aes = matches!(state.stream_method, CryptMethod::Aes128 | CryptMethod::Aes256);
    let key = state.object_key(id, aes);
    stream.raw = apply_method(state.stream_method, &key, &stream.raw, encrypting)?;
    Ok(())
}

/// Decrypt every string and stream body reachable from `obj` in place, using
/// the per-object key derived from `id`.
pub fn decrypt_object(state: &EncryptionState, id: ObjectId, obj: &mut Object) -> Result<()> {
    transform_object(state, id, obj, false)
}

/// Encrypt every string and stream body reachable from `obj` in place, the
/// mirror of [`decrypt_object`] used when writing an encrypted document.
pub fn encrypt_object(state: &EncryptionState, id: ObjectId, obj: &mut Object) -> Result<()> {
    transform_object(state, id, obj, true)
}
