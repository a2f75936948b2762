use bitflags::bitflags;
use md5::{Digest, Md5};
use sha2::{Sha256, Sha384, Sha512};

use super::{aes_cipher, pad_password, rc4};
use crate::error::{DecryptionError, Result};
use crate::{Error, ObjectId};

bitflags! {
    /// `/P` permission bits (§7.6.4.2, Table 22). Bits are numbered from 1 in
    /// the spec; stored here zero-indexed via `bitflags`' own bit values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Permissions: u32 {
        const PRINT                = 1 << 2;
        const MODIFY               = 1 << 3;
        const COPY                 = 1 << 4;
        const ANNOTATE             = 1 << 5;
        const FILL_FORMS           = 1 << 8;
        const EXTRACT_ACCESSIBILITY = 1 << 9;
        const ASSEMBLE             = 1 << 10;
        const PRINT_HIGH_RES       = 1 << 11;
    }
}

impl Permissions {
    pub fn from_p(p: i32) -> Permissions {
        Permissions::from_bits_truncate(p as u32)
    }
}

/// R6 passwords are UTF-8 and SASLprep-normalized before hashing (§7.6.4.3.3);
/// a password that fails to normalize (contains a prohibited codepoint) is
/// hashed as-given, per the same fallback real-world PDF producers use.
pub fn normalize_r6_password(password: &str) -> Vec<u8> {
    stringprep::saslprep(password)
        .map(|normalized| normalized.into_owned().into_bytes())
        .unwrap_or_else(|_| password.as_bytes().to_vec())
}

/// Standard security handler key derivation for R2-R4 (Algorithm 2, §7.6.3.3),
/// tried first as the user password and, on mismatch, as the owner password
/// (Algorithm 7, §7.6.3.4).
pub fn authenticate_r234(
    password: &[u8], o: &[u8], u: &[u8], p: i32, id0: &[u8], key_len: usize, r: i64, encrypt_metadata: bool,
) -> Result<Vec<u8>> {
    if let Ok(key) = try_user_password_r234(password, o, p, id0, key_len, r, encrypt_metadata, u) {
        return Ok(key);
    }

    // Algorithm 7: recover the user password from O under an owner-derived
    // RC4 key, then redo the user-password check with it.
    let owner_key = compute_owner_rc4_key(password, r, key_len);
    let user_password = recover_user_password(&owner_key, o, r);
    try_user_password_r234(&user_password, o, p, id0, key_len, r, encrypt_metadata, u)
        .map_err(|_| Error::Decryption(DecryptionError::WrongPassword))
}

fn compute_owner_rc4_key(owner_password: &[u8], r: i64, key_len: usize) -> Vec<u8> {
    let padded = pad_password(owner_password);
    let mut hasher = Md5::new();
    hasher.update(padded);
    let mut digest = hasher.finalize().to_vec();
    if r >= 3 {
        for _ in 0..50 {
            let mut h = Md5::new();
            h.update(&digest[..key_len]);
            digest = h.finalize().to_vec();
        }
    }
    digest[..key_len].to_vec()
}

fn recover_user_password(owner_key: &[u8], o: &[u8], r: i64) -> Vec<u8> {
    if r == 2 {
        rc4::rc4(owner_key, o)
    } else {
        let mut data = o.to_vec();
        for i in 0..20u8 {
            let round_key: Vec<u8> = owner_key.iter().map(|b| b ^ (19 - i)).collect();
            data = rc4::rc4(&round_key, &data);
        }
        data
    }
}

fn try_user_password_r234(
    password: &[u8], o: &[u8], p: i32, id0: &[u8], key_len: usize, r: i64, encrypt_metadata: bool, u: &[u8],
) -> Result<Vec<u8>> {
    let key = compute_file_key_r234(password, o, p, id0, key_len, r, encrypt_metadata);
    let computed_u = compute_u_r234(&key, id0, r);
    let matches = if r == 2 {
        computed_u == u
    } else {
        computed_u.get(..16) == u.get(..16)
    };
    if matches {
        Ok(key)
    } else {
        Err(Error::Decryption(DecryptionError::WrongPassword))
    }
}

/// Algorithm 2: derive the file encryption key from the padded user
/// password, `/O`, `/P`, the first `/ID` element and, for R4 with
/// `EncryptMetadata == false`, four `0xFF` bytes.
fn compute_file_key_r234(password: &[u8], o: &[u8], p: i32, id0: &[u8], key_len: usize, r: i64, encrypt_metadata: bool) -> Vec<u8> {
    let padded = pad_password(password);
    let mut hasher = Md5::new();
    hasher.update(padded);
    hasher.update(o.get(..32).unwrap_or(o));
    hasher.update(p.to_le_bytes());
    hasher.update(id0);
    if r >= 4 && !encrypt_metadata {
        hasher.update([0xFF, 0xFF, 0xFF, 0xFF]);
    }
    let mut digest = hasher.finalize().to_vec();

    if r >= 3 {
        for _ in 0..50 {
            let mut h = Md5::new();
            h.update(&digest[..key_len]);
            digest = h.finalize().to_vec();
        }
    }
    digest[..key_len].to_vec()
}

/// Algorithm 4 (R2) / Algorithm 5 (R3/R4): derive the value that should
/// match `/U`.
fn compute_u_r234(key: &[u8], id0: &[u8], r: i64) -> Vec<u8> {
    if r == 2 {
        rc4::rc4(key, &PAD_BYTES_LOCAL)
    } else {
        let mut hasher = Md5::new();
        hasher.update(PAD_BYTES_LOCAL);
        hasher.update(id0);
        let digest = hasher.finalize();
        let mut data = digest.to_vec();
        for i in 0..20u8 {
            let round_key: Vec<u8> = key.iter().map(|b| b ^ i).collect();
            data = rc4::rc4(&round_key, &data);
        }
        data.resize(32, 0);
        data
    }
}

const PAD_BYTES_LOCAL: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08, 0x2E, 0x2E, 0x00,
    0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

/// Per-object key derivation (Algorithm 1, §7.6.2): append the low three
/// bytes of the object number and low two bytes of the generation number
/// (plus, for AES, the literal `sAlT` bytes) and MD5-hash, truncating to
/// `min(file_key.len() + 5, 16)` bytes.
pub fn object_key(file_key: &[u8], id: ObjectId, aes: bool) -> Vec<u8> {
    let mut hasher = Md5::new();
    hasher.update(file_key);
    hasher.update([(id.0 & 0xFF) as u8, ((id.0 >> 8) & 0xFF) as u8, ((id.0 >> 16) & 0xFF) as u8]);
    hasher.update([(id.1 & 0xFF) as u8, ((id.1 >> 8) & 0xFF) as u8]);
    if aes {
        hasher.update([0x73, 0x41, 0x6C, 0x54]);
    }
    let digest = hasher.finalize();
    let len = (file_key.len() + 5).min(16);
    digest[..len].to_vec()
}

/// Hardened hash used by revision 6 (ISO 32000-2 Algorithm 2.B): repeatedly
/// SHA-256/384/512-hash `(input || password || [user_key])` 64+ rounds,
/// selecting the next round's hash function from the last round's output.
fn hash_r6(password: &[u8], salt: &[u8], user_key: &[u8]) -> Vec<u8> {
    let mut k = {
        let mut h = Sha256::new();
        h.update(password);
        h.update(salt);
        h.update(user_key);
        h.finalize().to_vec()
    };

    let mut round = 0;
    loop {
        let mut k1 = Vec::with_capacity(64 * (password.len() + k.len() + user_key.len()));
        for _ in 0..64 {
            k1.extend_from_slice(password);
            k1.extend_from_slice(&k);
            k1.extend_from_slice(user_key);
        }

        let e = aes_cipher::cbc_no_iv_no_pad_with_iv(&k[..16], &k[16..32], &k1, true);

        let modulus: u32 = e[..16].iter().map(|&b| b as u32).sum::<u32>() % 3;
        k = match modulus {
            0 => {
                let mut h = Sha256::new();
                h.update(&e);
                h.finalize().to_vec()
            }
            1 => {
                let mut h = Sha384::new();
                h.update(&e);
                h.finalize().to_vec()
            }
            _ => {
                let mut h = Sha512::new();
                h.update(&e);
                h.finalize().to_vec()
            }
        };

        round += 1;
        if round >= 64 && *e.last().unwrap_or(&0) as usize <= round - 32 {
            break;
        }
    }
    k[..32].to_vec()
}

/// R5/R6 authentication (ISO 32000-2 §7.6.4.3.3/.4): try the user password,
/// then the owner password, deriving the file key from `/UE`/`/OE` via the
/// intermediate key on success.
pub fn authenticate_r6(password: &[u8], o: &[u8], u: &[u8], oe: &[u8], ue: &[u8], r: i64) -> Result<Vec<u8>> {
    if u.len() < 48 || o.len() < 48 {
        return Err(Error::Decryption(DecryptionError::MissingEntry("U/O")));
    }
    let password = &password[..password.len().min(127)];

    let u_validation_salt = &u[32..40];
    let u_key_salt = &u[40..48];
    let computed_u = if r == 5 {
        let mut h = Sha256::new();
        h.update(password);
        h.update(u_validation_salt);
        h.finalize().to_vec()
    } else {
        hash_r6(password, u_validation_salt, &[])
    };

    if computed_u == u[..32] {
        let intermediate = if r == 5 {
            let mut h = Sha256::new();
            h.update(password);
            h.update(u_key_salt);
            h.finalize().to_vec()
        } else {
            hash_r6(password, u_key_salt, &[])
        };
        let key_array: [u8; 32] = intermediate.try_into().map_err(|_| Error::Decryption(DecryptionError::InvalidKeyLength))?;
        let file_key = aes_cipher::cbc_no_iv_no_pad(&key_array, ue, false);
        return Ok(file_key);
    }

    let o_validation_salt = &o[32..40];
    let o_key_salt = &o[40..48];
    let computed_o = if r == 5 {
        let mut h = Sha256::new();
        h.update(password);
        h.update(o_validation_salt);
        h.update(&u[..48]);
        h.finalize().to_vec()
    } else {
        hash_r6(password, o_validation_salt, &u[..48])
    };

    if computed_o == o[..32] {
        let intermediate = if r == 5 {
            let mut h = Sha256::new();
            h.update(password);
            h.update(o_key_salt);
            h.update(&u[..48]);
            h.finalize().to_vec()
        } else {
            hash_r6(password, o_key_salt, &u[..48])
        };
        let key_array: [u8; 32] = intermediate.try_into().map_err(|_| Error::Decryption(DecryptionError::InvalidKeyLength))?;
        let file_key = aes_cipher::cbc_no_iv_no_pad(&key_array, oe, false);
        return Ok(file_key);
    }

    Err(Error::Decryption(DecryptionError::WrongPassword))
}

/// Validate `/Perms` (§7.6.4.3.5): decrypting it with the file key under
/// AES-256 ECB should reveal the low 4 bytes of `/P` followed by `adb` and
/// then `T`/`F` for `/EncryptMetadata`.
pub fn check_perms(file_key: &[u8], perms: &[u8], p: i32, encrypt_metadata: bool) -> Option<bool> {
    if perms.len() != 16 || file_key.len() != 32 {
        return None;
    }
    let key: [u8; 32] = file_key.try_into().ok()?;
    let block: [u8; 16] = perms.try_into().ok()?;
    let decoded = aes_cipher::decrypt_ecb_no_pad(&key, &block);

    let decoded_p = i32::from_le_bytes(decoded[0..4].try_into().ok()?);
    let magic_ok = &decoded[9..12] == b"adb";
    let metadata_flag_ok = (decoded[8] == b'T') == encrypt_metadata;
    Some(decoded_p == p && magic_ok && metadata_flag_ok)
}
