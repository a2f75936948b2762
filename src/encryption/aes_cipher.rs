use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use super::pkcs5::Pkcs5;
use crate::error::{DecryptionError, Result};
use crate::Error;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// PDF's AES usage prefixes every ciphertext with a random 16-byte IV and
/// pads the plaintext with PKCS#5, per §7.6.2.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut iv = [0u8; 16];
    getrandom::fill(&mut iv).map_err(|e| Error::InvalidStream(e.to_string()))?;

    let mut buf = vec![0u8; plaintext.len() + 16];
    buf[..plaintext.len()].copy_from_slice(plaintext);

    let ciphertext = match key.len() {
        16 => Aes128CbcEnc::new(key.into(), &iv.into())
            .encrypt_padded_mut::<Pkcs5>(&mut buf, plaintext.len())
            .map_err(|_| Error::Decryption(DecryptionError::InvalidKeyLength))?
            .to_vec(),
        32 => Aes256CbcEnc::new(key.into(), &iv.into())
            .encrypt_padded_mut::<Pkcs5>(&mut buf, plaintext.len())
            .map_err(|_| Error::Decryption(DecryptionError::InvalidKeyLength))?
            .to_vec(),
        _ => return Err(Error::Decryption(DecryptionError::InvalidKeyLength)),
    };

    let mut out = Vec::with_capacity(16 + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

pub fn decrypt(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < 16 {
        return Ok(Vec::new());
    }
    let (iv, ciphertext) = data.split_at(16);
    let mut buf = ciphertext.to_vec();

    let plaintext: &[u8] = match key.len() {
        16 => Aes128CbcDec::new(key.into(), iv.into())
            .decrypt_padded_mut::<Pkcs5>(&mut buf)
            .map_err(|_| Error::Decryption(DecryptionError::InvalidKeyLength))?,
        32 => Aes256CbcDec::new(key.into(), iv.into())
            .decrypt_padded_mut::<Pkcs5>(&mut buf)
            .map_err(|_| Error::Decryption(DecryptionError::InvalidKeyLength))?,
        _ => return Err(Error::Decryption(DecryptionError::InvalidKeyLength)),
    };
    Ok(plaintext.to_vec())
}

/// AES-256 ECB, no padding: used only for `/Perms` (16 bytes, always a
/// whole block).
pub fn decrypt_ecb_no_pad(key: &[u8; 32], data: &[u8; 16]) -> [u8; 16] {
    use ecb::cipher::{BlockDecryptMut as EcbBlockDecryptMut, KeyInit};
    let mut block = *data;
    let dec = ecb::Decryptor::<aes::Aes256>::new(key.into());
    dec.decrypt_block_mut((&mut block).into());
    block
}

pub fn cbc_no_iv_no_pad(key: &[u8; 32], data: &[u8], encrypting: bool) -> Vec<u8> {
    let iv = [0u8; 16];
    let mut buf = data.to_vec();
    if encrypting {
        let mut enc = Aes256CbcEnc::new(key.into(), &iv.into());
        for chunk in buf.chunks_exact_mut(16) {
            let block = aes::cipher::generic_array::GenericArray::from_mut_slice(chunk);
            enc.encrypt_block_mut(block);
        }
    } else {
        let mut dec = Aes256CbcDec::new(key.into(), &iv.into());
        for chunk in buf.chunks_exact_mut(16) {
            let block = aes::cipher::generic_array::GenericArray::from_mut_slice(chunk);
            dec.decrypt_block_mut(block);
        }
    }
    buf
}

/// AES-128-CBC under an explicit key/IV with no padding, block-exact input
/// only: the inner step of revision 6's hardened password hash
/// (ISO 32000-2 Algorithm 2.B), which always hands in a multiple-of-64-bytes
/// buffer.
pub fn cbc_no_iv_no_pad_with_iv(key: &[u8], iv: &[u8], data: &[u8], encrypting: bool) -> Vec<u8> {
    let mut buf = data.to_vec();
    if encrypting {
        let mut enc = Aes128CbcEnc::new(key.into(), iv.into());
        for chunk in buf.chunks_exact_mut(16) {
            let block = aes::cipher::generic_array::GenericArray::from_mut_slice(chunk);
            enc.encrypt_block_mut(block);
        }
    } else {
        let mut dec = Aes128CbcDec::new(key.into(), iv.into());
        for chunk in buf.chunks_exact_mut(16) {
            let block = aes::cipher::generic_array::GenericArray::from_mut_slice(chunk);
            dec.decrypt_block_mut(block);
        }
    }
    buf
}
