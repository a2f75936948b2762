use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{CodecError, Result};
use crate::Error;

pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::Codec(CodecError::FilterDecodeFailed(format!("flate: {e}"))))?;
    Ok(out)
}

pub fn encode(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| Error::Codec(CodecError::FilterDecodeFailed(format!("flate: {e}"))))?;
    encoder
        .finish()
        .map_err(|e| Error::Codec(CodecError::FilterDecodeFailed(format!("flate: {e}"))))
}
