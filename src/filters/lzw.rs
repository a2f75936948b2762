use weezl::{decode::Decoder, encode::Encoder, BitOrder};

use crate::error::{CodecError, Result};
use crate::object::FilterParams;
use crate::Error;

const EARLY_CHANGE_DEFAULT: i64 = 1;

/// PDF's `LZWDecode` is TIFF-flavored MSB-first LZW with a one-code
/// "early change" by default, tunable via `/EarlyChange` in `DecodeParms`.
pub fn decode(data: &[u8], parms: &FilterParams) -> Result<Vec<u8>> {
    let early_change = parms.get_i64(b"EarlyChange", EARLY_CHANGE_DEFAULT);
    let mut decoder = Decoder::with_tiff_size_switch(BitOrder::Msb, 8);
    if early_change == 0 {
        decoder = Decoder::new(BitOrder::Msb, 8);
    }
    decoder
        .decode(data)
        .map_err(|e| Error::Codec(CodecError::FilterDecodeFailed(format!("lzw: {e}"))))
}

pub fn encode(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = Encoder::with_tiff_size_switch(BitOrder::Msb, 8);
    encoder
        .encode(data)
        .map_err(|e| Error::Codec(CodecError::FilterDecodeFailed(format!("lzw: {e}"))))
}
