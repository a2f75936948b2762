use crate::error::{CodecError, Result};
use crate::Error;

/// PackBits-style run-length decoding: a length byte `0..=127` means
/// "copy the next `n+1` bytes literally"; `129..=255` means "repeat the
/// following byte `257-n` times"; `128` is the end-of-data marker.
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < data.len() {
        let length = data[i];
        i += 1;
        match length {
            0..=127 => {
                let n = length as usize + 1;
                let end = i + n;
                if end > data.len() {
                    return Err(Error::Codec(CodecError::TruncatedStream));
                }
                out.extend_from_slice(&data[i..end]);
                i = end;
            }
            128 => break,
            _ => {
                if i >= data.len() {
                    return Err(Error::Codec(CodecError::TruncatedStream));
                }
                let count = 257 - length as usize;
                out.extend(std::iter::repeat(data[i]).take(count));
                i += 1;
            }
        }
    }
    Ok(out)
}

pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < data.len() {
        let run_end = i + data[i..].iter().take_while(|&&b| b == data[i]).count();
        let run_len = run_end - i;
        if run_len >= 2 {
            let mut remaining = run_len;
            let mut pos = i;
            while remaining > 0 {
                let take = remaining.min(128);
                out.push((257 - take) as u8);
                out.push(data[pos]);
                remaining -= take;
                pos += take;
            }
            i = run_end;
        } else {
            let lit_start = i;
            let mut j = i;
            while j < data.len() && j - lit_start < 128 {
                let next_run = data[j..].iter().take_while(|&&b| b == data[j]).count();
                if next_run >= 2 {
                    break;
                }
                j += 1;
            }
            out.push((j - lit_start - 1) as u8);
            out.extend_from_slice(&data[lit_start..j]);
            i = j;
        }
    }
    out.push(128);
    out
}
