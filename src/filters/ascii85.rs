use crate::error::{CodecError, Result};
use crate::Error;

/// Decode an ASCII base-85 stream (Adobe's variant: `z` expands to four
/// zero bytes, terminator is `~>`).
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut group = [0u8; 5];
    let mut group_len = 0usize;

    let mut iter = data.iter().copied().filter(|&b| !b.is_ascii_whitespace());
    while let Some(b) = iter.next() {
        if b == b'~' {
            break;
        }
        if b == b'z' && group_len == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        if !(b'!'..=b'u').contains(&b) {
            return Err(Error::Codec(CodecError::FilterDecodeFailed("ascii85: invalid byte".into())));
        }
        group[group_len] = b - b'!';
        group_len += 1;
        if group_len == 5 {
            push_group(&mut out, &group, 5);
            group_len = 0;
        }
    }
    let _ = iter;

    if group_len > 0 {
        for slot in group.iter_mut().skip(group_len) {
            *slot = 84;
        }
        push_group(&mut out, &group, group_len);
    }

    Ok(out)
}

fn push_group(out: &mut Vec<u8>, group: &[u8; 5], len: usize) {
    let value = group.iter().fold(0u32, |acc, &d| acc.wrapping_mul(85).wrapping_add(d as u32));
    let bytes = value.to_be_bytes();
    out.extend_from_slice(&bytes[..len - 1]);
}

pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 5 / 4 + 2);
    for chunk in data.chunks(4) {
        let mut buf = [0u8; 4];
        buf[..chunk.len()].copy_from_slice(chunk);
        let value = u32::from_be_bytes(buf);

        if chunk.len() == 4 && value == 0 {
            out.push(b'z');
            continue;
        }

        let mut digits = [0u8; 5];
        let mut v = value;
        for d in digits.iter_mut().rev() {
            *d = (v % 85) as u8;
            v /= 85;
        }
        let take = chunk.len() + 1;
        out.extend(digits[..take].iter().map(|&d| d + b'!'));
    }
    out.extend_from_slice(b"~>");
    out
}
