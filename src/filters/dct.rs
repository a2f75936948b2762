use super::ImageInfo;

/// Sniff width/height/component-count from a raw JFIF byte stream by
/// walking its marker segments, without decoding any entropy-coded data.
pub fn sniff(data: &[u8]) -> Option<ImageInfo> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }
    let mut i = 2usize;
    while i + 4 <= data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        if marker == 0xD8 || marker == 0xD9 || (0xD0..=0xD7).contains(&marker) {
            i += 2;
            continue;
        }
        if i + 4 > data.len() {
            break;
        }
        let segment_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 2 + segment_len <= data.len() && segment_len >= 7 {
            let body = &data[i + 4..];
            let height = u16::from_be_bytes([body[1], body[2]]) as u32;
            let width = u16::from_be_bytes([body[3], body[4]]) as u32;
            let components = body[5];
            return Some(ImageInfo {
                width,
                height,
                components,
            });
        }
        if segment_len == 0 {
            break;
        }
        i += 2 + segment_len;
    }
    None
}

/// Sniff dimensions from a raw JPEG 2000 codestream/box structure (the
/// `ihdr` box inside a JP2 container, or an `SIZ` marker in a bare
/// codestream).
pub fn sniff_jpx(data: &[u8]) -> Option<ImageInfo> {
    if let Some(pos) = data.windows(4).position(|w| w == b"ihdr") {
        let body = data.get(pos + 4..pos + 4 + 14)?;
        let height = u32::from_be_bytes(body[0..4].try_into().ok()?);
        let width = u32::from_be_bytes(body[4..8].try_into().ok()?);
        let components = u16::from_be_bytes(body[8..10].try_into().ok()?) as u8;
        return Some(ImageInfo {
            width,
            height,
            components,
        });
    }

    let siz = data.windows(2).position(|w| w == [0xFF, 0x51])?;
    let body = data.get(siz + 2 + 2..siz + 2 + 2 + 16)?;
    let width = u32::from_be_bytes(body[0..4].try_into().ok()?);
    let height = u32::from_be_bytes(body[4..8].try_into().ok()?);
    Some(ImageInfo {
        width,
        height,
        components: 0,
    })
}
