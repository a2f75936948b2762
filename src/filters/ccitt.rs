use crate::error::{CodecError, Result};
use crate::object::FilterParams;
use crate::Error;

/// `CCITTFaxDecode` (Group 3/4 fax compression) is negotiated — the pipeline
/// resolves `/Rows`, `/K`, `/Columns`, `/BlackIs1` the way the spec
/// requires — but no G3/G4 bit decoder lives in this crate's dependency
/// stack. Scanned-image decoding is treated as the external collaborator it
/// already is for other raster codecs (§1), so this surfaces as a
/// recoverable `UnsupportedFilter` rather than a silent wrong answer.
pub fn decode(_data: &[u8], parms: &FilterParams) -> Result<Vec<u8>> {
    let rows = parms.get_i64(b"Rows", 0);
    let columns = parms.get_i64(b"Columns", 1728);
    Err(Error::Codec(CodecError::UnsupportedFilter(format!(
        "CCITTFaxDecode (rows={rows}, columns={columns})"
    ))))
}
