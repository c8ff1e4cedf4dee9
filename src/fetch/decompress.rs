use crate::FetchError;
use flate2::read::MultiGzDecoder;
use std::io::Read;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Returns true if the body should be gunzipped
///
/// Either the server declared gzip, or the body starts with the gzip magic
/// number. Some servers compress without saying so.
pub fn is_gzip(body: &[u8], content_encoding: Option<&str>) -> bool {
    let declared = content_encoding
        .map(|enc| enc.to_ascii_lowercase().contains("gzip"))
        .unwrap_or(false);

    declared || body.starts_with(&GZIP_MAGIC)
}

/// Gunzips the body when needed, otherwise passes it through unchanged
///
/// Every gzip member is decoded, so a body written as several concatenated
/// members comes back whole. An empty body is returned as-is even when gzip
/// was declared.
pub fn decompress_body(body: Vec<u8>, content_encoding: Option<&str>) -> Result<Vec<u8>, FetchError> {
    if body.is_empty() || !is_gzip(&body, content_encoding) {
        return Ok(body);
    }

    let mut decoder = MultiGzDecoder::new(body.as_slice());
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| FetchError::Decompression(e.to_string()))?;

    tracing::debug!(
        "Decompressed gzip body: {} -> {} bytes",
        body.len(),
        decompressed.len()
    );

    Ok(decompressed)
}
