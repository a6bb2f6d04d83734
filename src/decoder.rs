use anyhow::{anyhow, Result};
use bytes::Bytes;
use encoding_rs::SHIFT_JIS;
use flate2::read::DeflateDecoder;
use flate2::read::GzDecoder;
use std::io::Read;
use tracing::warn;

pub const ENC_GZIP: &str = "gzip";
pub const ENC_DEFLATE: &str = "deflate";
pub const ENC_ZSTD: &str = "zstd";

pub fn decode_gzip(data: &[u8]) -> Result<Bytes> {
    let mut decoder = GzDecoder::new(data);
    let mut decoded_data = Vec::new();
    decoder.read_to_end(&mut decoded_data)?;
    Ok(Bytes::from(decoded_data))
}

pub fn decode_deflate(data: &[u8]) -> Result<Bytes> {
    let mut decoder = DeflateDecoder::new(data);
    let mut decoded_data = Vec::new();
    decoder.read_to_end(&mut decoded_data)?;
    Ok(Bytes::from(decoded_data))
}

pub fn decode_zstd(data: &[u8]) -> Result<Bytes> {
    let decoded_data = zstd::decode_all(data)?;
    Ok(Bytes::from(decoded_data))
}

/// Undoes the `Content-Encoding` of a body. Codings are listed in the order
/// they were applied, so they are removed last to first. Unknown codings
/// (and `identity`) pass the data through.
pub fn decompress(data: Bytes, content_encoding: &str) -> Result<Bytes> {
    content_encoding
        .split(',')
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .rev()
        .try_fold(data, |acc, coding| match coding.as_str() {
            ENC_GZIP | "x-gzip" => decode_gzip(&acc),
            ENC_DEFLATE => decode_deflate(&acc),
            ENC_ZSTD => decode_zstd(&acc),
            _ => Ok(acc),
        })
}

/// Decodes text as UTF-8, falling back to Shift_JIS.
pub fn decode_text(data: &[u8]) -> Result<String> {
    match String::from_utf8(data.to_vec()) {
        Ok(s) => Ok(s),
        Err(utf8e) => {
            let (r, _, sjis_error) = SHIFT_JIS.decode(data);
            if sjis_error {
                return Err(anyhow!(
                    "Failed to decode body with utf8/shift-jis: {}",
                    utf8e
                ));
            }
            Ok(r.to_string())
        }
    }
}

/// Turns a raw response body into displayable text. Never fails: a body that
/// cannot be decompressed is shown as received and undecodable bytes are
/// replaced.
pub fn decode_body(data: Bytes, content_encoding: &str) -> String {
    let bytes = match decompress(data.clone(), content_encoding) {
        Ok(b) => b,
        Err(e) => {
            warn!(%content_encoding, "failed to decompress body: {e}");
            data
        }
    };

    decode_text(&bytes).unwrap_or_else(|e| {
        warn!("{e}");
        String::from_utf8_lossy(&bytes).into_owned()
    })
}
