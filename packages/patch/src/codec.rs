//! Compression of encoded patches for storage.
//!
//! Any codec works as long as `decompress(compress(x)) == x` and the output
//! for a given input never changes.

use crate::{Patch, PatchError, PatchResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::{Read, Write};

const BROTLI_BUFFER_SIZE: usize = 4096;

/// Compressed, encoded patch as stored in a change record.
///
/// Serializes as a base64 string.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct PatchBlob(Vec<u8>);

impl PatchBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn from_base64(text: &str) -> Result<Self, base64::DecodeError> {
        STANDARD.decode(text.trim()).map(Self)
    }
}

impl fmt::Debug for PatchBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatchBlob({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for PatchBlob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for PatchBlob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for PatchBlob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_base64(&text).map_err(serde::de::Error::custom)
    }
}

/// Lossless, deterministic byte transform for encoded patches
pub trait PatchCodec: fmt::Debug + Send + Sync {
    fn compress(&self, text: &str) -> PatchResult<PatchBlob>;

    fn decompress(&self, blob: &PatchBlob) -> PatchResult<String>;

    /// Encode and compress a patch
    fn encode(&self, patch: &Patch) -> PatchResult<PatchBlob> {
        self.compress(&patch.to_text()?)
    }

    /// Decompress and decode a patch
    fn decode(&self, blob: &PatchBlob) -> PatchResult<Patch> {
        Patch::from_text(&self.decompress(blob)?)
    }
}

/// Brotli compression
#[derive(Debug, Clone, Copy)]
pub struct BrotliCodec {
    quality: u32,
    window: u32,
}

impl BrotliCodec {
    pub fn new(quality: u32, window: u32) -> Self {
        Self {
            quality: quality.min(11),
            window: window.clamp(10, 24),
        }
    }
}

impl Default for BrotliCodec {
    fn default() -> Self {
        Self::new(9, 22)
    }
}

impl PatchCodec for BrotliCodec {
    fn compress(&self, text: &str) -> PatchResult<PatchBlob> {
        let mut writer =
            brotli::CompressorWriter::new(Vec::new(), BROTLI_BUFFER_SIZE, self.quality, self.window);
        writer
            .write_all(text.as_bytes())
            .map_err(PatchError::Compress)?;
        writer.flush().map_err(PatchError::Compress)?;
        Ok(PatchBlob(writer.into_inner()))
    }

    fn decompress(&self, blob: &PatchBlob) -> PatchResult<String> {
        let mut reader = brotli::Decompressor::new(blob.as_bytes(), BROTLI_BUFFER_SIZE);
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(PatchError::Decompress)?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// No compression at all
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodec;

impl PatchCodec for PlainCodec {
    fn compress(&self, text: &str) -> PatchResult<PatchBlob> {
        Ok(PatchBlob(text.as_bytes().to_vec()))
    }

    fn decompress(&self, blob: &PatchBlob) -> PatchResult<String> {
        Ok(String::from_utf8(blob.as_bytes().to_vec())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff;

    #[test]
    fn test_brotli_is_lossless() {
        let codec = BrotliCodec::default();
        let text = "INT. HOUSE - DAY\n".repeat(64);
        let blob = codec.compress(&text).unwrap();
        assert!(blob.len() < text.len());
        assert_eq!(codec.decompress(&blob).unwrap(), text);
    }

    #[test]
    fn test_brotli_is_deterministic() {
        let codec = BrotliCodec::default();
        assert_eq!(
            codec.compress("JOHN\nHello.").unwrap(),
            codec.compress("JOHN\nHello.").unwrap()
        );
    }

    #[test]
    fn test_encode_decode_patch() {
        let patch = diff("EXT. STREET", "EXT. STREET - NIGHT");
        for codec in [&BrotliCodec::default() as &dyn PatchCodec, &PlainCodec] {
            let blob = codec.encode(&patch).unwrap();
            assert_eq!(codec.decode(&blob).unwrap(), patch);
        }
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let codec = BrotliCodec::default();
        let err = codec.decode(&PatchBlob::new(vec![0xff, 0x00, 0x13, 0x37])).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_blob_serializes_as_base64() {
        let blob = PatchBlob::new(b"patch".to_vec());
        let json = serde_json::to_string(&blob).unwrap();
        assert_eq!(json, "\"cGF0Y2g=\"");
        assert_eq!(serde_json::from_str::<PatchBlob>(&json).unwrap(), blob);
    }
}
