//! Repair of image payloads that carry stray bytes before the real header.
//!
//! Some OCR responses put a few extra bytes in front of a valid image
//! signature. [`sanitize`] scans a bounded window for a known signature and
//! cuts everything in front of it. When nothing is found the bytes are
//! returned untouched so the caller can still write them as `.bin`; data is
//! never dropped.
//!
//! Either outcome other than "already clean" produces a [`SanitizeWarning`]
//! carrying a short SHA-256 fingerprint of the raw base64 text. Identical
//! corrupt payloads can be correlated across runs without logging them whole.

use super::signature::{matching_signature, SIGNATURES};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Upper bound (exclusive) of the offsets scanned for a signature.
pub const MAX_SCAN_OFFSET: usize = 64;

const PAYLOAD_HEAD_CHARS: usize = 24;
const PAYLOAD_HASH_CHARS: usize = 12;

/// Identifies a raw payload in logs without reproducing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadFingerprint {
    /// First 12 hex chars of SHA-256 over the base64 text, or `N/A`.
    pub hash: String,
    /// First 24 characters of the base64 text, or `N/A`.
    pub head: String,
}

impl PayloadFingerprint {
    pub fn of(raw_base64: &str) -> Self {
        if raw_base64.is_empty() {
            return Self {
                hash: "N/A".into(),
                head: "N/A".into(),
            };
        }
        let digest = hex::encode(Sha256::digest(raw_base64.as_bytes()));
        Self {
            hash: digest[..PAYLOAD_HASH_CHARS].to_string(),
            head: raw_base64.chars().take(PAYLOAD_HEAD_CHARS).collect(),
        }
    }
}

/// What [`sanitize`] had to do with a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SanitizeWarning {
    /// Leading bytes were stripped; the image now starts at `signature`.
    CorrectionApplied {
        image_id: String,
        offset: usize,
        /// Matched signature, lowercase hex.
        signature: String,
        fingerprint: PayloadFingerprint,
    },
    /// No signature within the scan window; bytes kept as-is.
    UncorrectableSignature {
        image_id: String,
        fingerprint: PayloadFingerprint,
    },
}

impl fmt::Display for SanitizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanitizeWarning::CorrectionApplied {
                image_id,
                offset,
                signature,
                fingerprint,
            } => write!(
                f,
                "Extraneous leading bytes detected for image {image_id} (offset {offset}); \
                 stripping for valid image signature {signature}. \
                 Base64 hash: {} | Base64 head: {}",
                fingerprint.hash, fingerprint.head
            ),
            SanitizeWarning::UncorrectableSignature {
                image_id,
                fingerprint,
            } => write!(
                f,
                "No known image signature found for image {image_id}. Saving as .bin. \
                 Base64 hash: {} | Base64 head: {}",
                fingerprint.hash, fingerprint.head
            ),
        }
    }
}

/// Corrected payload plus the warning, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub bytes: Vec<u8>,
    pub warning: Option<SanitizeWarning>,
}

/// [`sanitize_with_limit`] with the default window of [`MAX_SCAN_OFFSET`].
pub fn sanitize(bytes: Vec<u8>, image_id: &str, raw_base64: &str) -> Sanitized {
    sanitize_with_limit(bytes, MAX_SCAN_OFFSET, image_id, raw_base64)
}

/// Strip extraneous leading bytes in front of a known image signature.
///
/// 1. Bytes that already start with a signature are returned unchanged.
/// 2. Otherwise offsets `1..max_scan_offset` are tried in order; at the
///    first offset where any signature matches in full, `bytes[offset..]` is
///    returned with [`SanitizeWarning::CorrectionApplied`].
/// 3. If none matches, the input is returned with
///    [`SanitizeWarning::UncorrectableSignature`].
pub fn sanitize_with_limit(
    mut bytes: Vec<u8>,
    max_scan_offset: usize,
    image_id: &str,
    raw_base64: &str,
) -> Sanitized {
    if matching_signature(&bytes).is_some() {
        return Sanitized {
            bytes,
            warning: None,
        };
    }

    let found = (1..max_scan_offset.min(bytes.len())).find_map(|offset| {
        SIGNATURES
            .iter()
            .find(|(sig, _)| bytes[offset..].starts_with(sig))
            .map(|(sig, _)| (offset, *sig))
    });

    match found {
        Some((offset, signature)) => {
            bytes.drain(..offset);
            Sanitized {
                bytes,
                warning: Some(SanitizeWarning::CorrectionApplied {
                    image_id: image_id.to_string(),
                    offset,
                    signature: hex::encode(signature),
                    fingerprint: PayloadFingerprint::of(raw_base64),
                }),
            }
        }
        None => Sanitized {
            bytes,
            warning: Some(SanitizeWarning::UncorrectableSignature {
                image_id: image_id.to_string(),
                fingerprint: PayloadFingerprint::of(raw_base64),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::signature::ImageFormat;

    const PAYLOAD: &[u8] = b"\x00\x10JFIF-ish body bytes";

    fn with_garbage(k: usize, sig: &[u8]) -> Vec<u8> {
        // 0x00 never starts a known signature, so the first hit is at `k`.
        let mut v = vec![0u8; k];
        v.extend_from_slice(sig);
        v.extend_from_slice(PAYLOAD);
        v
    }

    #[test]
    fn clean_payload_passes_through() {
        for (sig, _) in SIGNATURES {
            let mut input = sig.to_vec();
            input.extend_from_slice(PAYLOAD);
            let out = sanitize(input.clone(), "img-0", "AAAA");
            assert_eq!(out.bytes, input);
            assert!(out.warning.is_none());
        }
    }

    #[test]
    fn strips_garbage_at_every_offset_in_window() {
        for (sig, format) in SIGNATURES {
            for k in 1..MAX_SCAN_OFFSET {
                let out = sanitize(with_garbage(k, sig), "img-1", "raw");
                let mut expected = sig.to_vec();
                expected.extend_from_slice(PAYLOAD);
                assert_eq!(out.bytes, expected, "sig {sig:?} offset {k}");
                assert_eq!(ImageFormat::detect(&out.bytes), *format);
                match out.warning {
                    Some(SanitizeWarning::CorrectionApplied { offset, ref signature, .. }) => {
                        assert_eq!(offset, k);
                        assert_eq!(*signature, hex::encode(sig));
                    }
                    ref other => panic!("expected correction, got {other:?}"),
                }
            }
        }
    }

    #[test]
    fn signature_past_window_is_uncorrectable() {
        let input = with_garbage(MAX_SCAN_OFFSET, b"\x89PNG\r\n\x1a\n");
        let out = sanitize(input.clone(), "img-2", "iVBOR");
        assert_eq!(out.bytes, input);
        assert_eq!(ImageFormat::detect(&out.bytes).extension(), ".bin");
        assert!(matches!(
            out.warning,
            Some(SanitizeWarning::UncorrectableSignature { .. })
        ));
    }

    #[test]
    fn empty_and_short_buffers_are_uncorrectable() {
        for input in [Vec::new(), vec![0u8], b"\0\xFF\xD8".to_vec()] {
            let out = sanitize(input.clone(), "img-3", "");
            assert_eq!(out.bytes, input);
            assert!(matches!(
                out.warning,
                Some(SanitizeWarning::UncorrectableSignature { .. })
            ));
        }
    }

    #[test]
    fn earliest_offset_wins() {
        // "BM" at offset 2 comes before the JPEG signature at offset 5.
        let input = b"\0\0BM\0\xFF\xD8\xFF".to_vec();
        let out = sanitize(input, "img-4", "x");
        assert_eq!(out.bytes, b"BM\0\xFF\xD8\xFF");
    }

    #[test]
    fn fingerprint_is_short_and_deterministic() {
        let raw = "/9j/4AAQSkZJRgABAQAAAQABAAD/2wBDAAgGBgcGBQgHBwcJCQgKDBQN";
        let a = PayloadFingerprint::of(raw);
        let b = PayloadFingerprint::of(raw);
        assert_eq!(a, b);
        assert_eq!(a.hash.len(), 12);
        assert!(a.hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a.head, &raw[..24]);

        let none = PayloadFingerprint::of("");
        assert_eq!(none.hash, "N/A");
        assert_eq!(none.head, "N/A");
    }

    #[test]
    fn warning_display_names_image_and_offset() {
        let out = sanitize(with_garbage(3, b"GIF89a"), "img-9.jpeg", "R0lGOD");
        let warning = out.warning.expect("warning");
        assert!(matches!(
            warning,
            SanitizeWarning::CorrectionApplied { ref image_id, .. } if image_id == "img-9.jpeg"
        ));
        let msg = warning.to_string();
        assert!(msg.contains("img-9.jpeg"));
        assert!(msg.contains("offset 3"));
        assert!(msg.contains("474946383961"));
        assert!(msg.contains("Base64 head: R0lGOD"));
    }
}
