//! Pipeline stages for one input file.
//!
//! Each submodule implements exactly one transformation step and is
//! testable without the network.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ (remote OCR) ──▶ decode ──▶ sanitize ──▶ signature ──▶ assemble
//! (path/URL)                 (base64)   (strip junk)  (extension)   (markdown)
//! ```
//!
//! 1. [`input`]     — classify the path or URL; local files must be readable
//! 2. [`decode`]    — base64 / data-URI payload to bytes
//! 3. [`sanitize`]  — cut stray bytes in front of a known image signature
//! 4. [`signature`] — magic-byte detection and extension mapping
//! 5. [`assemble`]  — page headings plus image-reference rewriting
//!
//! [`inspect`] sits beside the flow: it counts PDF pages for the cost estimate.

pub mod assemble;
pub mod decode;
pub mod input;
pub mod inspect;
pub mod sanitize;
pub mod signature;
