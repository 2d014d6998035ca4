//! Markdown assembly and image-reference rewriting.
//!
//! Pages are concatenated under `# Page {index}` headings, then every image
//! reference is pointed at the filename actually written to disk. The OCR
//! service refers to images by bare id (`img-0.jpeg`) while the saved file
//! carries the detected extension (`img-0.jpeg.png`).
//!
//! ## Reference matching
//!
//! Two surface forms are rewritten: markdown targets `(ref)` and HTML
//! attributes `src="ref"`. Matching is by whole token: the text between the
//! delimiters must equal a registered reference exactly, so `img-1` never
//! rewrites inside `(img-10)`. Text outside those two forms is not touched.

use crate::api::PageResult;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static RE_PAREN_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^()\s]+)\)").unwrap());

static RE_SRC_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"src="([^"]*)""#).unwrap());

/// Map from every reference form seen in markdown to the on-disk filename.
///
/// Scoped to one input file; built while images are saved and consumed
/// once the document is assembled.
#[derive(Debug, Clone, Default)]
pub struct ReferenceRewriteMap {
    map: HashMap<String, String>,
}

impl ReferenceRewriteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `{id}`, `{id}.jpeg` and `{id}.jpg` as aliases of `filename`.
    pub fn register(&mut self, id: &str, filename: &str) {
        for reference in [id.to_string(), format!("{id}.jpeg"), format!("{id}.jpg")] {
            self.map.insert(reference, filename.to_string());
        }
    }

    pub fn get(&self, reference: &str) -> Option<&str> {
        self.map.get(reference).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Rewrite `(ref)` and `src="ref"` occurrences whose `ref` is registered.
    pub fn rewrite(&self, text: &str) -> String {
        if self.map.is_empty() {
            return text.to_string();
        }
        let text = RE_PAREN_REF.replace_all(text, |caps: &Captures<'_>| match self.get(&caps[1]) {
            Some(new) => format!("({new})"),
            None => caps[0].to_string(),
        });
        RE_SRC_ATTR
            .replace_all(&text, |caps: &Captures<'_>| match self.get(&caps[1]) {
                Some(new) => format!("src=\"{new}\""),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// Concatenate pages in input order and apply `rewrites` to the result.
///
/// Each page contributes `# Page {index}`, a blank line, its markdown and a
/// blank-line separator.
pub fn assemble(pages: &[PageResult], rewrites: &ReferenceRewriteMap) -> String {
    let mut document = String::with_capacity(pages.iter().map(|p| p.markdown.len() + 16).sum());
    for page in pages {
        document.push_str(&format!("# Page {}\n\n{}\n\n", page.index, page.markdown));
    }
    rewrites.rewrite(&document)
}

/// Lossy plain-text rendering: drops every `#` and `*`. No reflow.
pub fn to_plain_text(markdown: &str) -> String {
    markdown.replace(['#', '*'], "")
}
