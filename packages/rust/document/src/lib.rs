//! Front-matter document model for Brain Guide markdown files.
//!
//! A [`Document`] is the parsed form of one markdown file: an
//! insertion-ordered front-matter mapping plus the raw body. Parsing and
//! re-serialization are designed so that a parse → mutate-status →
//! serialize round trip preserves the body byte-for-byte and keeps the
//! front-matter field order intact.

mod frontmatter;

pub use frontmatter::split_front_matter;

use serde_yaml::{Mapping, Value};

use brainguide_shared::{BrainGuideError, DocStatus, Result, SECTION_TYPE};

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// One markdown file with YAML front matter.
#[derive(Debug, Clone)]
pub struct Document {
    /// Parsed front matter, in authored field order.
    pub front_matter: Mapping,
    /// Raw body text after the closing fence line, unmodified.
    pub body: String,
}

impl Document {
    /// Create a document with empty front matter.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            front_matter: Mapping::new(),
            body: body.into(),
        }
    }

    /// Parse file content into a document.
    ///
    /// Returns `Ok(None)` when the file carries no front-matter block;
    /// such files are outside the pipeline and get skipped, not errored.
    pub fn parse(content: &str) -> Result<Option<Self>> {
        let Some((block, body)) = split_front_matter(content)? else {
            return Ok(None);
        };

        Ok(Some(Self {
            front_matter: frontmatter::parse_mapping(block)?,
            body: body.to_string(),
        }))
    }

    /// Serialize back to `---\n{yaml}---\n{body}`.
    pub fn to_markdown(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(&self.front_matter).map_err(|e| {
            BrainGuideError::malformed(format!("could not serialize front matter: {e}"))
        })?;
        Ok(format!("---\n{yaml}---\n{}", self.body))
    }

    /// String value of a front-matter field.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.front_matter.get(key).and_then(Value::as_str)
    }

    /// Integer value of a front-matter field.
    pub fn int_field(&self, key: &str) -> Option<i64> {
        self.front_matter.get(key).and_then(Value::as_i64)
    }

    /// Set a front-matter field, keeping its position if it already exists.
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) {
        self.front_matter
            .insert(Value::String(key.to_string()), Value::String(value.into()));
    }

    /// The document's lifecycle status, if present and recognized.
    pub fn status(&self) -> Option<DocStatus> {
        self.str_field("status").and_then(DocStatus::parse)
    }

    /// Advance the lifecycle status.
    pub fn set_status(&mut self, status: DocStatus) {
        self.set_field("status", status.as_str());
    }

    /// Whether the `type` field contains the section marker.
    ///
    /// The field may be a scalar or a sequence; both forms satisfy the
    /// check when one entry equals `section`.
    pub fn is_section(&self) -> bool {
        match self.front_matter.get("type") {
            Some(Value::String(s)) => s == SECTION_TYPE,
            Some(Value::Sequence(seq)) => {
                seq.iter().any(|v| v.as_str() == Some(SECTION_TYPE))
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Typed metadata views
// ---------------------------------------------------------------------------

/// Required metadata of a section file entering concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMeta {
    /// Group key shared by all sections of one guide.
    pub code: String,
    /// Heading text for this section in the combined document.
    pub title: String,
    /// Position within the combined document, ascending.
    pub order: i64,
    /// Section language, defaulted when the field is absent.
    pub language: String,
}

impl SectionMeta {
    /// Extract section metadata, naming the first absent required field.
    pub fn from_document(doc: &Document, default_language: &str) -> Result<Self> {
        let code = doc
            .str_field("code")
            .ok_or_else(|| BrainGuideError::missing_field("code"))?;
        let title = doc
            .str_field("title")
            .ok_or_else(|| BrainGuideError::missing_field("title"))?;
        let order = doc
            .int_field("order")
            .ok_or_else(|| BrainGuideError::missing_field("order"))?;
        let language = doc.str_field("language").unwrap_or(default_language);

        Ok(Self {
            code: code.to_string(),
            title: title.to_string(),
            order,
            language: language.to_string(),
        })
    }
}

/// Required metadata of a combined document entering link resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedMeta {
    /// Group key, used for the output filename.
    pub code: String,
    /// Language used for slug and base-URL lookups.
    pub language: String,
}

impl CombinedMeta {
    /// Extract resolver-side metadata.
    ///
    /// A missing `language` is its own error: the resolver cannot guess
    /// which slugs or base URL to use.
    pub fn from_document(doc: &Document) -> Result<Self> {
        let code = doc
            .str_field("code")
            .ok_or_else(|| BrainGuideError::missing_field("code"))?;
        let language = doc
            .str_field("language")
            .ok_or(BrainGuideError::MissingLanguage)?;

        Ok(Self {
            code: code.to_string(),
            language: language.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Document {
        Document::parse(content)
            .expect("parse should succeed")
            .expect("document should have front matter")
    }

    #[test]
    fn parses_front_matter_and_body() {
        let doc = parse("---\ncode: BG007\ntitle: Intro\norder: 1\ntype: section\n---\n\nBody text.\n");
        assert_eq!(doc.str_field("code"), Some("BG007"));
        assert_eq!(doc.int_field("order"), Some(1));
        assert_eq!(doc.body, "\nBody text.\n");
    }

    #[test]
    fn missing_front_matter_is_none() {
        assert!(Document::parse("# Plain markdown\n").unwrap().is_none());
    }

    #[test]
    fn roundtrip_preserves_body_bytes() {
        let content = "---\ncode: BG007\nstatus: interlinking-ready\n---\n\n  indented   \n\nweird\tspacing\n";
        let doc = parse(content);
        assert_eq!(doc.to_markdown().unwrap(), content);
    }

    #[test]
    fn set_status_keeps_field_order() {
        let mut doc = parse(
            "---\ncode: BG007\ntype: brain_guide\nlanguage: en\nstatus: interlinking-ready\n---\nbody",
        );
        doc.set_status(brainguide_shared::DocStatus::HtmlReady);

        let out = doc.to_markdown().unwrap();
        assert_eq!(
            out,
            "---\ncode: BG007\ntype: brain_guide\nlanguage: en\nstatus: html-ready\n---\nbody"
        );
    }

    #[test]
    fn is_section_accepts_scalar_and_sequence() {
        assert!(parse("---\ntype: section\n---\n").is_section());
        assert!(parse("---\ntype:\n  - section\n  - draft\n---\n").is_section());
        assert!(!parse("---\ntype: index\n---\n").is_section());
        assert!(!parse("---\ntype:\n  - index\n---\n").is_section());
        assert!(!parse("---\ncode: BG007\n---\n").is_section());
    }

    #[test]
    fn section_meta_extraction() {
        let doc = parse("---\ncode: BG007\ntitle: Intro\norder: 2\ntype: section\n---\n");
        let meta = SectionMeta::from_document(&doc, "en").unwrap();
        assert_eq!(meta.code, "BG007");
        assert_eq!(meta.title, "Intro");
        assert_eq!(meta.order, 2);
        assert_eq!(meta.language, "en");
    }

    #[test]
    fn section_meta_explicit_language_wins() {
        let doc = parse("---\ncode: BG007\ntitle: Einleitung\norder: 1\nlanguage: de\n---\n");
        let meta = SectionMeta::from_document(&doc, "en").unwrap();
        assert_eq!(meta.language, "de");
    }

    #[test]
    fn section_meta_names_missing_field() {
        let doc = parse("---\ncode: BG007\ntitle: Intro\n---\n");
        let err = SectionMeta::from_document(&doc, "en").unwrap_err();
        assert!(matches!(
            err,
            BrainGuideError::MissingField { ref field } if field == "order"
        ));
    }

    #[test]
    fn combined_meta_requires_language() {
        let doc = parse("---\ncode: BG007\nstatus: interlinking-ready\n---\n");
        let err = CombinedMeta::from_document(&doc).unwrap_err();
        assert!(matches!(err, BrainGuideError::MissingLanguage));
    }

    #[test]
    fn status_parses_known_values_only() {
        let doc = parse("---\nstatus: interlinking-ready\n---\n");
        assert_eq!(doc.status(), Some(brainguide_shared::DocStatus::InterlinkingReady));

        let doc = parse("---\nstatus: draft\n---\n");
        assert_eq!(doc.status(), None);
    }
}
