//! Core domain constants and types for Brain Guide documents.

/// Front-matter `type` marker identifying an authored section file.
pub const SECTION_TYPE: &str = "section";

/// Front-matter `type` given to combined guide documents.
pub const GUIDE_TYPE: &str = "brain_guide";

// ---------------------------------------------------------------------------
// DocStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a combined document, stored as a front-matter string.
///
/// The transition is monotonic and one-way within a pipeline run:
/// `interlinking-ready` → `html-ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocStatus {
    /// Freshly concatenated, awaiting wiki-link resolution.
    InterlinkingReady,
    /// Links resolved, ready for the external renderer.
    HtmlReady,
}

impl DocStatus {
    /// The front-matter string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InterlinkingReady => "interlinking-ready",
            Self::HtmlReady => "html-ready",
        }
    }

    /// Parse a front-matter status string. Unknown statuses yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "interlinking-ready" => Some(Self::InterlinkingReady),
            "html-ready" => Some(Self::HtmlReady),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Output naming
// ---------------------------------------------------------------------------

/// Filename of a combined document awaiting interlinking.
///
/// The default language stays unqualified: `BG007_temp.md`; any other
/// language is qualified: `BG007_es_temp.md`.
pub fn staging_filename(code: &str, language: &str, default_language: &str) -> String {
    if language == default_language {
        format!("{code}_temp.md")
    } else {
        format!("{code}_{language}_temp.md")
    }
}

/// Filename of a link-resolved document handed to the renderer.
pub fn published_filename(code: &str, language: &str, default_language: &str) -> String {
    if language == default_language {
        format!("{code}.md")
    } else {
        format!("{code}_{language}.md")
    }
}
