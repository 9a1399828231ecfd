//! The Concatenator: builds one combined document per (`code`, `language`)
//! group from a folder of authored section files.
//!
//! Section files are discovered recursively, validated, grouped, ordered by
//! their `order` field, and emitted as a single document with fresh front
//! matter and a localized References heading. Output is deterministic:
//! re-running over unchanged inputs reproduces byte-identical files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use brainguide_document::{Document, SectionMeta};
use brainguide_shared::{
    BrainGuideError, DocStatus, GUIDE_TYPE, Result, staging_filename,
};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Configuration for one concatenation run.
#[derive(Debug, Clone)]
pub struct ConcatConfig {
    /// Root folder of authored section files (searched recursively).
    pub source_dir: PathBuf,
    /// Folder combined documents are written into (created if absent).
    pub output_dir: PathBuf,
    /// Language assumed for sections lacking a `language` field.
    pub default_language: String,
    /// References heading text, keyed by language code.
    pub references: BTreeMap<String, String>,
}

/// Outcome of a concatenation run.
#[derive(Debug, Default)]
pub struct ConcatReport {
    /// Combined documents written, in output order.
    pub written: Vec<PathBuf>,
    /// Section files that contributed to an output.
    pub sections_used: usize,
    /// Files skipped for per-file problems (no front matter, malformed,
    /// missing field, not a section).
    pub files_skipped: usize,
    /// Groups that failed on a configuration problem.
    pub groups_failed: usize,
}

/// A validated section awaiting grouping.
struct Section {
    meta: SectionMeta,
    body: String,
}

// ---------------------------------------------------------------------------
// Concatenation
// ---------------------------------------------------------------------------

/// Run the concatenator over a source folder.
///
/// Per-file problems skip the file and continue; a group whose language has
/// no References translation fails alone. The run errors only when no
/// eligible section file exists at all, or when every group fails.
#[instrument(skip_all, fields(source = %config.source_dir.display()))]
pub fn concatenate(config: &ConcatConfig) -> Result<ConcatReport> {
    let mut report = ConcatReport::default();
    let sections = collect_sections(config, &mut report)?;

    if sections.is_empty() {
        return Err(BrainGuideError::NoInputFiles {
            path: config.source_dir.clone(),
        });
    }

    // Group by (code, language). BTreeMap keeps output order deterministic;
    // within a group, discovery order is preserved for stable tie-breaking.
    let mut groups: BTreeMap<(String, String), Vec<Section>> = BTreeMap::new();
    for section in sections {
        let key = (section.meta.code.clone(), section.meta.language.clone());
        groups.entry(key).or_default().push(section);
    }

    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| BrainGuideError::io(&config.output_dir, e))?;

    let mut first_failure: Option<BrainGuideError> = None;

    for ((code, language), mut members) in groups {
        // Stable sort: equal `order` values keep discovery order.
        members.sort_by_key(|s| s.meta.order);

        let heading = match config.references.get(&language) {
            Some(h) => h,
            None => {
                let err = BrainGuideError::MissingTranslation {
                    language: language.clone(),
                };
                warn!(code, language, "skipping group: {err}");
                report.groups_failed += 1;
                first_failure.get_or_insert(err);
                continue;
            }
        };

        let combined = compose(&code, &language, heading, &members)?;
        let filename = staging_filename(&code, &language, &config.default_language);
        let path = config.output_dir.join(&filename);

        std::fs::write(&path, combined).map_err(|e| BrainGuideError::io(&path, e))?;

        debug!(
            code,
            language,
            sections = members.len(),
            path = %path.display(),
            "wrote combined document"
        );

        report.sections_used += members.len();
        report.written.push(path);
    }

    if report.written.is_empty() {
        // Every group failed on configuration; surface the first problem.
        if let Some(err) = first_failure {
            return Err(err);
        }
    }

    info!(
        written = report.written.len(),
        skipped = report.files_skipped,
        failed_groups = report.groups_failed,
        "concatenation complete"
    );

    Ok(report)
}

// ---------------------------------------------------------------------------
// Discovery and validation
// ---------------------------------------------------------------------------

/// Discover and validate all section files under the source folder.
///
/// Files are visited in sorted path order so that grouping and tie-breaking
/// are reproducible across runs.
fn collect_sections(config: &ConcatConfig, report: &mut ConcatReport) -> Result<Vec<Section>> {
    let mut paths = Vec::new();
    collect_markdown_paths(&config.source_dir, &mut paths)?;
    paths.sort();

    let mut sections = Vec::new();

    for path in paths {
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), "skipping unreadable file: {e}");
                report.files_skipped += 1;
                continue;
            }
        };

        let doc = match Document::parse(&content) {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                debug!(path = %path.display(), "skipping file without front matter");
                report.files_skipped += 1;
                continue;
            }
            Err(e) => {
                warn!(path = %path.display(), "skipping file: {e}");
                report.files_skipped += 1;
                continue;
            }
        };

        if !doc.is_section() {
            debug!(path = %path.display(), "skipping non-section file");
            report.files_skipped += 1;
            continue;
        }

        match SectionMeta::from_document(&doc, &config.default_language) {
            Ok(meta) => sections.push(Section {
                meta,
                body: doc.body,
            }),
            Err(e) => {
                warn!(path = %path.display(), "skipping section: {e}");
                report.files_skipped += 1;
            }
        }
    }

    Ok(sections)
}

/// Recursively collect `*.md` paths under a folder.
fn collect_markdown_paths(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| BrainGuideError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| BrainGuideError::io(dir, e))?;
        let path = entry.path();

        if path.is_dir() {
            collect_markdown_paths(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "md") {
            out.push(path);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Build the combined document text for one ordered group.
///
/// Layout: fresh front matter, then `## {title}` + body blocks joined by
/// blank lines, then the localized References heading. Section bodies are
/// trimmed at the edges (the join owns inter-section spacing) but interior
/// bytes are never edited.
fn compose(code: &str, language: &str, heading: &str, members: &[Section]) -> Result<String> {
    let joined = members
        .iter()
        .map(|s| format!("## {}\n\n{}", s.meta.title, s.body.trim()))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut doc = Document::new(format!("\n{joined}\n\n## {heading}\n"));
    doc.set_field("code", code);
    doc.set_field("type", GUIDE_TYPE);
    doc.set_field("language", language);
    doc.set_status(DocStatus::InterlinkingReady);

    doc.to_markdown()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bg-concat-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_section(dir: &Path, name: &str, code: &str, title: &str, order: i64, body: &str) {
        let content = format!(
            "---\ncode: {code}\ntitle: {title}\norder: {order}\ntype: section\n---\n\n{body}\n"
        );
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn make_config(root: &Path) -> ConcatConfig {
        ConcatConfig {
            source_dir: root.to_path_buf(),
            output_dir: root.join("combined"),
            default_language: "en".into(),
            references: BTreeMap::from([
                ("en".to_string(), "References".to_string()),
                ("es".to_string(), "Referencias".to_string()),
            ]),
        }
    }

    #[test]
    fn combines_sections_in_order() {
        let tmp = temp_dir();
        // Written out of order on purpose: `order` governs, not filenames.
        write_section(&tmp, "b.md", "BG007", "Mechanism", 2, "How it works.");
        write_section(&tmp, "a.md", "BG007", "Intro", 1, "What it is.");

        let report = concatenate(&make_config(&tmp)).unwrap();
        assert_eq!(report.written.len(), 1);
        assert_eq!(report.sections_used, 2);

        let output = std::fs::read_to_string(tmp.join("combined/BG007_temp.md")).unwrap();
        assert_eq!(
            output,
            "---\n\
             code: BG007\n\
             type: brain_guide\n\
             language: en\n\
             status: interlinking-ready\n\
             ---\n\n\
             ## Intro\n\n\
             What it is.\n\n\
             ## Mechanism\n\n\
             How it works.\n\n\
             ## References\n"
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn concatenation_is_idempotent() {
        let tmp = temp_dir();
        write_section(&tmp, "a.md", "BG007", "Intro", 1, "Text.");
        write_section(&tmp, "b.md", "BG007", "Mechanism", 2, "More.");

        let config = make_config(&tmp);
        concatenate(&config).unwrap();
        let first = std::fs::read_to_string(tmp.join("combined/BG007_temp.md")).unwrap();

        // Second run also re-discovers the first run's output, which must be
        // filtered out (`type: brain_guide`) rather than concatenated.
        concatenate(&config).unwrap();
        let second = std::fs::read_to_string(tmp.join("combined/BG007_temp.md")).unwrap();

        assert_eq!(first, second);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn non_section_files_never_contribute() {
        let tmp = temp_dir();
        write_section(&tmp, "a.md", "BG007", "Intro", 1, "Text.");
        std::fs::write(
            tmp.join("index.md"),
            "---\ncode: BG007\ntitle: Index\norder: 0\ntype: index\n---\n\nIndex body.\n",
        )
        .unwrap();

        let report = concatenate(&make_config(&tmp)).unwrap();
        assert_eq!(report.sections_used, 1);
        assert_eq!(report.files_skipped, 1);

        let output = std::fs::read_to_string(tmp.join("combined/BG007_temp.md")).unwrap();
        assert!(!output.contains("Index body."));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn groups_by_language_with_qualified_filenames() {
        let tmp = temp_dir();
        write_section(&tmp, "en.md", "BG007", "Intro", 1, "English.");
        std::fs::write(
            tmp.join("es.md"),
            "---\ncode: BG007\ntitle: Introducción\norder: 1\ntype: section\nlanguage: es\n---\n\nEspañol.\n",
        )
        .unwrap();

        let report = concatenate(&make_config(&tmp)).unwrap();
        assert_eq!(report.written.len(), 2);

        let en = std::fs::read_to_string(tmp.join("combined/BG007_temp.md")).unwrap();
        assert!(en.contains("## References"));

        let es = std::fs::read_to_string(tmp.join("combined/BG007_es_temp.md")).unwrap();
        assert!(es.contains("language: es"));
        assert!(es.contains("## Referencias"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn discovers_sections_in_subfolders() {
        let tmp = temp_dir();
        let sub = tmp.join("venlafaxine");
        std::fs::create_dir_all(&sub).unwrap();
        write_section(&sub, "01-intro.md", "BG004", "Intro", 1, "Nested.");

        let report = concatenate(&make_config(&tmp)).unwrap();
        assert_eq!(report.written.len(), 1);
        assert!(tmp.join("combined/BG004_temp.md").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn equal_order_breaks_ties_by_discovery_order() {
        let tmp = temp_dir();
        write_section(&tmp, "a.md", "BG007", "First", 1, "A.");
        write_section(&tmp, "b.md", "BG007", "Second", 1, "B.");

        let report = concatenate(&make_config(&tmp)).unwrap();
        assert_eq!(report.written.len(), 1);

        let output = std::fs::read_to_string(tmp.join("combined/BG007_temp.md")).unwrap();
        let first = output.find("## First").unwrap();
        let second = output.find("## Second").unwrap();
        assert!(first < second);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_translation_fails_only_that_group() {
        let tmp = temp_dir();
        write_section(&tmp, "en.md", "BG007", "Intro", 1, "English.");
        std::fs::write(
            tmp.join("fr.md"),
            "---\ncode: BG007\ntitle: Intro\norder: 1\ntype: section\nlanguage: fr\n---\n\nFrançais.\n",
        )
        .unwrap();

        let report = concatenate(&make_config(&tmp)).unwrap();
        assert_eq!(report.written.len(), 1);
        assert_eq!(report.groups_failed, 1);
        assert!(!tmp.join("combined/BG007_fr_temp.md").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn all_groups_failing_is_fatal() {
        let tmp = temp_dir();
        std::fs::write(
            tmp.join("fr.md"),
            "---\ncode: BG007\ntitle: Intro\norder: 1\ntype: section\nlanguage: fr\n---\n\nFrançais.\n",
        )
        .unwrap();

        let err = concatenate(&make_config(&tmp)).unwrap_err();
        assert!(matches!(
            err,
            BrainGuideError::MissingTranslation { ref language } if language == "fr"
        ));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn empty_folder_reports_no_input_files() {
        let tmp = temp_dir();
        let err = concatenate(&make_config(&tmp)).unwrap_err();
        assert!(matches!(err, BrainGuideError::NoInputFiles { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn malformed_and_incomplete_files_are_skipped() {
        let tmp = temp_dir();
        write_section(&tmp, "good.md", "BG007", "Intro", 1, "Fine.");
        std::fs::write(tmp.join("bad-yaml.md"), "---\ncode: [unterminated\n---\nbody").unwrap();
        std::fs::write(
            tmp.join("no-order.md"),
            "---\ncode: BG007\ntitle: Dangling\ntype: section\n---\nbody",
        )
        .unwrap();
        std::fs::write(tmp.join("plain.md"), "# Just markdown\n").unwrap();

        let report = concatenate(&make_config(&tmp)).unwrap();
        assert_eq!(report.sections_used, 1);
        assert_eq!(report.files_skipped, 3);

        let output = std::fs::read_to_string(tmp.join("combined/BG007_temp.md")).unwrap();
        assert!(!output.contains("Dangling"));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
