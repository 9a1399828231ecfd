//! The Link Resolver: rewrites wiki-style links in combined documents to
//! public URLs and advances their status to `html-ready`.
//!
//! Only documents whose status is `interlinking-ready` are touched; the
//! rewritten document is written under its published name next to the
//! source, so the staging file survives and re-runs are no-ops.

mod index;
mod wikilink;

pub use index::{IndexCache, IndexEntry};
pub use wikilink::{WikiLink, normalize_target, scan};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use brainguide_document::{CombinedMeta, Document};
use brainguide_shared::{
    BrainGuideError, DocStatus, Result, published_filename,
};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Configuration for one link-resolution run.
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    /// A combined document, or a folder of them (searched recursively).
    pub source: PathBuf,
    /// Root folder of index entries.
    pub index_dir: PathBuf,
    /// Public site roots, keyed by language code.
    pub base_urls: BTreeMap<String, String>,
    /// Language whose output filename stays unqualified.
    pub default_language: String,
}

/// Outcome of a link-resolution run.
#[derive(Debug, Default)]
pub struct ResolveReport {
    /// Published documents written, in processing order.
    pub written: Vec<PathBuf>,
    /// Links rewritten to public URLs.
    pub links_resolved: usize,
    /// Links left untouched (no index entry or no slug).
    pub links_unresolved: usize,
    /// Files skipped by the status filter or for per-file problems.
    pub files_skipped: usize,
    /// Documents that failed on a configuration problem.
    pub documents_failed: usize,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Run the resolver over a document or folder.
///
/// Per-link failures leave the link as-is with a warning. A missing base
/// URL for a document's language fails that document alone; the run errors
/// only when no markdown file exists at all, or when every document fails.
#[instrument(skip_all, fields(source = %config.source.display()))]
pub fn resolve(config: &ResolveConfig) -> Result<ResolveReport> {
    let paths = collect_inputs(&config.source)?;

    if paths.is_empty() {
        return Err(BrainGuideError::NoInputFiles {
            path: config.source.clone(),
        });
    }

    let mut cache = IndexCache::new(config.index_dir.clone());
    let mut report = ResolveReport::default();
    let mut first_failure: Option<BrainGuideError> = None;

    for path in paths {
        match resolve_file(&path, config, &mut cache, &mut report) {
            Ok(()) => {}
            Err(e @ BrainGuideError::Io { .. }) => return Err(e),
            Err(e) => {
                warn!(path = %path.display(), "document failed: {e}");
                report.documents_failed += 1;
                first_failure.get_or_insert(e);
            }
        }
    }

    if report.written.is_empty() {
        if let Some(err) = first_failure {
            return Err(err);
        }
    }

    info!(
        written = report.written.len(),
        resolved = report.links_resolved,
        unresolved = report.links_unresolved,
        skipped = report.files_skipped,
        failed = report.documents_failed,
        "link resolution complete"
    );

    Ok(report)
}

/// Process one file: status gate, link rewrite, status advance, write-out.
fn resolve_file(
    path: &Path,
    config: &ResolveConfig,
    cache: &mut IndexCache,
    report: &mut ResolveReport,
) -> Result<()> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), "skipping unreadable file: {e}");
            report.files_skipped += 1;
            return Ok(());
        }
    };

    let mut doc = match Document::parse(&content) {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            debug!(path = %path.display(), "skipping file without front matter");
            report.files_skipped += 1;
            return Ok(());
        }
        Err(e) => {
            warn!(path = %path.display(), "skipping file: {e}");
            report.files_skipped += 1;
            return Ok(());
        }
    };

    if doc.status() != Some(DocStatus::InterlinkingReady) {
        debug!(path = %path.display(), "skipping file not marked interlinking-ready");
        report.files_skipped += 1;
        return Ok(());
    }

    let meta = match CombinedMeta::from_document(&doc) {
        Ok(meta) => meta,
        Err(e) => {
            warn!(path = %path.display(), "skipping document: {e}");
            report.files_skipped += 1;
            return Ok(());
        }
    };

    let (resolved, unresolved) = rewrite_links(&mut doc, &meta.language, config, cache)?;
    report.links_resolved += resolved;
    report.links_unresolved += unresolved;

    doc.set_status(DocStatus::HtmlReady);

    let filename = published_filename(&meta.code, &meta.language, &config.default_language);
    let out_path = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&filename);

    std::fs::write(&out_path, doc.to_markdown()?)
        .map_err(|e| BrainGuideError::io(&out_path, e))?;

    debug!(
        code = meta.code,
        language = meta.language,
        resolved,
        unresolved,
        path = %out_path.display(),
        "wrote published document"
    );

    report.written.push(out_path);
    Ok(())
}

/// Rewrite every wiki link in the document body.
///
/// Text outside link spans is copied through byte-for-byte; links that
/// cannot be resolved stay exactly as written.
fn rewrite_links(
    doc: &mut Document,
    language: &str,
    config: &ResolveConfig,
    cache: &mut IndexCache,
) -> Result<(usize, usize)> {
    let body = std::mem::take(&mut doc.body);
    let links = wikilink::scan(&body);

    if links.is_empty() {
        doc.body = body;
        return Ok((0, 0));
    }

    let mut out = String::with_capacity(body.len());
    let mut copied_to = 0;
    let mut resolved = 0;
    let mut unresolved = 0;

    for link in &links {
        let key = wikilink::normalize_target(link.target);

        let slug = match cache.lookup(&key).and_then(|entry| entry.slug(language)) {
            Some(slug) => slug,
            None => {
                warn!(target = link.target, key, language, "leaving unresolved link");
                unresolved += 1;
                continue;
            }
        };

        // A slug without a base URL is a configuration hole: fatal for this
        // document, recoverable for the batch.
        let base = config.base_urls.get(language).map(String::as_str).ok_or_else(|| {
            BrainGuideError::MissingBaseUrl {
                language: language.to_string(),
            }
        })?;

        let display = link.display.unwrap_or(&key);
        out.push_str(&body[copied_to..link.start]);
        out.push_str(&format!(
            "[{display}]({}/{slug})",
            base.trim_end_matches('/')
        ));
        copied_to = link.end;
        resolved += 1;
    }

    out.push_str(&body[copied_to..]);
    doc.body = out;

    Ok((resolved, unresolved))
}

/// Accept a single file or recursively collect `*.md` under a folder.
fn collect_inputs(source: &Path) -> Result<Vec<PathBuf>> {
    if source.is_file() {
        return Ok(vec![source.to_path_buf()]);
    }

    let mut paths = Vec::new();
    collect_markdown_paths(source, &mut paths)?;
    paths.sort();
    Ok(paths)
}

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
// Tests
// ---------------------------------------------------------------------------
