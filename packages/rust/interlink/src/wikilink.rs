//! Wiki-link scanning and target normalization.
//!
//! A wiki link is `[[target]]` or `[[target|display text]]`. The scanner is
//! a single left-to-right pass: brackets and newlines are forbidden inside
//! the target, while the display text tolerates single brackets and ends at
//! the first `]]`. Candidates that break these rules are abandoned and
//! scanning resumes, leaving the surrounding text to be copied through
//! untouched.

/// One wiki link found in body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink<'a> {
    /// Byte offset of the opening `[[`.
    pub start: usize,
    /// Byte offset just past the closing `]]`.
    pub end: usize,
    /// Raw target text (before normalization).
    pub target: &'a str,
    /// Alias display text, when the `|` form was used.
    pub display: Option<&'a str>,
}

const OPEN: &str = "[[";

/// Scan body text left to right for wiki links.
pub fn scan(text: &str) -> Vec<WikiLink<'_>> {
    let mut links = Vec::new();
    let mut cursor = 0;

    while let Some(rel) = text[cursor..].find(OPEN) {
        let start = cursor + rel;
        match parse_at(text, start) {
            Some(link) => {
                cursor = link.end;
                links.push(link);
            }
            // Abandoned candidate: resume right after the `[[` so a later
            // opener inside the same stretch is still found.
            None => cursor = start + OPEN.len(),
        }
    }

    links
}

/// Parse one candidate whose `[[` begins at `start`.
fn parse_at(text: &str, start: usize) -> Option<WikiLink<'_>> {
    let bytes = text.as_bytes();
    let target_start = start + OPEN.len();
    let mut i = target_start;

    // Target portion: runs to `|` or `]]`, no brackets or newlines.
    let target_end = loop {
        match bytes.get(i)? {
            b'\n' | b'[' => return None,
            b']' => {
                if bytes.get(i + 1) == Some(&b']') {
                    break i;
                }
                return None;
            }
            b'|' => break i,
            _ => i += 1,
        }
    };

    let target = &text[target_start..target_end];

    if bytes[target_end] == b']' {
        return Some(WikiLink {
            start,
            end: target_end + 2,
            target,
            display: None,
        });
    }

    // Display portion: runs to the first `]]`, single brackets allowed.
    let display_start = target_end + 1;
    let mut j = display_start;
    loop {
        match bytes.get(j)? {
            b'\n' => return None,
            b']' if bytes.get(j + 1) == Some(&b']') => {
                return Some(WikiLink {
                    start,
                    end: j + 2,
                    target,
                    display: Some(&text[display_start..j]),
                });
            }
            _ => j += 1,
        }
    }
}

/// Normalize a raw link target into a bare index key.
///
/// Backslashes become `/`, the final segment's extension is stripped, and
/// empty, relative (`.`/`..`), `Index`, and `Brain Guides` segments are
/// dropped wherever they appear.
pub fn normalize_target(target: &str) -> String {
    let cleaned = target.replace('\\', "/");
    let cleaned = strip_extension(&cleaned);

    cleaned
        .split('/')
        .filter(|seg| {
            !seg.is_empty() && !matches!(*seg, "." | ".." | "Index" | "Brain Guides")
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Drop a trailing `.ext` from the last path segment, if any.
fn strip_extension(path: &str) -> &str {
    let seg_start = path.rfind('/').map_or(0, |pos| pos + 1);
    match path[seg_start..].rfind('.') {
        // No dot, or a leading dot (hidden-file style): nothing to strip.
        None | Some(0) => path,
        Some(dot) => &path[..seg_start + dot],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_simple_and_aliased_forms() {
        let text = "See [[Drugs/Venlafaxine]] and [[Drugs/Sertraline|sertraline]].";
        let links = scan(text);
        assert_eq!(links.len(), 2);

        assert_eq!(links[0].target, "Drugs/Venlafaxine");
        assert_eq!(links[0].display, None);
        assert_eq!(&text[links[0].start..links[0].end], "[[Drugs/Venlafaxine]]");

        assert_eq!(links[1].target, "Drugs/Sertraline");
        assert_eq!(links[1].display, Some("sertraline"));
    }

    #[test]
    fn display_tolerates_single_brackets() {
        let links = scan("[[Drugs/Venlafaxine|venlafaxine [XR] form]]");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].display, Some("venlafaxine [XR] form"));
    }

    #[test]
    fn display_ends_at_the_first_double_bracket() {
        // `[XR]` flush against the closer: the first `]]` wins.
        let text = "[[Drugs/Venlafaxine|venlafaxine [XR]]]";
        let links = scan(text);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].display, Some("venlafaxine [XR"));
        assert_eq!(&text[links[0].end..], "]");
    }

    #[test]
    fn brackets_in_target_abandon_the_candidate() {
        assert!(scan("[[Drugs/[nested]/Venlafaxine]]").is_empty());
        // A later well-formed link is still found.
        let links = scan("[[bad[target]] then [[Drugs/Venlafaxine]]");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, "Drugs/Venlafaxine");
    }

    #[test]
    fn links_do_not_span_lines() {
        assert!(scan("[[Drugs/Venla\nfaxine]]").is_empty());
        assert!(scan("[[Drugs/Venlafaxine|split\ndisplay]]").is_empty());
    }

    #[test]
    fn unterminated_links_are_ignored() {
        assert!(scan("open [[Drugs/Venlafaxine and nothing closes").is_empty());
        assert!(scan("aliased [[Drugs/Venlafaxine|display").is_empty());
    }

    #[test]
    fn normalizes_the_original_path_shapes() {
        // The path shapes the authoring vault actually produces.
        let cases = [
            ("../../../Index/Drugs/Venlafaxine", "Drugs/Venlafaxine"),
            (
                "../../../Brain Guides/Index/Drugs/Venlafaxine",
                "Drugs/Venlafaxine",
            ),
            ("Index/Drugs/Venlafaxine", "Drugs/Venlafaxine"),
            ("Brain Guides/Index/Drugs/Venlafaxine", "Drugs/Venlafaxine"),
            ("Drugs/Venlafaxine", "Drugs/Venlafaxine"),
            ("../../../Index/Drugs/Venlafaxine.md", "Drugs/Venlafaxine"),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize_target(input), expected, "input: {input}");
        }
    }

    #[test]
    fn normalization_handles_backslashes_and_dotted_names() {
        assert_eq!(
            normalize_target("Index\\Drugs\\Venlafaxine.md"),
            "Drugs/Venlafaxine"
        );
        assert_eq!(normalize_target("Drugs/St. John's Wort.md"), "Drugs/St. John's Wort");
    }
}
