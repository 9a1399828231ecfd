//! Lua filters handed to pandoc.
//!
//! The filters are materialized on disk (pandoc reads them by path) the
//! first time a render runs; existing files are left alone so local edits
//! survive.

use std::path::{Path, PathBuf};

use tracing::debug;

use brainguide_shared::{BrainGuideError, Result};

pub(crate) const IMAGE_SIZE: &str = "image-size.lua";
pub(crate) const REFERENCE_LIST: &str = "reference-list.lua";
pub(crate) const REMOVE_CAPTIONS: &str = "remove-captions.lua";

const IMAGE_SIZE_SRC: &str = r#"function Image (img)
    img.attributes['style'] = 'width: 50%;'
    return img
end
"#;

const REFERENCE_LIST_SRC: &str = r#"function Div (div)
    if div.classes[1] == "references" then
        local list = pandoc.List({})
        for _, item in ipairs(div.content) do
            if item.t == "Div" and item.classes[1] == "csl-entry" then
                list:insert(pandoc.BulletList({pandoc.Para(item.content)}))
            end
        end
        return pandoc.Div(list, {class = "references"})
    end
    return div
end
"#;

const REMOVE_CAPTIONS_SRC: &str = r#"function Image (img)
    img.caption = pandoc.List({})
    img.title = ""
    return img
end
"#;

/// Write any missing filter files into the filters directory.
pub(crate) fn ensure_filters(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| BrainGuideError::io(dir, e))?;

    for (name, source) in [
        (IMAGE_SIZE, IMAGE_SIZE_SRC),
        (REFERENCE_LIST, REFERENCE_LIST_SRC),
        (REMOVE_CAPTIONS, REMOVE_CAPTIONS_SRC),
    ] {
        let path = dir.join(name);
        if !path.exists() {
            std::fs::write(&path, source).map_err(|e| BrainGuideError::io(&path, e))?;
            debug!(path = %path.display(), "materialized Lua filter");
        }
    }

    Ok(())
}

/// Path of one filter within the filters directory.
pub(crate) fn filter_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bg-filters-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn materializes_all_filters() {
        let tmp = temp_dir();
        let filters = tmp.join("filters");

        ensure_filters(&filters).unwrap();

        for name in [IMAGE_SIZE, REFERENCE_LIST, REMOVE_CAPTIONS] {
            assert!(filters.join(name).exists(), "missing {name}");
        }

        let src = std::fs::read_to_string(filters.join(REMOVE_CAPTIONS)).unwrap();
        assert!(src.contains("img.caption"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn existing_filters_are_not_overwritten() {
        let tmp = temp_dir();
        std::fs::write(tmp.join(IMAGE_SIZE), "-- locally edited\n").unwrap();

        ensure_filters(&tmp).unwrap();

        let src = std::fs::read_to_string(tmp.join(IMAGE_SIZE)).unwrap();
        assert_eq!(src, "-- locally edited\n");

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
