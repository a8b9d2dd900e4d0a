pub mod queue;
pub mod request;

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;

use crate::{Result, extract::Candidate};

// Characters windows does not allow in file names
static RE_RESERVED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());

/// A file to fetch and the folder it goes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadItem {
    pub url: String,
    pub folder: PathBuf,
}

impl DownloadItem {
    pub fn from_candidate(candidate: Candidate, folder: &Path) -> Self {
        DownloadItem {
            url: candidate.url,
            folder: folder.to_path_buf(),
        }
    }
}

/// Outcome of a single item, failures do not stop the other items
#[derive(Debug)]
pub struct DownloadReport {
    pub url: String,
    /// Path of the written file
    pub result: Result<PathBuf>,
}

/// Local file name of a download url
///
/// Drops the query, everything up to the last `/` and reserved characters.
pub fn derive_filename(url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    let last_segment = without_query.rsplit('/').next().unwrap_or(without_query);
    let name = last_segment.split('&').next().unwrap_or(last_segment);
    RE_RESERVED.replace_all(name, "").into_owned()
}

/// Ensures that the directory specified by the given `Path` exists.
pub async fn ensure_path_exists(path: &Path) -> Result<()> {
    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_query_and_path() {
        assert_eq!(
            derive_filename("https://example.com/file.pdf?token=123&param=value"),
            "file.pdf"
        );
    }

    #[test]
    fn strips_reserved_characters() {
        assert_eq!(
            derive_filename("https://x.test/file<name>.pdf?token=1&p=2"),
            "filename.pdf"
        );
        assert_eq!(derive_filename("https://x.test/a:b|c*\"d\".txt"), "abcd.txt");
    }

    #[test]
    fn works_without_extension() {
        assert_eq!(derive_filename("https://example.com/document?token=123"), "document");
    }

    #[test]
    fn ignores_slashes_in_query() {
        assert_eq!(
            derive_filename("https://x.test/pluginfile.php/12/mod_resource/content/1/notes.md?forcedownload=1&r=/a/b"),
            "notes.md"
        );
    }

    #[test]
    fn derivation_is_idempotent() {
        for url in [
            "https://x.test/file<name>.pdf?token=1&p=2",
            "https://example.com/document?token=123",
            "https://x.test/dir/a&b.pdf",
            "https://x.test/dir/",
            "plain.txt",
        ] {
            let once = derive_filename(url);
            assert_eq!(derive_filename(&once), once, "{}", url);
        }
    }

    #[tokio::test]
    async fn ensure_path_exists_creates_parents() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("a").join("b").join("c.pdf");
        ensure_path_exists(&file).await.unwrap();
        assert!(file.parent().unwrap().is_dir());
    }
}
