pub mod cli;
pub mod file_config;

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use tracing::debug;
use url::Url;

use crate::api::{Api, deserialize::MalformedPolicy};
use crate::extract::ExtensionFilter;
use crate::status_bar::StatusBar;
use crate::Result;

use cli::Cli;
use file_config::{FileConfig, read_config};

/// Folder below the save path receiving course files
pub const CONTENT_FOLDER: &str = "Course_Content";
/// Folder below the save path receiving assignment attachments
pub const ASSIGNMENTS_FOLDER: &str = "Assignments";

/// Runtime configuration shared by every part of a run
#[derive(Debug)]
pub struct Config {
    pub api: Api,
    /// Course to download, asked for interactively if missing
    pub course_id: Option<u64>,
    pub content_dir: PathBuf,
    pub assignments_dir: PathBuf,
    pub file_filter: ExtensionFilter,
    pub parallel_downloads: usize,
    pub assignments: bool,
    pub assume_yes: bool,
    pub on_malformed: MalformedPolicy,
    pub log_file: Option<PathBuf>,
    pub status_bar: StatusBar,
}

/// Checks the endpoint and token before any request is made
///
/// Returns a message explaining how to fix the first problem found.
pub fn validate_inputs(url: &str, token: &str) -> std::result::Result<Url, String> {
    if url.trim().is_empty() {
        return Err(
            "Please set a URL endpoint, either with the MOODLE_URL environment variable or via the --url parameter."
                .to_string(),
        );
    }
    if token.trim().is_empty() {
        return Err(
            "Please set a token, either with the MOODLE_TOKEN environment variable or via the --token parameter."
                .to_string(),
        );
    }
    match Url::parse(url.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(parsed),
        _ => Err(format!("Not a valid URL: {}", url)),
    }
}

impl Config {
    /// Merges command line arguments over the optional config file
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => read_config(path)?,
            None => FileConfig::default(),
        };

        let url = cli.url.or(file.url).unwrap_or_default();
        let token = cli.token.or(file.wstoken).unwrap_or_default();
        let instance_url = validate_inputs(&url, &token).map_err(|e| anyhow!(e))?;

        let save_path = match cli.save_path.or(file.save_path) {
            Some(path) => path,
            None => std::env::current_dir().context("Could not determine current directory")?,
        };
        let file_filter = match file.file_extensions {
            Some(extensions) => ExtensionFilter::new(extensions),
            None => ExtensionFilter::default(),
        };

        let config = Config {
            api: Api::new(&instance_url, token)?,
            course_id: cli.cid.or(file.course_id),
            content_dir: save_path.join(CONTENT_FOLDER),
            assignments_dir: save_path.join(ASSIGNMENTS_FOLDER),
            file_filter,
            parallel_downloads: cli
                .parallel_downloads
                .or(file.parallel_downloads)
                .unwrap_or(1)
                .max(1),
            assignments: cli.assignments || file.assignments.unwrap_or(false),
            assume_yes: cli.yes,
            on_malformed: file.on_malformed.unwrap_or_default(),
            log_file: cli.log_file.or(file.log_file),
            status_bar: StatusBar::default(),
        };
        debug!("Using config: {:?}", config);
        Ok(config)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;

    use super::*;

    /// Non interactive config talking to `url`
    pub(crate) fn test_config(url: &str, save_path: &Path) -> Config {
        let instance_url = Url::parse(url).unwrap();
        Config {
            api: Api::new(&instance_url, "secret".to_string()).unwrap(),
            course_id: None,
            content_dir: save_path.join(CONTENT_FOLDER),
            assignments_dir: save_path.join(ASSIGNMENTS_FOLDER),
            file_filter: ExtensionFilter::default(),
            parallel_downloads: 1,
            assignments: false,
            assume_yes: true,
            on_malformed: MalformedPolicy::Abort,
            log_file: None,
            status_bar: StatusBar::default(),
        }
    }

    fn cli(url: Option<&str>, token: Option<&str>) -> Cli {
        Cli {
            url: url.map(str::to_string),
            token: token.map(str::to_string),
            cid: None,
            save_path: Some(PathBuf::from("/tmp/moodle")),
            config: None,
            yes: false,
            assignments: false,
            parallel_downloads: None,
            log_file: None,
        }
    }

    #[test]
    fn validate_inputs_accepts_valid_input() {
        assert!(validate_inputs("https://example.com", "valid_token").is_ok());
    }

    #[test]
    fn validate_inputs_requires_url() {
        let err = validate_inputs("", "valid_token").unwrap_err();
        assert!(err.contains("URL endpoint"));
    }

    #[test]
    fn validate_inputs_requires_token() {
        let err = validate_inputs("https://example.com", "").unwrap_err();
        assert!(err.contains("MOODLE_TOKEN"));
    }

    #[test]
    fn validate_inputs_rejects_garbage_url() {
        let err = validate_inputs("not-a-url", "valid_token").unwrap_err();
        assert!(err.contains("Not a valid URL"));
    }

    #[test]
    fn from_cli_builds_output_folders() {
        let config = Config::from_cli(cli(Some("https://moodle.example.com"), Some("t"))).unwrap();
        assert_eq!(config.content_dir, Path::new("/tmp/moodle/Course_Content"));
        assert_eq!(config.assignments_dir, Path::new("/tmp/moodle/Assignments"));
        assert_eq!(config.parallel_downloads, 1);
        assert_eq!(config.on_malformed, MalformedPolicy::Abort);
    }

    #[test]
    fn from_cli_fails_without_token() {
        assert!(Config::from_cli(cli(Some("https://moodle.example.com"), None)).is_err());
    }

    #[test]
    fn from_cli_reads_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("moodle.yml");
        std::fs::write(
            &path,
            "url: https://moodle.example.com\nwstoken: abc\nparallel_downloads: 4\nfile_extensions: ['.tex']\n",
        )
        .unwrap();
        let mut args = cli(None, None);
        args.config = Some(path);

        let config = Config::from_cli(args).unwrap();
        assert_eq!(config.parallel_downloads, 4);
        assert!(config.file_filter.matches("notes.tex"));
        assert!(!config.file_filter.matches("notes.pdf"));
    }
}
