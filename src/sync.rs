use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use dialoguer::{Confirm, Select};
use tokio::fs;
use tracing::{info, warn};

use crate::api::{
    assignments::parse_assignments,
    course_contents::Section,
    deserialize::{DeserializeError, Parsed, deserialize_all},
    recent_courses::{RecentCourse, visible_courses},
};
use crate::config::Config;
use crate::download::{DownloadItem, DownloadReport};
use crate::extract::{Candidate, contents, extract_and_filter, extract_assignment_attachments};
use crate::Result;

impl Config {
    /// Lists the courses, fetches the chosen one and downloads its files
    pub async fn run(config: Arc<Config>) -> Result<Vec<DownloadReport>> {
        for dir in [&config.content_dir, &config.assignments_dir] {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Could not create {}", dir.display()))?;
        }

        let courses = config.recent_courses().await?;
        let course_id = match config.course_id {
            Some(course_id) => course_id,
            None => select_course(&courses)?,
        };

        let sections = config.course_sections(course_id).await?;
        let candidates = extract_and_filter(&sections, &config.file_filter);
        let filtered_out = contents(&sections).count() - candidates.len();
        config.status_bar.register_skipped(filtered_out).await;

        let attachments = if config.assignments {
            config.assignment_attachments(course_id).await?
        } else {
            Vec::new()
        };

        if candidates.is_empty() && attachments.is_empty() {
            info!("No files found in the specified course.");
            return Ok(Vec::new());
        }

        info!("Received the following content:");
        for candidate in candidates.iter().chain(attachments.iter()) {
            info!("  {}", candidate.filename);
        }
        if !config.assume_yes && !confirm_download()? {
            info!("Abort!");
            return Ok(Vec::new());
        }

        let mut items: Vec<DownloadItem> = candidates
            .into_iter()
            .map(|candidate| DownloadItem::from_candidate(candidate, &config.content_dir))
            .collect();
        items.extend(
            attachments
                .into_iter()
                .map(|candidate| DownloadItem::from_candidate(candidate, &config.assignments_dir)),
        );

        info!("Starting download of {} files...", items.len());
        let reports = Config::download_all(config.clone(), items).await;
        info!(
            "Downloaded files to {}",
            config.content_dir.parent().unwrap_or(Path::new(".")).display()
        );
        Ok(reports)
    }

    /// Courses of the user, logging the ones offered for download
    async fn recent_courses(&self) -> Result<Vec<RecentCourse>> {
        let raw = self
            .api
            .core_course_get_recent_courses()
            .await
            .context("Failed getting your courses")?;
        let courses = self
            .records(deserialize_all::<RecentCourse>(&raw, self.on_malformed))
            .await
            .context("Unexpected course list")?;

        info!("You are in the following courses:");
        for course in visible_courses(&courses) {
            info!("  {} {}", course.id, course.fullname);
        }
        Ok(courses)
    }

    async fn course_sections(&self, course_id: u64) -> Result<Vec<Section>> {
        let raw = self
            .api
            .core_course_get_contents(course_id)
            .await
            .with_context(|| format!("Invalid course ID or no content found for course {}", course_id))?;
        self.records(deserialize_all::<Section>(&raw, self.on_malformed))
            .await
            .with_context(|| format!("Unexpected contents of course {}", course_id))
    }

    async fn assignment_attachments(&self, course_id: u64) -> Result<Vec<Candidate>> {
        let raw = self
            .api
            .mod_assign_get_assignments(course_id)
            .await
            .with_context(|| format!("Failed getting assignments of course {}", course_id))?;
        let courses = self
            .records(parse_assignments(&raw, self.on_malformed))
            .await
            .with_context(|| format!("Unexpected assignments of course {}", course_id))?;
        Ok(extract_assignment_attachments(&courses, &self.file_filter))
    }

    /// Unwraps a parsed batch, counting dropped records as skipped
    async fn records<T>(&self, parsed: std::result::Result<Parsed<T>, DeserializeError>) -> Result<Vec<T>> {
        let parsed = parsed?;
        if !parsed.skipped.is_empty() {
            warn!("Ignored {} malformed records", parsed.skipped.len());
            self.status_bar.register_skipped(parsed.skipped.len()).await;
        }
        Ok(parsed.records)
    }
}

fn select_course(courses: &[RecentCourse]) -> Result<u64> {
    let visible = visible_courses(courses);
    if visible.is_empty() {
        bail!("You are not enrolled in any visible course, pass one with --cid");
    }
    let items: Vec<String> = visible
        .iter()
        .map(|course| format!("{} {}", course.id, course.fullname))
        .collect();
    let selection = Select::new()
        .with_prompt("Which course do you want to dump?")
        .items(&items)
        .default(0)
        .interact()
        .map_err(|e| anyhow!("Course selection failed: {}", e))?;
    Ok(visible[selection].id)
}

fn confirm_download() -> Result<bool> {
    Confirm::new()
        .with_prompt("Do you want to download these files now?")
        .default(true)
        .interact()
        .map_err(|e| anyhow!("Confirmation failed: {}", e))
}
