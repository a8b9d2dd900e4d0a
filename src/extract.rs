//! Flattens a course tree into the files that should be downloaded

use crate::api::assignments::Course;
use crate::api::course_contents::{Content, Section};

/// File endings downloaded unless configured otherwise
///
/// Matching is case sensitive, hence `.pdf` and `.PDF`.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".pdf", ".PDF", ".py", ".csv", ".xls", ".doc", ".docx", ".docm", ".ipynb", ".jpg", ".jpeg",
    ".png", ".md", ".html", ".ppt", ".pptx", ".txt", ".tex",
];

/// Allow-list of filename suffixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExtensionFilter {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, filename: &str) -> bool {
        self.extensions.iter().any(|ext| filename.ends_with(ext.as_str()))
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        ExtensionFilter::new(DEFAULT_EXTENSIONS.iter().copied())
    }
}

/// A file found in the course tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub filename: String,
}

impl From<&Content> for Candidate {
    fn from(content: &Content) -> Self {
        Candidate {
            url: content.fileurl.clone(),
            filename: content.filename.clone(),
        }
    }
}

/// Every content of the tree in section, module, content order
pub fn contents(sections: &[Section]) -> impl Iterator<Item = &Content> {
    sections
        .iter()
        .flat_map(|section| section.modules.iter())
        .flat_map(|module| module.contents.iter())
}

/// Contents whose filename ends with an allowed extension, in tree order
///
/// Files referenced by more than one module are returned once per module.
pub fn extract_and_filter(sections: &[Section], filter: &ExtensionFilter) -> Vec<Candidate> {
    contents(sections)
        .filter(|content| filter.matches(&content.filename))
        .map(Candidate::from)
        .collect()
}

/// Intro attachments of all assignments passing the filter
pub fn extract_assignment_attachments(courses: &[Course], filter: &ExtensionFilter) -> Vec<Candidate> {
    courses
        .iter()
        .flat_map(|course| course.assignments.iter())
        .flat_map(|assignment| assignment.introattachments.iter())
        .filter(|attachment| filter.matches(&attachment.filename))
        .map(Candidate::from)
        .collect()
}
