use serde::Deserialize;

use super::deserialize::Entity;

/// A course returned by `core_course_get_recent_courses`
///
/// Only the identity and the `hidden` flag are required, the rest differs
/// between moodle versions.
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct RecentCourse {
    pub id: u64,
    pub fullname: String,
    pub shortname: String,
    /// Hidden from the dashboard by the user
    pub hidden: bool,
    pub idnumber: Option<String>,
    pub summary: Option<String>,
    pub summaryformat: Option<u32>,
    pub startdate: Option<u64>,
    pub enddate: Option<u64>,
    pub visible: Option<bool>,
    pub fullnamedisplay: Option<String>,
    pub viewurl: Option<String>,
    pub courseimage: Option<String>,
    /// Percentage, null when completion is not tracked
    pub progress: Option<f64>,
    pub hasprogress: Option<bool>,
    pub isfavourite: Option<bool>,
    pub timeaccess: Option<u64>,
    pub showshortname: Option<bool>,
    pub coursecategory: Option<String>,
}

impl Entity for RecentCourse {
    const NAME: &'static str = "RecentCourse";
}

/// Courses that should be offered for download
pub fn visible_courses(courses: &[RecentCourse]) -> Vec<&RecentCourse> {
    courses.iter().filter(|course| !course.hidden).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::deserialize::{MalformedPolicy, deserialize_all};

    #[test]
    fn hidden_courses_are_not_offered() {
        let raw = json!([
            { "id": 5, "fullname": "CS101", "shortname": "cs101", "hidden": false, "progress": null },
            { "id": 6, "fullname": "Old", "shortname": "old", "hidden": true, "progress": 42 }
        ]);
        let courses = deserialize_all::<RecentCourse>(&raw, MalformedPolicy::Abort)
            .unwrap()
            .records;
        let visible: Vec<u64> = visible_courses(&courses).iter().map(|c| c.id).collect();
        assert_eq!(visible, vec![5]);
        assert_eq!(courses[1].progress, Some(42.0));
    }
}
