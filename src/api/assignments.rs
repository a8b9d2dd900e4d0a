use serde::Deserialize;
use serde_json::Value;

use super::course_contents::Content;
use super::deserialize::{DeserializeError, Entity, MalformedPolicy, Parsed, deserialize_all};

// Shapes of `mod_assign_get_assignments`

/// A course together with its assignments
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    /// course id
    pub id: u64,
    /// course full name
    pub fullname: String,
    /// course short name
    pub shortname: String,
    /// last time modified
    pub timemodified: u64,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct Assignment {
    /// assignment id
    pub id: u64,
    /// course module id
    pub cmid: u64,
    /// course id
    pub course: u64,
    /// assignment name
    pub name: String,
    pub nosubmissions: u32,
    pub submissiondrafts: u32,
    pub sendnotifications: u32,
    pub sendlatenotifications: u32,
    pub sendstudentnotifications: u32,
    pub duedate: u64,
    pub allowsubmissionsfromdate: u64,
    /// negative values refer to a scale
    pub grade: i64,
    pub timemodified: u64,
    pub completionsubmit: u32,
    pub cutoffdate: u64,
    pub gradingduedate: u64,
    pub teamsubmission: u32,
    pub requireallteammemberssubmit: u32,
    pub teamsubmissiongroupingid: u64,
    pub blindmarking: u32,
    pub hidegrader: Option<u32>,
    pub revealidentities: u32,
    pub attemptreopenmethod: String,
    /// -1 means unlimited
    pub maxattempts: i32,
    pub markingworkflow: u32,
    pub markingallocation: u32,
    pub requiresubmissionstatement: u32,
    pub preventsubmissionnotingroup: Option<u32>,
    #[serde(default)]
    pub configs: Vec<AssignmentConfig>,
    /// assignment intro, not allways returned because it depends on the activity configuration
    pub intro: Option<String>,
    pub introformat: Option<u32>,
    #[serde(default)]
    pub introfiles: Vec<IntroAttachment>,
    #[serde(default)]
    pub introattachments: Vec<IntroAttachment>,
}

/// A plugin setting of an assignment
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentConfig {
    pub plugin: String,
    pub subtype: String,
    pub name: String,
    pub value: String,
}

/// A file handed out with the assignment description, moodle uses the file shape of course contents
pub type IntroAttachment = Content;

impl Entity for Course {
    const NAME: &'static str = "Course";
}
impl Entity for Assignment {
    const NAME: &'static str = "Assignment";
}
impl Entity for AssignmentConfig {
    const NAME: &'static str = "AssignmentConfig";
}

/// Reads the `courses` list of a `mod_assign_get_assignments` response
pub fn parse_assignments(
    raw: &Value,
    policy: MalformedPolicy,
) -> Result<Parsed<Course>, DeserializeError> {
    match raw.get("courses") {
        Some(courses) => deserialize_all(courses, policy),
        None => Err(DeserializeError::MissingRequiredField {
            entity: "Assignments",
            field: "courses",
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn assignment_json() -> Value {
        json!({
            "id": 3, "cmid": 30, "course": 5, "name": "Sheet 1",
            "nosubmissions": 0, "submissiondrafts": 0, "sendnotifications": 0,
            "sendlatenotifications": 0, "sendstudentnotifications": 1,
            "duedate": 1700000000, "allowsubmissionsfromdate": 0, "grade": 100,
            "timemodified": 1690000000, "completionsubmit": 0, "cutoffdate": 0,
            "gradingduedate": 0, "teamsubmission": 0, "requireallteammemberssubmit": 0,
            "teamsubmissiongroupingid": 0, "blindmarking": 0, "hidegrader": 0,
            "revealidentities": 0, "attemptreopenmethod": "none", "maxattempts": -1,
            "markingworkflow": 0, "markingallocation": 0, "requiresubmissionstatement": 0,
            "preventsubmissionnotingroup": 0,
            "configs": [{ "plugin": "file", "subtype": "assignsubmission", "name": "enabled", "value": "1" }],
            "intro": "<p>Solve it</p>", "introformat": 1, "introfiles": [],
            "introattachments": [{
                "filename": "sheet1.pdf", "filepath": "/", "filesize": 10,
                "fileurl": "https://x.test/sheet1.pdf", "timemodified": 1690000000,
                "mimetype": "application/pdf", "isexternalfile": false
            }]
        })
    }

    #[test]
    fn parses_assignment_response() {
        let raw = json!({
            "courses": [{
                "id": 5, "fullname": "CS101", "shortname": "cs101",
                "timemodified": 1690000000, "assignments": [assignment_json()]
            }],
            "warnings": []
        });
        let courses = parse_assignments(&raw, MalformedPolicy::Abort).unwrap().records;
        let assignment = &courses[0].assignments[0];
        assert_eq!(assignment.maxattempts, -1);
        assert_eq!(assignment.configs[0].plugin, "file");
        assert_eq!(assignment.introattachments[0].filename, "sheet1.pdf");
    }

    #[test]
    fn missing_courses_key_fails() {
        let err = parse_assignments(&json!({ "warnings": [] }), MalformedPolicy::Skip).unwrap_err();
        assert!(matches!(
            err,
            DeserializeError::MissingRequiredField { field: "courses", .. }
        ));
    }
}
