use serde_json::Value;

use super::Api;
use super::errors::ApiError;
use super::rest::build_url;

// Raw responses of the web service functions in use, typed by `deserialize`
impl Api {
    /// Courses the user accessed recently
    pub async fn core_course_get_recent_courses(&self) -> Result<Value, ApiError> {
        let url = build_url(&self.endpoint, "core_course_get_recent_courses", &[]);
        self.request_json(&url).await
    }

    /// Sections, modules and files of a course
    pub async fn core_course_get_contents(&self, course_id: u64) -> Result<Value, ApiError> {
        let course_id = course_id.to_string();
        let url = build_url(
            &self.endpoint,
            "core_course_get_contents",
            &[("courseid", Some(course_id.as_str()))],
        );
        self.request_json(&url).await
    }

    /// Assignments of a course
    pub async fn mod_assign_get_assignments(&self, course_id: u64) -> Result<Value, ApiError> {
        let course_id = course_id.to_string();
        let url = build_url(
            &self.endpoint,
            "mod_assign_get_assignments",
            &[("courseids[]", Some(course_id.as_str()))],
        );
        self.request_json(&url).await
    }
}
