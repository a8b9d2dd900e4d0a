use serde::Deserialize;

use super::deserialize::Entity;

// Descriptions taken from generated moodle docs these can be accessed on any moodle instance with administrator rights via: http://example.com/admin/webservice/documentation.php

/// One section of `core_course_get_contents`
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    /// Section ID
    pub id: u64,
    /// Section name
    pub name: String,
    /// is the section visible
    pub visible: u32,
    /// Section number inside the course
    pub section: u32,
    /// Is the section visible for the user?
    pub uservisible: bool,
    // Label only sections may come without modules
    #[serde(default)]
    pub modules: Vec<Module>,
}

/// An activity inside a section (resource, folder, label, assign, ...)
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct Module {
    /// activity id
    pub id: u64,
    /// activity module name
    pub name: String,
    /// instance id
    pub instance: u64,
    /// Activity context id.
    pub contextid: u64,
    /// is the module visible
    pub visible: u32,
    /// Is the module visible for the user?
    pub uservisible: bool,
    /// is the module visible on course page
    pub visibleoncoursepage: u32,
    /// activity icon url
    pub modicon: String,
    /// activity module type
    pub modname: String,
    /// Type of completion tracking: 0 means none, 1 manual, 2 automatic.
    pub completion: u32,
    /// activity url, missing for labels
    pub url: Option<String>,
    /// Module completion data, only with completion tracking enabled
    pub completiondata: Option<CompletionData>,
    #[serde(default)]
    pub contents: Vec<Content>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionData {
    /// Completion state value: 0 means incomplete, 1 complete, 2 complete pass, 3 complete fail
    pub state: u32,
    /// Timestamp for completion status.
    pub timecompleted: u64,
    /// The user id who has overriden the status.
    pub overrideby: Option<u64>,
    /// Whether the completion status affects the availability of another activity.
    pub valueused: bool,
    /// Whether this activity module has completion enabled.
    pub hascompletion: bool,
    /// Whether this activity module instance tracks completion automatically.
    pub isautomatic: bool,
    /// Checks whether completion can be tracked for this user.
    pub istrackeduser: bool,
    /// Whether this activity is visible to the user.
    pub uservisible: bool,
}

/// A file attached to a module
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Content {
    pub fileurl: String,
    pub filename: String,
    // null for url type contents
    pub filepath: Option<String>,
    pub filesize: u64,
    pub timemodified: u64,
    pub mimetype: Option<String>,
    pub timecreated: Option<u64>,
    pub isexternalfile: Option<bool>,
}

impl Entity for Section {
    const NAME: &'static str = "Section";
}
impl Entity for Module {
    const NAME: &'static str = "Module";
}
impl Entity for CompletionData {
    const NAME: &'static str = "CompletionData";
}
impl Entity for Content {
    const NAME: &'static str = "Content";
}
