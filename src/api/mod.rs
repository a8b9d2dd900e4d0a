use std::fmt;

use reqwest::Client;
use url::Url;

use crate::Result;

pub mod assignments;
pub mod course_contents;
pub mod deserialize;
pub mod errors;
pub mod recent_courses;
pub mod rest;
mod rest_api;

/// Path of the rest server relative to the moodle root
const REST_SERVER_PATH: &str = "webservice/rest/server.php";

/// Client for the moodle web service
#[derive(Clone)]
pub struct Api {
    /// The client used for requests
    pub client: Client,
    /// Url of `server.php`
    pub endpoint: Url,
    /// web service token (as used by the official moodle app)
    wstoken: String,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("endpoint", &self.endpoint.as_str())
            .field("wstoken", &"<hidden>")
            .finish()
    }
}

impl Api {
    /// Accepts either the moodle root (e.g. https://moodle.example.com) or the full rest endpoint
    pub fn new(instance_url: &Url, wstoken: String) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Api {
            client,
            endpoint: rest_endpoint(instance_url)?,
            wstoken,
        })
    }

    pub fn wstoken(&self) -> &str {
        &self.wstoken
    }

    /// Whether `url` is served by this moodle instance (same scheme, host and port)
    pub fn serves(&self, url: &Url) -> bool {
        url.origin() == self.endpoint.origin()
    }
}

fn rest_endpoint(instance_url: &Url) -> Result<Url> {
    if instance_url.path().ends_with("server.php") {
        return Ok(instance_url.clone());
    }
    let mut base = instance_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(REST_SERVER_PATH)?)
}
