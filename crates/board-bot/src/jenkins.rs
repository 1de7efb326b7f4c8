//! Jenkins build triggering
//!
//! Starts parameterized Jenkins jobs for PRs that reached the test column.

use async_trait::async_trait;
use log::debug;

/// CI job trigger abstraction
#[async_trait]
pub trait JobTrigger: Send + Sync {
    /// Start a parameterized build for a PR
    ///
    /// Returns the build queue ID when Jenkins reports one.
    async fn start(&self, job_name: &str, pr_number: u64) -> anyhow::Result<Option<String>>;
}

/// Jenkins client using the remote access API
pub struct JenkinsClient {
    http: reqwest::Client,
    base_url: String,
    user: String,
    token: String,
}

impl JenkinsClient {
    pub fn new(base_url: String, user: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user,
            token,
        }
    }
}

/// Expand a folder job name ("a/b") into the Jenkins URL path ("job/a/job/b")
fn job_path(job_name: &str) -> String {
    job_name
        .split('/')
        .map(|segment| format!("job/{}", segment))
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl JobTrigger for JenkinsClient {
    async fn start(&self, job_name: &str, pr_number: u64) -> anyhow::Result<Option<String>> {
        let url = format!(
            "{}/{}/buildWithParameters",
            self.base_url,
            job_path(job_name)
        );
        debug!("Triggering Jenkins build: {}", url);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.user, Some(&self.token))
            .query(&[
                ("pr_id", pr_number.to_string()),
                ("apk", format!("--apk={}.apk", pr_number)),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Jenkins rejected build request for '{}': HTTP {}",
                job_name,
                response.status()
            );
        }

        // Jenkins answers 201 with a Location header pointing at the queue item
        let queue_id = response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(|loc| loc.trim_end_matches('/'))
            .and_then(|loc| loc.rsplit('/').next())
            .map(|id| id.to_string());

        Ok(queue_id)
    }
}
