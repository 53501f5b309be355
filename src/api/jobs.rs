//! Job operations.
//!
//! Job names are full names: `team/app` is the job `app` inside the folder
//! `team`.

use crate::api::exists;
use crate::client::Jenkins;
use crate::error::Result;
use crate::protocol::{folder_and_job, folder_path, job_path, JobConfig};
use crate::types::RequestOptions;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const JOBS_TREE: &str = "jobs[name,url,_class]";

/// Entry of a job listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobSummary {
    /// Short name, without folders.
    pub name: String,
    /// Job URL as published by the server.
    #[serde(default)]
    pub url: String,
    /// Implementation class, e.g. `hudson.model.FreeStyleProject`.
    #[serde(rename = "_class", default)]
    pub class: String,
}

impl JobSummary {
    /// Whether the item contains other jobs (folders, multibranch projects,
    /// organization folders).
    pub fn is_folder(&self) -> bool {
        self.class.ends_with("Folder") || self.class.ends_with("MultiBranchProject")
    }
}

#[derive(Deserialize)]
struct JobList {
    #[serde(default)]
    jobs: Vec<JobSummary>,
}

/// Handle for job operations, see [`Jenkins::jobs`].
#[derive(Clone, Copy)]
pub struct Jobs<'a> {
    jenkins: &'a Jenkins,
}

impl<'a> Jobs<'a> {
    pub(crate) fn new(jenkins: &'a Jenkins) -> Self {
        Jobs { jenkins }
    }

    /// Create a job from a `config.xml` document.
    pub async fn create(&self, name: &str, config: &str) -> Result<()> {
        let (_, job) = folder_and_job(name);
        let path = format!("{}createItem", folder_path(name));
        self.jenkins
            .post(&path, RequestOptions::new().query("name", job).xml(config))
            .await
    }

    /// Delete a job.
    pub async fn delete(&self, name: &str) -> Result<()> {
        self.jenkins
            .post(&format!("{}doDelete", job_path(name)), RequestOptions::new())
            .await
    }

    /// Allow the job to be built.
    pub async fn enable(&self, name: &str) -> Result<()> {
        self.jenkins
            .post(&format!("{}enable", job_path(name)), RequestOptions::new())
            .await
    }

    /// Prevent the job from being built.
    pub async fn disable(&self, name: &str) -> Result<()> {
        self.jenkins
            .post(&format!("{}disable", job_path(name)), RequestOptions::new())
            .await
    }

    /// The job's `config.xml`.
    pub async fn get_config(&self, name: &str) -> Result<String> {
        self.jenkins
            .get_text(&format!("{}config.xml", job_path(name)), RequestOptions::new())
            .await
    }

    /// Replace the job's `config.xml`.
    pub async fn reconfigure(&self, name: &str, config: &str) -> Result<()> {
        self.jenkins
            .post(
                &format!("{}config.xml", job_path(name)),
                RequestOptions::new().xml(config),
            )
            .await
    }

    /// Job details (`api/json`).
    pub async fn get_info(&self, name: &str) -> Result<Value> {
        self.jenkins
            .get_json(&format!("{}api/json", job_path(name)), RequestOptions::new())
            .await
    }

    /// Whether the job exists.
    pub async fn is_exists(&self, name: &str) -> Result<bool> {
        exists(self.get_info(name).await)
    }

    /// All jobs keyed by full name, descending into folders.
    ///
    /// Folders themselves are not listed.
    pub async fn get_all(&self) -> Result<BTreeMap<String, JobSummary>> {
        let mut jobs = BTreeMap::new();
        let mut pending = vec![(String::new(), "/api/json".to_string())];

        while let Some((prefix, path)) = pending.pop() {
            let list: JobList = self
                .jenkins
                .get_json(&path, RequestOptions::new().query("tree", JOBS_TREE))
                .await?;

            for job in list.jobs {
                let full_name = format!("{}{}", prefix, job.name);
                if job.is_folder() {
                    let path = format!("{}api/json", job_path(&full_name));
                    pending.push((format!("{}/", full_name), path));
                } else {
                    jobs.insert(full_name, job);
                }
            }
        }

        Ok(jobs)
    }

    /// Create `new_name` as a copy of `name`.
    pub async fn copy(&self, name: &str, new_name: &str) -> Result<()> {
        let (_, job) = folder_and_job(new_name);
        let path = format!("{}createItem", folder_path(new_name));
        let options = RequestOptions::new()
            .query("name", job)
            .query("mode", "copy")
            .query("from", name);
        self.jenkins.post(&path, options).await
    }

    /// Rename a job within its folder.
    pub async fn rename(&self, name: &str, new_name: &str) -> Result<()> {
        let (_, new_job) = folder_and_job(new_name);
        self.jenkins
            .post(
                &format!("{}doRename", job_path(name)),
                RequestOptions::new().query("newName", new_job),
            )
            .await
    }

    /// Render a freestyle job configuration.
    pub fn construct_config(&self, config: &JobConfig) -> String {
        config.to_xml()
    }
}
