//! Google Cloud Storage backend.
//!
//! Uses the Cloud Storage JSON API with a bearer token from
//! `gcloud auth print-access-token`. Enable with `--features gcp`.
//!
//! Each encryption key has its own bucket, `<project>-<key>-secrets`,
//! holding a single `secrets.yaml` object. Only an HTTP 404 counts as
//! "not provisioned yet".

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use std::cell::OnceCell;
use std::process::Command;
use tracing::{debug, trace};

use super::{ObjectName, SecretStore};
use crate::error::{Result, TransportError};

const STORAGE_API: &str = "https://www.googleapis.com";

/// What a response status says about an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    Found,
    Missing,
    Failed,
}

/// Only a 404 means the object does not exist; any other non-2xx status,
/// including 403, is a failure.
fn lookup(status: StatusCode) -> Lookup {
    if status.is_success() {
        Lookup::Found
    } else if status == StatusCode::NOT_FOUND {
        Lookup::Missing
    } else {
        Lookup::Failed
    }
}

/// The upload API answers with the object's metadata as a JSON object.
fn upload_acknowledged(body: &str) -> bool {
    matches!(
        serde_json::from_str::<serde_json::Value>(body),
        Ok(serde_json::Value::Object(_))
    )
}

/// Buckets of one project
pub struct GcsStore {
    project: String,
    endpoint: String,
    client: Client,
    token: OnceCell<String>,
}

impl GcsStore {
    /// Store for `project` against the public Cloud Storage API
    pub fn new(project: impl Into<String>) -> Self {
        Self::with_endpoint(project, STORAGE_API)
    }

    /// Store against a custom API endpoint (emulators, proxies)
    pub fn with_endpoint(project: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client: Client::new(),
            token: OnceCell::new(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        let name = ObjectName::for_key(&self.project, key);
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.endpoint, name.bucket, name.object
        )
    }

    fn upload_url(&self, key: &str) -> String {
        let name = ObjectName::for_key(&self.project, key);
        format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.endpoint, name.bucket, name.object
        )
    }

    /// Access token, fetched once per run.
    fn token(&self, key: &str) -> Result<&str> {
        if let Some(token) = self.token.get() {
            return Ok(token);
        }

        let failed = |response: String| TransportError::Command {
            operation: "gcloud auth",
            key: key.to_string(),
            response,
        };
        let output = Command::new("gcloud")
            .args(["auth", "print-access-token"])
            .output()
            .map_err(|e| failed(format!("failed to run gcloud: {}", e)))?;
        if !output.status.success() {
            return Err(failed(String::from_utf8_lossy(&output.stderr).to_string()).into());
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(self.token.get_or_init(|| token))
    }

    fn send(
        &self,
        operation: &'static str,
        key: &str,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<Response> {
        let token = self.token(key)?;
        request.bearer_auth(token).send().map_err(|e| {
            TransportError::Command {
                operation,
                key: key.to_string(),
                response: e.to_string(),
            }
            .into()
        })
    }

    fn failure(operation: &'static str, key: &str, response: Response) -> crate::error::Error {
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        TransportError::Status {
            operation,
            key: key.to_string(),
            status,
            response: body,
        }
        .into()
    }
}

impl SecretStore for GcsStore {
    fn exists(&self, key: &str) -> Result<bool> {
        let url = self.object_url(key);
        debug!(key, %url, "checking for secrets object");

        let response = self.send("check secrets", key, self.client.get(&url))?;
        match lookup(response.status()) {
            Lookup::Found => Ok(true),
            Lookup::Missing => Ok(false),
            Lookup::Failed => Err(Self::failure("check secrets", key, response)),
        }
    }

    fn download(&self, key: &str) -> Result<Vec<u8>> {
        let url = format!("{}?alt=media", self.object_url(key));
        let response = self.send("download secrets", key, self.client.get(&url))?;
        if lookup(response.status()) != Lookup::Found {
            return Err(Self::failure("download secrets", key, response));
        }

        let body = response.bytes().map_err(|e| TransportError::Command {
            operation: "download secrets",
            key: key.to_string(),
            response: e.to_string(),
        })?;
        trace!(key, bytes = body.len(), "downloaded secrets object");
        Ok(body.to_vec())
    }

    fn upload(&self, key: &str, data: &[u8]) -> Result<()> {
        let url = self.upload_url(key);
        debug!(key, bytes = data.len(), "uploading secrets object");

        let response = self.send(
            "upload secrets",
            key,
            self.client.post(&url).body(data.to_vec()),
        )?;
        if lookup(response.status()) != Lookup::Found {
            return Err(Self::failure("upload secrets", key, response));
        }

        let body = response.text().unwrap_or_default();
        if !upload_acknowledged(&body) {
            return Err(TransportError::malformed("upload secrets", key, body).into());
        }
        Ok(())
    }
}
