// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! HTTP client for the annotation server.
//!
//! Requests are blocking and are only ever issued from the background
//! worker, never from the UI thread.

use super::backend::{AnnotationStatus, Backend, BackendError};
use crate::models::properties::PropertySchema;
use crate::models::roi::Roi;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::time::Duration;

/// Upper bound on a downloaded icon.
const MAX_ICON_BYTES: u64 = 8 * 1024 * 1024;

#[derive(Serialize)]
struct StatusRequest<'a> {
    filenames: &'a [String],
}

#[derive(Serialize)]
struct DirRequest<'a> {
    path: &'a str,
}

#[derive(Deserialize)]
struct DirResponse {
    #[serde(default)]
    path: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    description: Option<String>,
    message: Option<String>,
}

/// Backend that talks to the annotation server over HTTP.
pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn annotation_url(&self, filename: &str) -> String {
        self.url(&format!("/annotations/{}", encode_segment(filename)))
    }
}

/// Everything outside the RFC 3986 unreserved set.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Pull a human-readable reason out of a failed response.
fn describe_failure(response: ureq::Response) -> String {
    let status_text = response.status_text().to_string();
    let body = response.into_string().unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody { description: Some(d), .. }) | Ok(ErrorBody { message: Some(d), .. }) => d,
        _ if !body.trim().is_empty() && body.len() < 512 => body.trim().to_string(),
        _ => status_text,
    }
}

impl From<ureq::Error> for BackendError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => BackendError::Status {
                code,
                description: describe_failure(response),
            },
            ureq::Error::Transport(transport) => BackendError::Transport(transport.to_string()),
        }
    }
}

impl Backend for HttpBackend {
    fn properties_config(&self) -> Result<PropertySchema, BackendError> {
        let schema = self
            .agent
            .get(&self.url("/get_properties_config"))
            .call()?
            .into_json()?;
        Ok(schema)
    }

    fn annotation_status(
        &self,
        filenames: &[String],
    ) -> Result<HashMap<String, AnnotationStatus>, BackendError> {
        if filenames.is_empty() {
            return Ok(HashMap::new());
        }
        let status = self
            .agent
            .post(&self.url("/batch_annotation_status"))
            .send_json(StatusRequest { filenames })?
            .into_json()?;
        Ok(status)
    }

    fn load_annotations(&self, filename: &str) -> Result<Vec<Roi>, BackendError> {
        match self.agent.get(&self.annotation_url(filename)).call() {
            Ok(response) => Ok(response.into_json()?),
            Err(ureq::Error::Status(code, _)) => {
                log::debug!("No annotations for {} (status {})", filename, code);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save_annotations(&self, filename: &str, rois: &[Roi]) -> Result<(), BackendError> {
        self.agent
            .post(&self.annotation_url(filename))
            .send_json(rois)?;
        Ok(())
    }

    fn set_annotation_dir(&self, path: &str) -> Result<String, BackendError> {
        let response: DirResponse = self
            .agent
            .post(&self.url("/set_annotation_dir"))
            .send_json(DirRequest { path })
            .map_err(|e| match BackendError::from(e) {
                BackendError::Status { description, .. } => BackendError::Rejected(description),
                other => other,
            })?
            .into_json()?;
        Ok(response.path.unwrap_or_else(|| path.to_string()))
    }

    fn icon(&self, name: &str) -> Result<Vec<u8>, BackendError> {
        let response = self
            .agent
            .get(&self.url(&format!("/static/icons/{}", encode_segment(name))))
            .call()?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_ICON_BYTES)
            .read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}
