// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background job execution.
//!
//! Every backend request and image decode runs on one worker thread, in the
//! order the jobs were submitted. Results travel back to the UI thread over
//! a channel and are applied there. A single FIFO worker means requests for
//! different images can never overtake each other at the backend.

use crate::io::backend::{AnnotationStatus, Backend, BackendError};
use crate::io::media::{self, LoadedImage};
use crate::models::properties::PropertySchema;
use crate::models::roi::Roi;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Persist one image's ROI list.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub filename: String,
    pub rois: Vec<Roi>,
    /// Store revision the list was captured at.
    pub revision: u64,
}

/// Open another image: save the previous one, then decode, then fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchRequest {
    pub save: Option<SaveRequest>,
    pub filename: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Switch(SwitchRequest),
    Save(SaveRequest),
    Status(Vec<String>),
    Schema,
    SetAnnotationDir(String),
    Icon(String),
}

#[derive(Debug)]
pub struct SaveOutcome {
    pub filename: String,
    pub revision: u64,
    pub saved_len: usize,
    pub result: Result<(), BackendError>,
}

#[derive(Debug)]
pub struct SwitchOutcome {
    pub filename: String,
    pub saved: Option<SaveOutcome>,
    /// Decoded image and its stored ROIs, or the decode error.
    pub loaded: Result<(LoadedImage, Vec<Roi>), String>,
}

#[derive(Debug)]
pub enum JobOutcome {
    Switched(SwitchOutcome),
    Saved(SaveOutcome),
    Status(Result<HashMap<String, AnnotationStatus>, BackendError>),
    Schema(Result<PropertySchema, BackendError>),
    AnnotationDirSet(Result<String, BackendError>),
    Icon {
        name: String,
        result: Result<LoadedImage, String>,
    },
}

fn save(backend: &dyn Backend, request: SaveRequest) -> SaveOutcome {
    let result = backend.save_annotations(&request.filename, &request.rois);
    match &result {
        Ok(()) => log::info!("Annotations for {} saved.", request.filename),
        Err(e) => log::warn!("Error saving annotations for {}: {}", request.filename, e),
    }
    SaveOutcome {
        filename: request.filename,
        revision: request.revision,
        saved_len: request.rois.len(),
        result,
    }
}

/// Execute one job against `backend`. Blocking.
pub fn run_job(backend: &dyn Backend, job: Job) -> JobOutcome {
    match job {
        Job::Switch(request) => {
            let saved = request.save.map(|s| save(backend, s));
            let loaded = media::load_image(&request.path)
                .map_err(|e| format!("{:#}", e))
                .map(|image| {
                    let rois = backend.load_annotations(&request.filename).unwrap_or_else(|e| {
                        log::warn!("Could not load annotations for {}: {}", request.filename, e);
                        Vec::new()
                    });
                    (image, rois)
                });
            JobOutcome::Switched(SwitchOutcome {
                filename: request.filename,
                saved,
                loaded,
            })
        }
        Job::Save(request) => JobOutcome::Saved(save(backend, request)),
        Job::Status(filenames) => JobOutcome::Status(backend.annotation_status(&filenames)),
        Job::Schema => JobOutcome::Schema(backend.properties_config()),
        Job::SetAnnotationDir(path) => {
            JobOutcome::AnnotationDirSet(backend.set_annotation_dir(&path))
        }
        Job::Icon(name) => {
            let result = backend
                .icon(&name)
                .map_err(|e| e.to_string())
                .and_then(|bytes| media::decode_bytes(&bytes).map_err(|e| format!("{:#}", e)));
            JobOutcome::Icon { name, result }
        }
    }
}

/// Handle to the worker thread.
pub struct Worker {
    jobs: Option<Sender<Job>>,
    results: Receiver<JobOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Start the worker. `notify` is called after each finished job so the
    /// UI can wake up and poll.
    pub fn spawn(backend: Arc<dyn Backend>, notify: Box<dyn Fn() + Send>) -> Self {
        let (job_tx, job_rx) = channel::<Job>();
        let (result_tx, result_rx) = channel();

        let handle = std::thread::Builder::new()
            .name("roids-worker".to_string())
            .spawn(move || {
                for job in job_rx {
                    let outcome = run_job(backend.as_ref(), job);
                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                    notify();
                }
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Failed to start worker thread: {}", e);
                None
            }
        };

        Self {
            jobs: Some(job_tx),
            results: result_rx,
            handle,
        }
    }

    pub fn submit(&self, job: Job) {
        let sent = self.jobs.as_ref().map(|tx| tx.send(job));
        if !matches!(sent, Some(Ok(()))) {
            log::error!("Worker is not running; job dropped");
        }
    }

    /// Next finished job, if any.
    pub fn poll(&self) -> Option<JobOutcome> {
        self.results.try_recv().ok()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop once queued jobs,
        // including pending saves, have run.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{write_png, Call, RecordingBackend};
    use super::*;
    use crate::models::properties::PropertyAssignment;
    use crate::util::geometry::Rect;
    use std::time::Duration;

    fn roi() -> Roi {
        Roi::new(Rect::new(0.0, 0.0, 20.0, 20.0), PropertyAssignment::new())
    }

    #[test]
    fn test_switch_saves_before_fetching() {
        let backend = RecordingBackend::default();
        let path = write_png("switch-b.png", 8, 6);

        let outcome = run_job(
            &backend,
            Job::Switch(SwitchRequest {
                save: Some(SaveRequest {
                    filename: "a.png".to_string(),
                    rois: vec![roi()],
                    revision: 1,
                }),
                filename: "b.png".to_string(),
                path: path.clone(),
            }),
        );

        assert_eq!(
            backend.calls(),
            vec![Call::Save("a.png".to_string()), Call::Load("b.png".to_string())]
        );
        let JobOutcome::Switched(outcome) = outcome else {
            panic!("expected a switch outcome");
        };
        assert!(outcome.saved.unwrap().result.is_ok());
        let (image, rois) = outcome.loaded.unwrap();
        assert_eq!((image.width, image.height), (8, 6));
        assert!(rois.is_empty());

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_failed_fetch_yields_empty_list() {
        let backend = RecordingBackend {
            fail_loads: true,
            ..Default::default()
        };
        backend.stored.lock().unwrap().insert("c.png".to_string(), vec![roi()]);
        let path = write_png("fetchfail-c.png", 4, 4);

        let outcome = run_job(
            &backend,
            Job::Switch(SwitchRequest {
                save: None,
                filename: "c.png".to_string(),
                path: path.clone(),
            }),
        );

        let JobOutcome::Switched(outcome) = outcome else {
            panic!("expected a switch outcome");
        };
        let (image, rois) = outcome.loaded.unwrap();
        assert_eq!((image.width, image.height), (4, 4));
        assert!(rois.is_empty());
        assert_eq!(backend.calls(), vec![Call::Load("c.png".to_string())]);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_decode_failure_skips_fetch() {
        let backend = RecordingBackend::default();

        let outcome = run_job(
            &backend,
            Job::Switch(SwitchRequest {
                save: None,
                filename: "gone.png".to_string(),
                path: PathBuf::from("/definitely/not/here/gone.png"),
            }),
        );

        assert!(backend.calls().is_empty());
        let JobOutcome::Switched(outcome) = outcome else {
            panic!("expected a switch outcome");
        };
        assert!(outcome.loaded.is_err());
    }

    #[test]
    fn test_worker_runs_jobs_in_order() {
        let backend = Arc::new(RecordingBackend::default());
        let worker = Worker::spawn(backend.clone(), Box::new(|| {}));

        worker.submit(Job::Save(SaveRequest {
            filename: "a.png".to_string(),
            rois: vec![roi()],
            revision: 3,
        }));
        worker.submit(Job::Status(vec!["a.png".to_string()]));

        let mut outcomes = Vec::new();
        for _ in 0..200 {
            if let Some(outcome) = worker.poll() {
                outcomes.push(outcome);
                if outcomes.len() == 2 {
                    break;
                }
            } else {
                std::thread::sleep(Duration::from_millis(5));
            }
        }

        assert!(matches!(
            &outcomes[0],
            JobOutcome::Saved(s) if s.revision == 3 && s.result.is_ok()
        ));
        match &outcomes[1] {
            JobOutcome::Status(Ok(map)) => assert_eq!(map["a.png"], AnnotationStatus::Annotated),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(
            backend.calls(),
            vec![Call::Save("a.png".to_string()), Call::Status(vec!["a.png".to_string()])]
        );
    }

    #[test]
    fn test_icon_failure_is_reported() {
        let backend = RecordingBackend::default();
        match run_job(&backend, Job::Icon("cell.png".to_string())) {
            JobOutcome::Icon { name, result } => {
                assert_eq!(name, "cell.png");
                assert!(result.unwrap_err().contains("404"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}
