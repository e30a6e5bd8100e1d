// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Directory-backed annotation store.
//!
//! Keeps the same layout as the annotation server: one pretty-printed
//! `<image name>.json` file per image inside the annotation directory, the
//! default schema in a `properties_config.json` file and icons in a flat
//! directory. Lets the editor run without a server.

use super::backend::{AnnotationStatus, Backend, BackendError};
use crate::models::properties::PropertySchema;
use crate::models::roi::Roi;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub struct LocalBackend {
    annotation_dir: RwLock<PathBuf>,
    properties_config: PathBuf,
    icons_dir: PathBuf,
}

impl LocalBackend {
    pub fn new(annotation_dir: PathBuf, properties_config: PathBuf, icons_dir: PathBuf) -> Self {
        Self {
            annotation_dir: RwLock::new(annotation_dir),
            properties_config,
            icons_dir,
        }
    }

    pub fn annotation_dir(&self) -> PathBuf {
        match self.annotation_dir.read() {
            Ok(dir) => dir.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn annotation_file(&self, filename: &str) -> Result<PathBuf, BackendError> {
        // Names come from the local folder listing; refuse anything that
        // would escape the annotation directory.
        let name = Path::new(filename);
        if name.components().count() != 1 || name.file_name().is_none() {
            return Err(BackendError::Rejected(format!("Invalid file name: {}", filename)));
        }
        Ok(self.annotation_dir().join(format!("{}.json", filename)))
    }

    fn read_list(path: &Path) -> Result<Vec<Roi>, BackendError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Backend for LocalBackend {
    fn properties_config(&self) -> Result<PropertySchema, BackendError> {
        let text = std::fs::read_to_string(&self.properties_config)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn annotation_status(
        &self,
        filenames: &[String],
    ) -> Result<HashMap<String, AnnotationStatus>, BackendError> {
        let mut status = HashMap::new();
        for name in filenames {
            let Ok(path) = self.annotation_file(name) else {
                continue;
            };
            if !path.is_file() {
                continue;
            }
            let value = match Self::read_list(&path) {
                Ok(rois) => AnnotationStatus::of_list(rois.len()),
                Err(e) => {
                    log::warn!("Unreadable annotation file {}: {}", path.display(), e);
                    AnnotationStatus::Unknown
                }
            };
            status.insert(name.clone(), value);
        }
        Ok(status)
    }

    fn load_annotations(&self, filename: &str) -> Result<Vec<Roi>, BackendError> {
        let path = self.annotation_file(filename)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        Self::read_list(&path)
    }

    fn save_annotations(&self, filename: &str, rois: &[Roi]) -> Result<(), BackendError> {
        let path = self.annotation_file(filename)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(rois)?;
        std::fs::write(&path, json)?;
        log::debug!("Wrote {} ROIs to {}", rois.len(), path.display());
        Ok(())
    }

    fn set_annotation_dir(&self, path: &str) -> Result<String, BackendError> {
        if path.trim().is_empty() {
            return Err(BackendError::Rejected("Path is missing.".to_string()));
        }
        let dir = PathBuf::from(path);
        let parent_ok = dir.parent().is_some_and(|p| p.as_os_str().is_empty() || p.is_dir());
        if !dir.is_dir() && !parent_ok {
            return Err(BackendError::Rejected(
                "Invalid or non-existent directory path. The parent directory does not exist."
                    .to_string(),
            ));
        }

        match self.annotation_dir.write() {
            Ok(mut current) => *current = dir.clone(),
            Err(poisoned) => *poisoned.into_inner() = dir.clone(),
        }
        log::info!("Annotation directory changed to: {}", dir.display());
        Ok(dir.display().to_string())
    }

    fn icon(&self, name: &str) -> Result<Vec<u8>, BackendError> {
        let file = Path::new(name);
        if file.components().count() != 1 || file.file_name().is_none() {
            return Err(BackendError::Rejected(format!("Invalid icon name: {}", name)));
        }
        Ok(std::fs::read(self.icons_dir.join(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::properties::{PropertyAssignment, PropertyOption};
    use crate::util::geometry::Rect;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn scratch_dir() -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!("roids-local-{}-{}", std::process::id(), n));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn backend(root: &Path) -> LocalBackend {
        LocalBackend::new(
            root.join("annotations"),
            root.join("properties_config.json"),
            root.join("icons"),
        )
    }

    fn roi(x: f64, class: &str) -> Roi {
        let mut props = PropertyAssignment::new();
        props.insert("Class".to_string(), PropertyOption::new(class).with_icon("c.png"));
        props.insert("Quality".to_string(), PropertyOption::new("Good"));
        Roi::new(Rect::new(x, 2.0, 30.0, 40.0), props)
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let root = scratch_dir();
        let store = backend(&root);
        let rois = vec![roi(1.0, "Cell"), roi(50.0, "Debris")];

        store.save_annotations("a.png", &rois).unwrap();
        assert!(root.join("annotations/a.png.json").is_file());
        assert_eq!(store.load_annotations("a.png").unwrap(), rois);

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let root = scratch_dir();
        let store = backend(&root);

        assert!(store.load_annotations("nothing.png").unwrap().is_empty());

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn test_status() {
        let root = scratch_dir();
        let store = backend(&root);
        store.save_annotations("a.png", &[roi(1.0, "Cell")]).unwrap();
        store.save_annotations("b.png", &[]).unwrap();

        let names: Vec<String> = ["a.png", "b.png", "c.png"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let status = store.annotation_status(&names).unwrap();

        assert_eq!(status.get("a.png"), Some(&AnnotationStatus::Annotated));
        assert_eq!(status.get("b.png"), Some(&AnnotationStatus::Empty));
        assert_eq!(status.get("c.png"), None);

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn test_rejects_path_traversal() {
        let root = scratch_dir();
        let store = backend(&root);

        assert!(matches!(
            store.save_annotations("../escape.png", &[]),
            Err(BackendError::Rejected(_))
        ));

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn test_set_annotation_dir() {
        let root = scratch_dir();
        let store = backend(&root);

        let new_dir = root.join("elsewhere");
        let result = store.set_annotation_dir(new_dir.to_str().unwrap()).unwrap();
        assert_eq!(PathBuf::from(result), new_dir);
        store.save_annotations("a.png", &[roi(1.0, "Cell")]).unwrap();
        assert!(new_dir.join("a.png.json").is_file());

        let bad = root.join("missing/deeper");
        let err = store.set_annotation_dir(bad.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("parent directory does not exist"));
        assert_eq!(store.annotation_dir(), new_dir);

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn test_properties_config() {
        let root = scratch_dir();
        std::fs::write(
            root.join("properties_config.json"),
            r#"{"Class": [{"name": "Cell"}, {"name": "Debris"}]}"#,
        )
        .unwrap();

        let schema = backend(&root).properties_config().unwrap();
        assert_eq!(schema.options("Class").unwrap().len(), 2);

        let _ = std::fs::remove_dir_all(root);
    }
}
