use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use super::EventSink;
use crate::ScraperResult;

/// One JSON file per provider under `base_path`, named by `Provider::output_name`.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    base_path: PathBuf,
}

impl DiskStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> ScraperResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Replaces `file_name` with `events`.
    pub fn store(&self, file_name: &str, events: &EventSink) -> ScraperResult<PathBuf> {
        let path = self.base_path.join(file_name);
        fs::write(&path, events.to_json()?)?;
        info!("Stored {} events in {}", events.len(), path.display());
        Ok(path)
    }

    pub fn load(&self, file_name: &str) -> ScraperResult<EventSink> {
        let json = fs::read_to_string(self.base_path.join(file_name))?;
        EventSink::from_json(&json)
    }
}
