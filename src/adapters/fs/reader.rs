use crate::domain::entity::Inspection;
use crate::domain::ports::InspectionSource;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Loads an inspection dump (`{"types": [...], "functions": [...]}`) from a JSON file.
pub struct JsonInspectionSource {
    path: PathBuf,
}

impl JsonInspectionSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InspectionSource for JsonInspectionSource {
    fn load(&self) -> Result<Inspection> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read inspection file: {}", self.path.display()))?;
        let inspection: Inspection = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse inspection JSON: {}", self.path.display()))?;
        info!(
            path = %self.path.display(),
            types = inspection.types.len(),
            functions = inspection.functions.len(),
            "loaded inspection"
        );
        Ok(inspection)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
