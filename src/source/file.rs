use std::{fs, path::PathBuf};

use {anyhow::Context, tracing::debug};

use super::{gviz::parse_gviz, DataSource, Row};
use crate::RepertoireError;

// A dataset stored on disk, either as a saved spreadsheet response or as a
// JSON array of row arrays.
#[derive(Clone, Debug)]
pub struct FileSource {
    pub path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for FileSource {
    fn fetch_rows(&self) -> Result<Vec<Row>, RepertoireError> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("could not read '{}'", self.path.display()))?;

        let rows = if text.trim_start().starts_with('[') {
            serde_json::from_str::<Vec<Row>>(&text)
                .with_context(|| format!("'{}' is not an array of rows", self.path.display()))?
        } else {
            parse_gviz(&text).with_context(|| format!("could not load '{}'", self.path.display()))?
        };

        debug!(path = %self.path.display(), rows = rows.len(), "read dataset file");

        Ok(rows)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
