pub mod file;
pub mod gviz;
pub mod sheet;

pub use self::{file::FileSource, gviz::parse_gviz, sheet::SheetSource};

use std::{
    sync::mpsc::{self, Receiver},
    thread,
};

use serde_json::Value;

use crate::RepertoireError;

// One source row. Cells are read positionally according to the schema.
pub type Row = Vec<Value>;

// The collaborator supplying the raw dataset.
pub trait DataSource {
    fn fetch_rows(&self) -> Result<Vec<Row>, RepertoireError>;

    // A short human-readable name for messages.
    fn describe(&self) -> String;
}

// Fetches on a background thread. The receiver yields exactly one result.
pub fn fetch_in_background(
    source: Box<dyn DataSource + Send>,
) -> Receiver<Result<Vec<Row>, RepertoireError>> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        _ = tx.send(source.fetch_rows());
    });

    rx
}
