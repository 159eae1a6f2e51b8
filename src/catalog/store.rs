use std::{
    collections::{HashMap, HashSet},
    ops::Deref,
    sync::Arc,
};

use {serde_json::Value, tracing::warn};

use crate::{
    catalog::{Record, TextField},
    config::{ColumnKind, Schema},
    source::Row,
};

// The loaded dataset: records in source order plus the distinct values of
// each text field.
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    records: Vec<Arc<Record>>,
    // Record position by id. The first record wins on duplicate ids.
    index: HashMap<String, usize>,
    distinct: HashMap<TextField, Vec<String>>,
}

impl RecordStore {
    // Maps each row positionally onto a record. Cells that are missing or
    // of the wrong shape default to empty text or a zero status.
    pub fn load(rows: &[Row], schema: &Schema) -> Self {
        let voice_order = schema.voice_order();

        let records = rows
            .iter()
            .map(|row| Arc::new(record_from_row(row, schema, &voice_order)))
            .collect::<Vec<_>>();

        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if index.contains_key(record.id()) {
                warn!(id = record.id(), row = i, "duplicate record id");
            } else {
                index.insert(record.id().to_string(), i);
            }
        }

        let distinct = TextField::ALL
            .into_iter()
            .map(|field| (field, distinct_values(&records, field)))
            .collect();

        Self {
            records,
            index,
            distinct,
        }
    }

    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Record>> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    // The non-blank values of `field`, each once, in order of first appearance.
    pub fn distinct_values(&self, field: TextField) -> &[String] {
        self.distinct
            .get(&field)
            .map(|values| values.as_slice())
            .unwrap_or_default()
    }
}

impl Deref for RecordStore {
    type Target = [Arc<Record>];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

fn record_from_row(row: &Row, schema: &Schema, voice_order: &[String]) -> Record {
    let mut builder = Record::builder();
    let mut id = String::new();
    let mut voices = HashMap::new();

    for (i, column) in schema.columns.iter().enumerate() {
        let cell = row.get(i).unwrap_or(&Value::Null);

        match column.kind {
            ColumnKind::Id => id = cell_text(cell),
            ColumnKind::Status => builder = builder.status(cell_status(cell)),
            ColumnKind::Score => builder = builder.score(cell_text(cell)),
            ColumnKind::Voice => {
                voices.insert(column.name.as_str(), cell_text(cell));
            }
            ColumnKind::Ignore => (),
            kind => {
                if let Some(field) = kind.text_field() {
                    builder = builder.text(field, cell_text(cell));
                }
            }
        }
    }

    for key in voice_order {
        let link = voices.remove(key.as_str()).unwrap_or_default();
        builder = builder.voice(key.as_str(), link);
    }

    let record = builder.build();

    if id.is_empty() {
        id = derive_id(&record, schema);
    }

    record.with_id(id)
}

// Joins the configured fields. Separators inside values are escaped, so rows
// differing in any joined field get different ids.
pub fn derive_id(record: &Record, schema: &Schema) -> String {
    let sep = &schema.id_separator;

    schema
        .id_fields
        .iter()
        .map(|field| {
            record
                .text(*field)
                .replace('\\', "\\\\")
                .replace(sep.as_str(), &format!("\\{sep}"))
        })
        .collect::<Vec<_>>()
        .join(sep)
}

fn distinct_values(records: &[Arc<Record>], field: TextField) -> Vec<String> {
    let mut seen = HashSet::new();

    records
        .iter()
        .map(|record| record.text(field))
        .filter(|value| !value.trim().is_empty())
        .filter(|value| seen.insert(*value))
        .map(String::from)
        .collect()
}

// The text of a cell. Integral numbers print without a fraction.
pub fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

pub fn cell_status(cell: &Value) -> i64 {
    match cell {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or_default()
        }
        Value::Bool(b) => i64::from(*b),
        Value::Null | Value::Array(_) | Value::Object(_) => 0,
    }
}
