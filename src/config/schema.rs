use std::collections::HashSet;

use {anyhow::bail, serde::Deserialize};

use crate::{catalog::TextField, RepertoireError};

// What a column of the data source holds.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Id,
    Title,
    Author,
    Arranger,
    Genre,
    Event,
    Status,
    // Link to the sheet music.
    Score,
    // Link to a voice recording. The column name is the voice key.
    Voice,
    Ignore,
}

impl ColumnKind {
    pub fn text_field(&self) -> Option<TextField> {
        match self {
            ColumnKind::Title => Some(TextField::Title),
            ColumnKind::Author => Some(TextField::Author),
            ColumnKind::Arranger => Some(TextField::Arranger),
            ColumnKind::Genre => Some(TextField::Genre),
            ColumnKind::Event => Some(TextField::Event),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: &str, kind: ColumnKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusOp {
    Equals,
    NotEquals,
}

// The status test used by the active-only filter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
pub struct ActivePredicate {
    pub op: StatusOp,
    pub value: i64,
}

impl ActivePredicate {
    pub fn equals(value: i64) -> Self {
        Self {
            op: StatusOp::Equals,
            value,
        }
    }

    pub fn not_equals(value: i64) -> Self {
        Self {
            op: StatusOp::NotEquals,
            value,
        }
    }

    pub fn holds(&self, status: i64) -> bool {
        match self.op {
            StatusOp::Equals => status == self.value,
            StatusOp::NotEquals => status != self.value,
        }
    }
}

impl Default for ActivePredicate {
    fn default() -> Self {
        Self::not_equals(0)
    }
}

// The positional layout of the data source rows and the per-deployment
// choices made on top of it.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub columns: Vec<Column>,
    // The fields the search text is matched against.
    pub searchable: Vec<TextField>,
    // Voice keys in canonical priority order.
    pub voices: Vec<String>,
    pub active: ActivePredicate,
    // The fields joined into an id when the source supplies none.
    pub id_fields: Vec<TextField>,
    pub id_separator: String,
}

impl Default for Schema {
    fn default() -> Self {
        use ColumnKind::*;

        Self {
            columns: vec![
                Column::new("id", Id),
                Column::new("title", Title),
                Column::new("author", Author),
                Column::new("event", Event),
                Column::new("status", Status),
                Column::new("score", Score),
                Column::new("soprano", Voice),
                Column::new("alto", Voice),
                Column::new("tenor", Voice),
                Column::new("bass", Voice),
            ],
            searchable: vec![TextField::Title, TextField::Author, TextField::Event],
            voices: [
                "soprano", "soprano2", "alto", "alto2", "tenor", "baritone", "bass", "demo",
            ]
            .iter()
            .map(|v| v.to_string())
            .collect(),
            active: ActivePredicate::default(),
            id_fields: vec![
                TextField::Title,
                TextField::Author,
                TextField::Arranger,
                TextField::Event,
            ],
            id_separator: "|".to_string(),
        }
    }
}

impl Schema {
    pub fn validate(&self) -> Result<(), RepertoireError> {
        if self.columns.is_empty() {
            bail!("schema has no columns");
        }

        let mut singles = HashSet::new();
        let mut voices = HashSet::new();

        for column in &self.columns {
            match column.kind {
                ColumnKind::Ignore => (),
                ColumnKind::Voice => {
                    if column.name.trim().is_empty() {
                        bail!("voice columns need a name");
                    }
                    if !voices.insert(column.name.as_str()) {
                        bail!("voice column '{}' is declared twice", column.name);
                    }
                }
                kind => {
                    if !singles.insert(kind) {
                        bail!("column kind {:?} is declared more than once", kind);
                    }
                }
            }
        }

        if self.id_separator.is_empty() || self.id_separator.contains('\\') {
            bail!("id separator must be non-empty and free of backslashes");
        }

        if self.searchable.is_empty() {
            bail!("schema needs at least one searchable field");
        }

        Ok(())
    }

    // The text fields that some column provides.
    pub fn text_fields(&self) -> Vec<TextField> {
        TextField::ALL
            .into_iter()
            .filter(|field| {
                self.columns
                    .iter()
                    .any(|column| column.kind.text_field() == Some(*field))
            })
            .collect()
    }

    // The voice keys of the voice columns, ordered by priority. Columns missing
    // from the priority list follow in column order.
    pub fn voice_order(&self) -> Vec<String> {
        let columns = self
            .columns
            .iter()
            .filter(|column| column.kind == ColumnKind::Voice)
            .map(|column| column.name.clone())
            .collect::<Vec<_>>();

        let mut order = self
            .voices
            .iter()
            .filter(|key| columns.contains(key))
            .cloned()
            .collect::<Vec<_>>();

        for key in columns {
            if !order.contains(&key) {
                order.push(key);
            }
        }

        order
    }
}
