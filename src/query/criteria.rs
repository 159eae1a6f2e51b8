use std::{collections::BTreeMap, fmt, str::FromStr};

use anyhow::bail;

use crate::{catalog::TextField, RepertoireError};

// The active filters. Recomputed from user input and never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Criteria {
    // Free text matched fuzzily against the searchable fields.
    pub search: String,
    // Restrict to records whose status marks them as active.
    pub active_only: bool,
    // Exact-match constraints, at most one per field.
    selectors: BTreeMap<TextField, String>,
}

impl Criteria {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_active_only(mut self, active_only: bool) -> Self {
        self.active_only = active_only;
        self
    }

    pub fn with_selector(mut self, field: TextField, value: impl Into<String>) -> Self {
        self.set_selector(field, Some(value.into()));
        self
    }

    // An empty value, like `None`, removes the constraint.
    pub fn set_selector(&mut self, field: TextField, value: Option<String>) {
        match value.filter(|v| !v.is_empty()) {
            Some(value) => {
                self.selectors.insert(field, value);
            }
            None => {
                self.selectors.remove(&field);
            }
        }
    }

    pub fn selector(&self, field: TextField) -> Option<&str> {
        self.selectors.get(&field).map(String::as_str)
    }

    pub fn selectors(&self) -> impl Iterator<Item = (TextField, &str)> {
        self.selectors.iter().map(|(field, value)| (*field, value.as_str()))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("asc"),
            SortDirection::Descending => f.write_str("desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = RepertoireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => bail!("unknown sort direction '{other}', expected 'asc' or 'desc'"),
        }
    }
}

// The active sort column and direction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SortState {
    pub key: TextField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: TextField::Title,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortState {
    pub fn new(key: TextField, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    // Choosing the active key flips the direction, any other key becomes
    // active in ascending order.
    pub fn select(&mut self, key: TextField) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }
}
