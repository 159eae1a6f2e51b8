pub mod collation;
pub mod criteria;
pub mod revealer;

pub use self::{
    collation::{Collation, DEFAULT_LOCALE},
    criteria::{Criteria, SortDirection, SortState},
    revealer::{Revealer, DEFAULT_BATCH_SIZE},
};

use std::sync::Arc;

use tracing::debug;

use crate::{
    catalog::{Matcher, Record, TextField},
    config::{ActivePredicate, Schema},
    RepertoireError,
};

// Filters and orders records. Every evaluation starts from scratch.
#[derive(Debug)]
pub struct QueryEngine {
    collation: Collation,
    // The fields the search text is matched against.
    searchable: Vec<TextField>,
    active: ActivePredicate,
}

impl QueryEngine {
    pub fn new(schema: &Schema, locale: &str) -> Result<Self, RepertoireError> {
        Ok(Self {
            collation: Collation::new(locale)?,
            searchable: schema.searchable.clone(),
            active: schema.active,
        })
    }

    pub fn collation(&self) -> &Collation {
        &self.collation
    }

    pub fn evaluate(
        &self,
        records: &[Arc<Record>],
        criteria: &Criteria,
        sort: &SortState,
    ) -> Vec<Arc<Record>> {
        let matcher = Matcher::new(&criteria.search);

        let mut view = records
            .iter()
            .filter(|record| self.accepts(record, criteria, &matcher))
            .cloned()
            .collect::<Vec<_>>();

        self.sort(&mut view, sort);

        debug!(
            total = records.len(),
            matched = view.len(),
            sort = %sort.key,
            direction = %sort.direction,
            "evaluated query"
        );

        view
    }

    // Whether a record passes every active filter.
    pub fn accepts(&self, record: &Record, criteria: &Criteria, matcher: &Matcher) -> bool {
        if criteria.active_only && !self.active.holds(record.status()) {
            return false;
        }

        // Selectors compare raw values, unlike the search text.
        if !criteria
            .selectors()
            .all(|(field, value)| record.text(field) == value)
        {
            return false;
        }

        matcher.is_match_any(self.searchable.iter().map(|field| record.text(*field)))
    }

    // Stable, so records comparing equal keep their relative order.
    pub fn sort(&self, view: &mut [Arc<Record>], sort: &SortState) {
        view.sort_by(|a, b| {
            let ordering = self
                .collation
                .compare(a.text(sort.key), b.text(sort.key));

            match sort.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
}
