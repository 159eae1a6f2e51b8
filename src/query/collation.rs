use std::{cmp::Ordering, fmt};

use {
    anyhow::anyhow,
    icu::{
        collator::{options::CollatorOptions, Collator, CollatorBorrowed},
        locale::Locale,
    },
};

use crate::RepertoireError;

pub const DEFAULT_LOCALE: &str = "pl";

// Locale-aware string comparison for the catalog's language.
pub struct Collation {
    locale: String,
    collator: CollatorBorrowed<'static>,
}

impl Collation {
    pub fn new(tag: &str) -> Result<Self, RepertoireError> {
        let locale = tag
            .parse::<Locale>()
            .map_err(|e| anyhow!("invalid locale '{tag}': {e:?}"))?;

        let collator = Collator::try_new(locale.into(), CollatorOptions::default())
            .map_err(|e| anyhow!("no collation data for locale '{tag}': {e:?}"))?;

        Ok(Self {
            locale: tag.to_string(),
            collator,
        })
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.collator.compare(a, b)
    }
}

impl fmt::Debug for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collation")
            .field("locale", &self.locale)
            .finish()
    }
}
