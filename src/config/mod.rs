pub mod args;
pub mod file;
pub mod schema;

pub use self::{
    args::Args,
    file::{expand_home, FileConfig},
    schema::{ActivePredicate, Column, ColumnKind, Schema, StatusOp},
};

use std::{path::PathBuf, time::Duration};

use anyhow::bail;

use crate::{
    query::{DEFAULT_BATCH_SIZE, DEFAULT_LOCALE},
    selector::{DirectLinks, LinkMode, UrlBuilder, UrlTemplates},
    source::{
        sheet::{DEFAULT_SHEET_NAME, DEFAULT_TIMEOUT},
        DataSource, FileSource, SheetSource,
    },
    RepertoireError,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Where the catalog comes from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SourceConfig {
    File(PathBuf),
    Sheet {
        sheet_id: String,
        sheet_name: String,
        timeout: Duration,
    },
}

impl SourceConfig {
    pub fn data_source(&self) -> Box<dyn DataSource + Send> {
        match self {
            Self::File(path) => Box::new(FileSource::new(path)),
            Self::Sheet {
                sheet_id,
                sheet_name,
                timeout,
            } => Box::new(SheetSource {
                sheet_id: sheet_id.clone(),
                sheet_name: sheet_name.clone(),
                timeout: *timeout,
            }),
        }
    }
}

// Program-wide configuration. Derived from merging default values with
// the config file and the command line args, in that order.
#[derive(Debug)]
pub struct Config {
    pub source: SourceConfig,
    pub schema: Schema,
    pub locale: String,
    pub batch_size: usize,
    pub link_mode: LinkMode,
    pub urls: UrlTemplates,
}

impl Config {
    pub fn merge(file_config: FileConfig, args: &Args) -> Result<Self, RepertoireError> {
        let source = Self::parse_source(&file_config, args)?;

        let schema = file_config.schema.unwrap_or_default();
        schema.validate()?;

        let locale = args
            .locale
            .clone()
            .or(file_config.locale)
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        let batch_size = args
            .batch_size
            .or(file_config.batch_size)
            .unwrap_or(DEFAULT_BATCH_SIZE);

        if batch_size == 0 {
            bail!("batch size must be at least 1");
        }

        let link_mode = if args.direct_links {
            LinkMode::Direct
        } else {
            file_config.link_mode.unwrap_or_default()
        };

        Ok(Self {
            source,
            schema,
            locale,
            batch_size,
            link_mode,
            urls: file_config.urls.unwrap_or_default(),
        })
    }

    fn parse_source(file_config: &FileConfig, args: &Args) -> Result<SourceConfig, RepertoireError> {
        let sheet = |sheet_id: &String| SourceConfig::Sheet {
            sheet_id: sheet_id.clone(),
            sheet_name: args
                .sheet_name
                .clone()
                .or_else(|| file_config.sheet_name.clone())
                .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
            timeout: file_config
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        };

        if let Some(path) = &args.file {
            return Ok(SourceConfig::File(expand_home(path)));
        }

        if let Some(sheet_id) = &args.sheet {
            return Ok(sheet(sheet_id));
        }

        if let Some(path) = file_config.expanded_file() {
            return Ok(SourceConfig::File(path));
        }

        match &file_config.sheet_id {
            Some(sheet_id) => Ok(sheet(sheet_id)),
            None => bail!("no data source configured, use '--file' or '--sheet'"),
        }
    }

    pub fn url_builder(&self) -> Box<dyn UrlBuilder> {
        match self.link_mode {
            LinkMode::Templates => Box::new(self.urls.clone()),
            LinkMode::Direct => Box::new(DirectLinks),
        }
    }
}
