use std::path::PathBuf;

use {anyhow::bail, clap::Parser};

use crate::{catalog::TextField, prefs::Theme, selector::Action, RepertoireError};

// A struct that represents the command line arguments.
#[derive(Debug, Parser)]
#[command(
    about = "Search the choir's repertoire and fetch its sheet music and recordings",
    version = crate::config::VERSION,
)]
pub struct Args {
    /// Load the catalog from a local JSON file
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Load the catalog from the published spreadsheet with this id
    #[arg(long = "sheet")]
    pub sheet: Option<String>,

    /// The spreadsheet tab to read
    #[arg(long = "sheet-name")]
    pub sheet_name: Option<String>,

    /// Use this config file instead of searching for `repertoire.yml`
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Fuzzy search on the searchable fields
    #[arg(short = 'q', long = "search")]
    pub search: Option<String>,

    /// Only show the pieces currently sung
    #[arg(short = 'a', long = "active")]
    pub active: bool,

    /// Only show pieces with exactly this title
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Only show pieces by exactly this author
    #[arg(long = "author")]
    pub author: Option<String>,

    /// Only show pieces with exactly this arranger
    #[arg(long = "arranger")]
    pub arranger: Option<String>,

    /// Only show pieces of exactly this genre
    #[arg(long = "genre")]
    pub genre: Option<String>,

    /// Only show pieces for exactly this event
    #[arg(long = "event")]
    pub event: Option<String>,

    /// Sort on this field: title, author, arranger, genre or event
    #[arg(short = 's', long = "sort")]
    pub sort: Option<TextField>,

    /// Sort in descending order
    #[arg(short = 'd', long = "desc")]
    pub descending: bool,

    /// The number of batches to print
    #[arg(short = 'n', long = "pages", default_value_t = 1)]
    pub pages: usize,

    /// Print every matching piece
    #[arg(long = "all")]
    pub all: bool,

    /// The number of pieces per batch
    #[arg(long = "batch-size")]
    pub batch_size: Option<usize>,

    /// The locale used for sorting
    #[arg(long = "locale")]
    pub locale: Option<String>,

    /// Print the distinct values of a field
    #[arg(long = "list", value_name = "FIELD")]
    pub list: Option<TextField>,

    /// Print the sheet music URL of the piece with this id
    #[arg(long = "score", value_name = "ID")]
    pub score: Option<String>,

    /// Print a recording URL of the piece with this id
    #[arg(long = "audio", value_name = "ID")]
    pub audio: Option<String>,

    /// The voice to fetch with '--audio'. Defaults to the first available
    #[arg(long = "voice")]
    pub voice: Option<String>,

    /// What to do with the resource: retrieve or preview
    #[arg(long = "action", default_value = "preview")]
    pub action: Action,

    /// Use the links stored in the catalog instead of the URL templates
    #[arg(long = "direct-links")]
    pub direct_links: bool,

    /// Browse the catalog with an interactive prompt
    #[arg(short = 'i', long = "interactive")]
    pub interactive: bool,

    /// Save the color theme: light or dark
    #[arg(long = "set-theme")]
    pub set_theme: Option<Theme>,

    /// Switch between the light and dark theme
    #[arg(long = "toggle-theme")]
    pub toggle_theme: bool,

    /// Change the saved font size by this many points
    #[arg(long = "font-step", allow_hyphen_values = true)]
    pub font_step: Option<i32>,

    /// Print the saved display preferences
    #[arg(long = "print-prefs")]
    pub print_prefs: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Args {
    pub fn parse_args() -> Result<Self, RepertoireError> {
        let args = Self::parse();
        args.validate()?;

        Ok(args)
    }

    pub fn validate(&self) -> Result<(), RepertoireError> {
        if self.file.is_some() && self.sheet.is_some() {
            bail!("'--file' cannot be used with '--sheet'");
        }

        if self.score.is_some() && self.audio.is_some() {
            bail!("'--score' cannot be used with '--audio'");
        }

        if self.voice.is_some() && self.audio.is_none() {
            bail!("'--voice' requires '--audio'");
        }

        if self.interactive && (self.score.is_some() || self.audio.is_some()) {
            bail!("'--interactive' cannot be used with '--score' or '--audio'");
        }

        if self.interactive && self.list.is_some() {
            bail!("'--interactive' cannot be used with '--list'");
        }

        if self.set_theme.is_some() && self.toggle_theme {
            bail!("'--set-theme' cannot be used with '--toggle-theme'");
        }

        if self.pages == 0 {
            bail!("'--pages' must be at least 1");
        }

        if self.batch_size == Some(0) {
            bail!("'--batch-size' must be at least 1");
        }

        Ok(())
    }

    pub fn changes_prefs(&self) -> bool {
        self.set_theme.is_some() || self.toggle_theme || self.font_step.is_some()
    }

    pub fn selectors(&self) -> Vec<(TextField, &String)> {
        [
            (TextField::Title, &self.title),
            (TextField::Author, &self.author),
            (TextField::Arranger, &self.arranger),
            (TextField::Genre, &self.genre),
            (TextField::Event, &self.event),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_ref().map(|v| (field, v)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, RepertoireError> {
        let args = Args::try_parse_from(std::iter::once("repertoire").chain(args.iter().copied()))?;
        args.validate()?;
        Ok(args)
    }

    #[test]
    fn test_parse_filters() {
        let args = parse(&["-f", "data.json", "-q", "ave", "-a", "--event", "Easter", "-s", "author", "-d"])
            .expect("valid args");

        assert_eq!(args.search.as_deref(), Some("ave"));
        assert!(args.active);
        assert!(args.descending);
        assert_eq!(args.sort, Some(TextField::Author));
        assert_eq!(args.selectors(), vec![(TextField::Event, &"Easter".to_string())]);
    }

    #[test]
    fn test_parse_resource_request() {
        let args = parse(&["--audio", "7", "--voice", "alto", "--action", "download"])
            .expect("valid args");

        assert_eq!(args.audio.as_deref(), Some("7"));
        assert_eq!(args.action, Action::Retrieve);
    }

    #[test]
    fn test_negative_font_step() {
        let args = parse(&["--font-step", "-2"]).expect("valid args");

        assert_eq!(args.font_step, Some(-2));
        assert!(args.changes_prefs());
    }

    #[test]
    fn test_conflicting_args() {
        assert!(parse(&["--file", "a.json", "--sheet", "abc"]).is_err());
        assert!(parse(&["--score", "1", "--audio", "1"]).is_err());
        assert!(parse(&["--voice", "alto"]).is_err());
        assert!(parse(&["-i", "--list", "author"]).is_err());
        assert!(parse(&["--pages", "0"]).is_err());
        assert!(parse(&["--sort", "status"]).is_err());
    }
}
