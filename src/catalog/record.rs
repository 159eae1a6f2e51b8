use std::{fmt, str::FromStr};

use {anyhow::bail, serde::Deserialize};

use crate::RepertoireError;

// The text attributes of a record. Each one can be searched, sorted on and
// used as an equality filter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Title,
    Author,
    Arranger,
    Genre,
    Event,
}

impl TextField {
    pub const ALL: [TextField; 5] = [
        TextField::Title,
        TextField::Author,
        TextField::Arranger,
        TextField::Genre,
        TextField::Event,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TextField::Title => "title",
            TextField::Author => "author",
            TextField::Arranger => "arranger",
            TextField::Genre => "genre",
            TextField::Event => "event",
        }
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextField {
    type Err = RepertoireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(TextField::Title),
            "author" => Ok(TextField::Author),
            "arranger" => Ok(TextField::Arranger),
            "genre" => Ok(TextField::Genre),
            "event" => Ok(TextField::Event),
            other => bail!(
                "unknown field '{other}', expected one of: title, author, arranger, genre, event"
            ),
        }
    }
}

// A link to one voice recording of a record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoiceLink {
    pub key: String,
    pub link: String,
}

// One repertoire entry. Records are immutable once loaded, so availability
// is always derived from the stored links.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Record {
    id: String,
    title: String,
    author: String,
    arranger: String,
    genre: String,
    event: String,
    status: i64,
    score_link: String,
    // Ordered by voice priority.
    voices: Vec<VoiceLink>,
}

impl Record {
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    pub(crate) fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn arranger(&self) -> &str {
        &self.arranger
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn status(&self) -> i64 {
        self.status
    }

    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Title => &self.title,
            TextField::Author => &self.author,
            TextField::Arranger => &self.arranger,
            TextField::Genre => &self.genre,
            TextField::Event => &self.event,
        }
    }

    pub fn score_link(&self) -> &str {
        &self.score_link
    }

    pub fn has_score(&self) -> bool {
        !self.score_link.is_empty()
    }

    // All voice links in priority order, including the empty ones.
    pub fn voices(&self) -> &[VoiceLink] {
        &self.voices
    }

    pub fn voice_link(&self, key: &str) -> Option<&str> {
        self.voices
            .iter()
            .find(|voice| voice.key == key)
            .map(|voice| voice.link.as_str())
            .filter(|link| !link.is_empty())
    }

    pub fn has_voice(&self, key: &str) -> bool {
        self.voice_link(key).is_some()
    }

    // Keys of the voices with a recording, in priority order.
    pub fn available_voices(&self) -> Vec<&str> {
        self.voices
            .iter()
            .filter(|voice| !voice.link.is_empty())
            .map(|voice| voice.key.as_str())
            .collect()
    }

    pub fn has_audio(&self) -> bool {
        self.voices.iter().any(|voice| !voice.link.is_empty())
    }
}

#[derive(Debug, Default)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.record.id = id.into();
        self
    }

    pub fn text(mut self, field: TextField, value: impl Into<String>) -> Self {
        let value = value.into();
        match field {
            TextField::Title => self.record.title = value,
            TextField::Author => self.record.author = value,
            TextField::Arranger => self.record.arranger = value,
            TextField::Genre => self.record.genre = value,
            TextField::Event => self.record.event = value,
        }
        self
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.text(TextField::Title, title)
    }

    pub fn author(self, author: impl Into<String>) -> Self {
        self.text(TextField::Author, author)
    }

    pub fn event(self, event: impl Into<String>) -> Self {
        self.text(TextField::Event, event)
    }

    pub fn status(mut self, status: i64) -> Self {
        self.record.status = status;
        self
    }

    pub fn score(mut self, link: impl Into<String>) -> Self {
        self.record.score_link = link.into();
        self
    }

    // Voices are kept in the order they are added.
    pub fn voice(mut self, key: impl Into<String>, link: impl Into<String>) -> Self {
        let key = key.into();
        let link = link.into();

        match self.record.voices.iter_mut().find(|voice| voice.key == key) {
            Some(voice) => voice.link = link,
            None => self.record.voices.push(VoiceLink { key, link }),
        }
        self
    }

    pub fn build(self) -> Record {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_follows_links() {
        let record = Record::builder()
            .title("Requiem")
            .score("")
            .voice("soprano", "")
            .voice("tenor", "https://example.org/t")
            .voice("demo", "https://example.org/d")
            .build();

        assert!(!record.has_score());
        assert!(record.has_audio());
        assert!(!record.has_voice("soprano"));
        assert!(!record.has_voice("bass"), "unknown voices are unavailable");
        assert_eq!(record.available_voices(), vec!["tenor", "demo"]);
        assert_eq!(record.voice_link("tenor"), Some("https://example.org/t"));
    }

    #[test]
    fn test_record_without_links_has_no_resources() {
        let record = Record::builder().title("Gloria").build();

        assert!(!record.has_score());
        assert!(!record.has_audio());
        assert!(record.available_voices().is_empty());
    }

    #[test]
    fn test_text_field_parsing() {
        assert_eq!("Author".parse::<TextField>().unwrap(), TextField::Author);
        assert_eq!(" event ".parse::<TextField>().unwrap(), TextField::Event);
        assert!("status".parse::<TextField>().is_err());
    }
}
