pub mod urls;

pub use self::urls::{DirectLinks, LinkMode, ResourceRequest, UrlBuilder, UrlTemplates};

use std::{fmt, str::FromStr, sync::Arc};

use {
    anyhow::bail,
    thiserror::Error,
    tracing::{debug, info, warn},
};

use crate::{catalog::Record, RepertoireError};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ResourceClass {
    // Sheet music.
    Score,
    // A per-voice recording.
    Audio,
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceClass::Score => f.write_str("score"),
            ResourceClass::Audio => f.write_str("audio"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Action {
    // Download the resource.
    Retrieve,
    // Open the resource for viewing or listening.
    Preview,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Retrieve => f.write_str("retrieve"),
            Action::Preview => f.write_str("preview"),
        }
    }
}

impl FromStr for Action {
    type Err = RepertoireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retrieve" | "download" | "get" => Ok(Action::Retrieve),
            "preview" | "open" | "play" => Ok(Action::Preview),
            other => bail!("unknown action '{other}', expected 'retrieve' or 'preview'"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("'{0}' has no sheet music")]
    NoScore(String),

    #[error("'{0}' has no audio recordings")]
    NoVoices(String),

    #[error("voice '{voice}' is not available for '{id}'")]
    VoiceUnavailable { id: String, voice: String },

    #[error("no audio dialog is open")]
    NotInAudioDialog,

    #[error("no dialog is open")]
    Closed,

    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("no record with id '{0}'")]
    UnknownRecord(String),
}

// Which resource a retrieval dialog currently targets.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SelectorState {
    #[default]
    Closed,
    ScoreDialog {
        record: Arc<Record>,
    },
    AudioDialog {
        record: Arc<Record>,
        voice: String,
    },
}

impl SelectorState {
    pub fn is_open(&self) -> bool {
        !matches!(self, SelectorState::Closed)
    }

    pub fn record(&self) -> Option<&Arc<Record>> {
        match self {
            SelectorState::Closed => None,
            SelectorState::ScoreDialog { record } | SelectorState::AudioDialog { record, .. } => {
                Some(record)
            }
        }
    }

    pub fn class(&self) -> Option<ResourceClass> {
        match self {
            SelectorState::Closed => None,
            SelectorState::ScoreDialog { .. } => Some(ResourceClass::Score),
            SelectorState::AudioDialog { .. } => Some(ResourceClass::Audio),
        }
    }

    pub fn voice(&self) -> Option<&str> {
        match self {
            SelectorState::AudioDialog { voice, .. } => Some(voice),
            _ => None,
        }
    }
}

// The outcome of a dispatched action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dispatch {
    pub action: Action,
    pub class: ResourceClass,
    pub record_id: String,
    pub voice: Option<String>,
    pub url: String,
}

// The state machine behind the retrieval dialog:
// `Closed -> ScoreDialog | AudioDialog -> Closed`.
#[derive(Debug, Default)]
pub struct ResourceSelector {
    state: SelectorState,
}

impl ResourceSelector {
    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn open(
        &mut self,
        record: Arc<Record>,
        class: ResourceClass,
    ) -> Result<(), SelectorError> {
        match class {
            ResourceClass::Score => self.open_score(record),
            ResourceClass::Audio => self.open_audio(record).map(|_| ()),
        }
    }

    // Fails, leaving the state untouched, when the record has no score.
    pub fn open_score(&mut self, record: Arc<Record>) -> Result<(), SelectorError> {
        if !record.has_score() {
            return Err(SelectorError::NoScore(record.id().to_string()));
        }

        debug!(id = record.id(), "opening score dialog");
        self.state = SelectorState::ScoreDialog { record };

        Ok(())
    }

    // Opens on the first available voice in priority order and returns it.
    // Fails, leaving the state untouched, when no voice is available.
    pub fn open_audio(&mut self, record: Arc<Record>) -> Result<&str, SelectorError> {
        let voice = match record.available_voices().first() {
            Some(voice) => voice.to_string(),
            None => return Err(SelectorError::NoVoices(record.id().to_string())),
        };

        debug!(id = record.id(), %voice, "opening audio dialog");
        self.state = SelectorState::AudioDialog { record, voice };

        Ok(self.state.voice().unwrap_or_default())
    }

    // The voices the open audio dialog may switch between.
    pub fn available_voices(&self) -> Vec<&str> {
        match &self.state {
            SelectorState::AudioDialog { record, .. } => record.available_voices(),
            _ => Vec::new(),
        }
    }

    pub fn choose_voice(&mut self, key: &str) -> Result<(), SelectorError> {
        match &mut self.state {
            SelectorState::AudioDialog { record, voice } => {
                if !record.has_voice(key) {
                    return Err(SelectorError::VoiceUnavailable {
                        id: record.id().to_string(),
                        voice: key.to_string(),
                    });
                }
                *voice = key.to_string();
                Ok(())
            }
            _ => Err(SelectorError::NotInAudioDialog),
        }
    }

    // Builds the URL for the open dialog's resource. The dialog closes
    // whether or not a URL could be built.
    pub fn dispatch(
        &mut self,
        action: Action,
        urls: &dyn UrlBuilder,
    ) -> Result<Dispatch, SelectorError> {
        let state = std::mem::take(&mut self.state);

        let (record, class, voice) = match &state {
            SelectorState::Closed => return Err(SelectorError::Closed),
            SelectorState::ScoreDialog { record } => (record, ResourceClass::Score, None),
            SelectorState::AudioDialog { record, voice } => {
                (record, ResourceClass::Audio, Some(voice.as_str()))
            }
        };

        let link = match voice {
            Some(voice) => record.voice_link(voice).unwrap_or_default(),
            None => record.score_link(),
        };

        let request = ResourceRequest {
            class,
            voice,
            record_id: record.id(),
            link,
            action,
        };

        let url = (!link.is_empty())
            .then(|| urls.build_url(&request))
            .flatten()
            .filter(|url| !url.is_empty());

        let Some(url) = url else {
            let what = match voice {
                Some(voice) => format!("{class} '{voice}' of '{}'", record.id()),
                None => format!("{class} of '{}'", record.id()),
            };
            warn!(id = record.id(), %class, "no resolvable link");
            return Err(SelectorError::ResourceUnavailable(what));
        };

        info!(id = record.id(), %class, %action, %url, "dispatching");

        Ok(Dispatch {
            action,
            class,
            record_id: record.id().to_string(),
            voice: voice.map(String::from),
            url,
        })
    }

    // Cancels the dialog without dispatching.
    pub fn close(&mut self) {
        self.state = SelectorState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(voices: &[(&str, &str)], score: &str) -> Arc<Record> {
        let mut builder = Record::builder().id("42").title("Requiem").score(score);
        for key in ["soprano", "soprano2", "alto", "alto2", "tenor", "baritone", "bass", "demo"] {
            let link = voices
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, link)| *link)
                .unwrap_or_default();
            builder = builder.voice(key, link);
        }
        Arc::new(builder.build())
    }

    #[test]
    fn test_default_voice_follows_priority() {
        let mut selector = ResourceSelector::default();

        let voice = selector
            .open_audio(record(&[("demo", "d"), ("tenor", "t")], ""))
            .expect("audio dialog");
        assert_eq!(voice, "tenor");

        let voice = selector
            .open_audio(record(&[("demo", "d")], ""))
            .expect("audio dialog");
        assert_eq!(voice, "demo");
    }

    #[test]
    fn test_no_dialog_without_resources() {
        let mut selector = ResourceSelector::default();
        let bare = record(&[], "");

        assert_eq!(
            selector.open_audio(bare.clone()),
            Err(SelectorError::NoVoices("42".into()))
        );
        assert_eq!(
            selector.open_score(bare),
            Err(SelectorError::NoScore("42".into()))
        );
        assert_eq!(selector.state(), &SelectorState::Closed);
    }

    #[test]
    fn test_choose_voice() {
        let mut selector = ResourceSelector::default();
        selector
            .open(record(&[("alto", "a"), ("bass", "b")], ""), ResourceClass::Audio)
            .expect("audio dialog");

        assert_eq!(selector.available_voices(), vec!["alto", "bass"]);

        selector.choose_voice("bass").expect("bass is available");
        assert_eq!(selector.state().voice(), Some("bass"));

        assert!(matches!(
            selector.choose_voice("tenor"),
            Err(SelectorError::VoiceUnavailable { .. })
        ));
        assert_eq!(selector.state().voice(), Some("bass"));
    }

    #[test]
    fn test_choose_voice_requires_audio_dialog() {
        let mut selector = ResourceSelector::default();
        assert_eq!(selector.choose_voice("alto"), Err(SelectorError::NotInAudioDialog));

        selector.open_score(record(&[], "s")).expect("score dialog");
        assert_eq!(selector.choose_voice("alto"), Err(SelectorError::NotInAudioDialog));
    }

    #[test]
    fn test_dispatch_closes_dialog() {
        let mut selector = ResourceSelector::default();
        selector.open_score(record(&[], "s")).expect("score dialog");

        let dispatch = selector
            .dispatch(Action::Retrieve, &UrlTemplates::default())
            .expect("dispatch");

        assert_eq!(dispatch.url, "https://www.drive.pl/download/nuty/42");
        assert_eq!(dispatch.class, ResourceClass::Score);
        assert_eq!(selector.state(), &SelectorState::Closed);
    }

    #[test]
    fn test_dispatch_audio_uses_chosen_voice() {
        let mut selector = ResourceSelector::default();
        selector
            .open_audio(record(&[("soprano", "s"), ("alto", "a")], ""))
            .expect("audio dialog");
        selector.choose_voice("alto").expect("alto is available");

        let dispatch = selector
            .dispatch(Action::Preview, &UrlTemplates::default())
            .expect("dispatch");

        assert_eq!(dispatch.voice.as_deref(), Some("alto"));
        assert_eq!(dispatch.url, "https://www.drive.pl/play/audio/alto/42");
    }

    #[test]
    fn test_unresolvable_link_is_reported_and_closes() {
        let mut selector = ResourceSelector::default();
        selector
            .open_audio(record(&[("tenor", "https://example.org/t")], ""))
            .expect("audio dialog");
        let urls = UrlTemplates {
            audio_retrieve: String::new(),
            ..UrlTemplates::default()
        };

        assert!(matches!(
            selector.dispatch(Action::Retrieve, &urls),
            Err(SelectorError::ResourceUnavailable(_))
        ));
        assert_eq!(selector.state(), &SelectorState::Closed);
    }

    #[test]
    fn test_dispatch_direct_link() {
        let mut selector = ResourceSelector::default();
        selector
            .open_audio(record(&[("tenor", "https://example.org/t.mp3")], ""))
            .expect("audio dialog");

        let dispatch = selector
            .dispatch(Action::Retrieve, &DirectLinks)
            .expect("dispatch");

        assert_eq!(dispatch.url, "https://example.org/t.mp3");
    }

    #[test]
    fn test_dispatch_when_closed() {
        let mut selector = ResourceSelector::default();

        assert_eq!(
            selector.dispatch(Action::Preview, &DirectLinks),
            Err(SelectorError::Closed)
        );
    }

    #[test]
    fn test_cancel() {
        let mut selector = ResourceSelector::default();
        selector.open_score(record(&[], "s")).expect("score dialog");
        selector.close();

        assert!(!selector.state().is_open());
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("download".parse::<Action>().unwrap(), Action::Retrieve);
        assert_eq!("Open".parse::<Action>().unwrap(), Action::Preview);
        assert!("delete".parse::<Action>().is_err());
    }
}
