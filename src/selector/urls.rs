use serde::Deserialize;

use super::{Action, ResourceClass};

// Everything the URL collaborator may need to address one resource.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResourceRequest<'a> {
    pub class: ResourceClass,
    // Set for audio only.
    pub voice: Option<&'a str>,
    pub record_id: &'a str,
    // The raw link stored on the record, never empty.
    pub link: &'a str,
    pub action: Action,
}

// Maps a resource request to an external URL. `None` means the resource
// can't be addressed.
pub trait UrlBuilder {
    fn build_url(&self, request: &ResourceRequest<'_>) -> Option<String>;
}

// URLs built from templates with `{id}` and `{voice}` placeholders.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct UrlTemplates {
    pub score_retrieve: String,
    pub score_preview: String,
    pub audio_retrieve: String,
    pub audio_preview: String,
}

impl Default for UrlTemplates {
    fn default() -> Self {
        Self {
            score_retrieve: "https://www.drive.pl/download/nuty/{id}".into(),
            score_preview: "https://www.drive.pl/play/nuty/{id}".into(),
            audio_retrieve: "https://www.drive.pl/download/audio/{voice}/{id}".into(),
            audio_preview: "https://www.drive.pl/play/audio/{voice}/{id}".into(),
        }
    }
}

impl UrlTemplates {
    fn template(&self, class: ResourceClass, action: Action) -> &str {
        match (class, action) {
            (ResourceClass::Score, Action::Retrieve) => &self.score_retrieve,
            (ResourceClass::Score, Action::Preview) => &self.score_preview,
            (ResourceClass::Audio, Action::Retrieve) => &self.audio_retrieve,
            (ResourceClass::Audio, Action::Preview) => &self.audio_preview,
        }
    }
}

impl UrlBuilder for UrlTemplates {
    fn build_url(&self, request: &ResourceRequest<'_>) -> Option<String> {
        let template = self.template(request.class, request.action);
        if template.trim().is_empty() {
            return None;
        }

        let mut url = template.replace("{id}", &urlencoding::encode(request.record_id));

        if url.contains("{voice}") {
            let voice = request.voice?;
            url = url.replace("{voice}", &urlencoding::encode(voice));
        }

        Some(url)
    }
}

// Uses the links stored on the records as they are.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DirectLinks;

impl UrlBuilder for DirectLinks {
    fn build_url(&self, request: &ResourceRequest<'_>) -> Option<String> {
        let link = request.link.trim();
        (!link.is_empty()).then(|| link.to_string())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    #[default]
    Templates,
    Direct,
}
