use std::sync::{
    mpsc::{self, Receiver, Sender},
    Arc,
};

use tracing::info;

use crate::{
    catalog::{Record, RecordStore, TextField},
    config::Schema,
    query::{Criteria, QueryEngine, Revealer, SortState},
    selector::{Action, Dispatch, ResourceSelector, SelectorError, SelectorState, UrlBuilder},
    source::Row,
    RepertoireError,
};

// Notifications sent to subscribers after each state change.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    // The dataset was replaced.
    Loaded { records: usize },
    // The filtered and sorted view was recomputed.
    ViewChanged { matched: usize },
    // More of the view was revealed, starting at `start`.
    Revealed { start: usize, count: usize },
    SelectorChanged(SelectorState),
}

// The caller-owned state of one catalog viewer: dataset, filters, sort,
// revealed rows and the retrieval dialog. Every command runs to completion
// and leaves the view consistent with the criteria.
#[derive(Debug)]
pub struct Session {
    schema: Schema,
    engine: QueryEngine,
    store: RecordStore,
    criteria: Criteria,
    sort: SortState,
    revealer: Revealer,
    selector: ResourceSelector,
    listeners: Vec<Sender<SessionEvent>>,
}

impl Session {
    pub fn new(schema: Schema, locale: &str, batch_size: usize) -> Result<Self, RepertoireError> {
        schema.validate()?;

        Ok(Self {
            engine: QueryEngine::new(&schema, locale)?,
            schema,
            store: RecordStore::default(),
            criteria: Criteria::default(),
            sort: SortState::default(),
            revealer: Revealer::new(batch_size),
            selector: ResourceSelector::default(),
            listeners: Vec::new(),
        })
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.listeners.push(tx);
        rx
    }

    // Replaces the whole dataset. Filters and sort are kept, an open dialog
    // is closed.
    pub fn load(&mut self, rows: &[Row]) {
        self.store = RecordStore::load(rows, &self.schema);
        info!(records = self.store.len(), "catalog loaded");
        self.notify(SessionEvent::Loaded {
            records: self.store.len(),
        });

        self.close_selector();
        self.refresh();
    }

    pub fn set_search(&mut self, text: &str) {
        self.criteria.search = text.to_string();
        self.refresh();
    }

    pub fn set_active_only(&mut self, active_only: bool) {
        self.criteria.active_only = active_only;
        self.refresh();
    }

    // `None` or an empty value removes the constraint on `field`.
    pub fn set_selector(&mut self, field: TextField, value: Option<String>) {
        self.criteria.set_selector(field, value);
        self.refresh();
    }

    pub fn clear_filters(&mut self) {
        self.criteria.clear();
        self.refresh();
    }

    // Same key flips the direction, a new key sorts ascending.
    pub fn sort_by(&mut self, field: TextField) {
        self.sort.select(field);
        self.refresh();
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
        self.refresh();
    }

    // Reveals the next batch and returns it. Empty once the view is exhausted.
    pub fn reveal_more(&mut self) -> &[Arc<Record>] {
        let start = self.revealer.revealed().len();
        let count = self.revealer.next_batch().len();

        if count > 0 {
            self.notify(SessionEvent::Revealed { start, count });
        }

        &self.revealer.revealed()[start..]
    }

    pub fn open_score(&mut self, id: &str) -> Result<(), SelectorError> {
        let record = self.record(id)?;
        self.selector.open_score(record)?;
        self.notify_selector();
        Ok(())
    }

    // Returns the voice selected by default.
    pub fn open_audio(&mut self, id: &str) -> Result<String, SelectorError> {
        let record = self.record(id)?;
        let voice = self.selector.open_audio(record)?.to_string();
        self.notify_selector();
        Ok(voice)
    }

    pub fn choose_voice(&mut self, key: &str) -> Result<(), SelectorError> {
        self.selector.choose_voice(key)?;
        self.notify_selector();
        Ok(())
    }

    // The dialog is closed afterwards, also on failure.
    pub fn dispatch(
        &mut self,
        action: Action,
        urls: &dyn UrlBuilder,
    ) -> Result<Dispatch, SelectorError> {
        let was_open = self.selector.state().is_open();
        let result = self.selector.dispatch(action, urls);

        if was_open {
            self.notify_selector();
        }
        result
    }

    pub fn close_selector(&mut self) {
        if self.selector.state().is_open() {
            self.selector.close();
            self.notify_selector();
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    // The full filtered and sorted view.
    pub fn view(&self) -> &[Arc<Record>] {
        self.revealer.view()
    }

    pub fn revealed(&self) -> &[Arc<Record>] {
        self.revealer.revealed()
    }

    pub fn is_exhausted(&self) -> bool {
        self.revealer.is_exhausted()
    }

    pub fn selector(&self) -> &SelectorState {
        self.selector.state()
    }

    pub fn available_voices(&self) -> Vec<&str> {
        self.selector.available_voices()
    }

    pub fn distinct_values(&self, field: TextField) -> &[String] {
        self.store.distinct_values(field)
    }

    fn record(&self, id: &str) -> Result<Arc<Record>, SelectorError> {
        self.store
            .get(id)
            .cloned()
            .ok_or_else(|| SelectorError::UnknownRecord(id.to_string()))
    }

    // Recomputes the view from scratch and reveals its first batch.
    fn refresh(&mut self) {
        let view = self
            .engine
            .evaluate(self.store.records(), &self.criteria, &self.sort);

        let matched = view.len();
        self.revealer.reset(view);
        self.notify(SessionEvent::ViewChanged { matched });

        self.reveal_more();
    }

    fn notify_selector(&mut self) {
        let state = self.selector.state().clone();
        self.notify(SessionEvent::SelectorChanged(state));
    }

    // Subscribers that hung up are dropped.
    fn notify(&mut self, event: SessionEvent) {
        self.listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::{query::DEFAULT_LOCALE, selector::UrlTemplates};

    fn rows() -> Vec<Row> {
        vec![
            vec![
                json!(1),
                json!("Ave Maria"),
                json!("Bach"),
                json!("Easter"),
                json!(1),
                json!("https://example.org/ave.pdf"),
                json!("https://example.org/ave-s.mp3"),
            ],
            vec![
                json!(2),
                json!("Gloria"),
                json!("Bach"),
                json!("Christmas"),
                json!(0),
                json!(""),
                json!(""),
            ],
            vec![
                json!(3),
                json!("Requiem"),
                json!("Mozart"),
                json!("Easter"),
                json!(1),
                Value::Null,
                json!("https://example.org/req-s.mp3"),
                json!(""),
                json!("https://example.org/req-t.mp3"),
            ],
        ]
    }

    fn session(batch_size: usize) -> Session {
        let mut session =
            Session::new(Schema::default(), DEFAULT_LOCALE, batch_size).expect("session");
        session.load(&rows());
        session
    }

    fn titles(records: &[Arc<Record>]) -> Vec<&str> {
        records.iter().map(|r| r.title()).collect()
    }

    #[test]
    fn test_inert_before_load() {
        let session = Session::new(Schema::default(), DEFAULT_LOCALE, 20).expect("session");

        assert!(session.view().is_empty());
        assert!(session.is_exhausted());
    }

    #[test]
    fn test_end_to_end_query() {
        let mut session = session(20);
        session.set_active_only(true);
        session.set_selector(TextField::Event, Some("Easter".into()));
        session.set_search("bach");

        assert_eq!(titles(session.view()), vec!["Ave Maria"]);
        assert_eq!(titles(session.revealed()), vec!["Ave Maria"]);
    }

    #[test]
    fn test_first_batch_is_revealed_eagerly() {
        let mut session = session(2);
        assert_eq!(titles(session.revealed()), vec!["Ave Maria", "Gloria"]);

        assert_eq!(titles(session.reveal_more()), vec!["Requiem"]);
        assert!(session.reveal_more().is_empty());
        assert!(session.is_exhausted());

        session.sort_by(TextField::Title);
        assert_eq!(
            titles(session.revealed()),
            vec!["Requiem", "Gloria"],
            "a new view starts over"
        );
    }

    #[test]
    fn test_reload_replaces_dataset() {
        let mut session = session(20);
        session.open_score("1").expect("score dialog");

        session.load(&rows()[..1]);

        assert_eq!(session.store().len(), 1);
        assert_eq!(titles(session.view()), vec!["Ave Maria"]);
        assert_eq!(session.selector(), &SelectorState::Closed);
    }

    #[test]
    fn test_selector_commands() {
        let mut session = session(20);

        assert_eq!(session.open_audio("3").expect("audio dialog"), "soprano");
        assert_eq!(session.available_voices(), vec!["soprano", "tenor"]);
        session.choose_voice("tenor").expect("tenor is available");

        let dispatch = session
            .dispatch(Action::Preview, &UrlTemplates::default())
            .expect("dispatch");
        assert_eq!(dispatch.url, "https://www.drive.pl/play/audio/tenor/3");
        assert!(!session.selector().is_open());

        assert_eq!(
            session.open_score("2"),
            Err(SelectorError::NoScore("2".into()))
        );
        assert_eq!(
            session.open_audio("99"),
            Err(SelectorError::UnknownRecord("99".into()))
        );
    }

    #[test]
    fn test_subscribers_are_notified() {
        let mut session = Session::new(Schema::default(), DEFAULT_LOCALE, 2).expect("session");
        let rx = session.subscribe();

        session.load(&rows());
        session.open_score("1").expect("score dialog");
        session.close_selector();

        let events = rx.try_iter().collect::<Vec<_>>();
        assert_eq!(events[0], SessionEvent::Loaded { records: 3 });
        assert_eq!(events[1], SessionEvent::ViewChanged { matched: 3 });
        assert_eq!(events[2], SessionEvent::Revealed { start: 0, count: 2 });
        assert!(matches!(
            events[3],
            SessionEvent::SelectorChanged(SelectorState::ScoreDialog { .. })
        ));
        assert_eq!(events[4], SessionEvent::SelectorChanged(SelectorState::Closed));
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn test_distinct_values_follow_reload() {
        let mut session = session(20);
        assert_eq!(session.distinct_values(TextField::Author), ["Bach", "Mozart"]);

        session.load(&rows()[2..]);
        assert_eq!(session.distinct_values(TextField::Author), ["Mozart"]);
    }
}
