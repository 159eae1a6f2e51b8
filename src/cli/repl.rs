use std::{
    io::{BufRead, Write},
    sync::mpsc::Receiver,
};

use anyhow::{anyhow, bail};

use super::Table;
use crate::{
    catalog::TextField,
    selector::{Action, SelectorState, UrlBuilder},
    session::{Session, SessionEvent},
    RepertoireError,
};

const HELP: &str = "\
commands:
  search [TEXT]          fuzzy search, no text clears it
  active [on|off]        only pieces currently sung, toggles without argument
  filter FIELD [VALUE]   exact match on a field, no value clears it
  clear                  remove every filter
  sort FIELD             sort on a field, again to flip the direction
  more                   show the next batch
  show                   show everything revealed so far
  list FIELD             the distinct values of a field
  score ID               choose the sheet music of a piece
  audio ID               choose a recording of a piece
  voice KEY              switch the chosen recording's voice
  get                    print the download URL of the choice
  open                   print the preview URL of the choice
  back                   cancel the choice
  help                   show this help
  quit                   leave";

enum Flow {
    Continue,
    Quit,
}

// A line-oriented command loop over a `Session`. State changes are reported
// from the session's notifications rather than from the commands.
pub struct Repl<'a, W: Write> {
    session: Session,
    events: Receiver<SessionEvent>,
    urls: &'a dyn UrlBuilder,
    table: Table,
    out: W,
}

impl<'a, W: Write> Repl<'a, W> {
    pub fn new(
        session: Session,
        events: Receiver<SessionEvent>,
        urls: &'a dyn UrlBuilder,
        table: Table,
        out: W,
    ) -> Self {
        Self {
            session,
            events,
            urls,
            table,
            out,
        }
    }

    pub fn run(&mut self, input: impl BufRead) -> Result<(), RepertoireError> {
        self.drain()?;
        self.prompt()?;

        for line in input.lines() {
            let line = line?;

            match self.execute(line.trim()) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => (),
                Err(err) => writeln!(self.out, "{} {}", self.table.prefix(), err)?,
            }

            self.drain()?;
            self.prompt()?;
        }

        Ok(())
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    fn prompt(&mut self) -> Result<(), RepertoireError> {
        write!(self.out, "> ")?;
        self.out.flush()?;
        Ok(())
    }

    fn execute(&mut self, line: &str) -> Result<Flow, RepertoireError> {
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" => (),
            "search" | "s" => self.session.set_search(rest),
            "active" => {
                let active_only = match rest {
                    "" => !self.session.criteria().active_only,
                    "on" | "yes" | "true" => true,
                    "off" | "no" | "false" => false,
                    other => bail!("expected 'on' or 'off', got '{other}'"),
                };
                self.session.set_active_only(active_only);
            }
            "filter" | "f" => {
                let (field, value) = rest.split_once(' ').unwrap_or((rest, ""));
                let field: TextField = field.parse()?;
                let value = value.trim();
                self.session
                    .set_selector(field, (!value.is_empty()).then(|| value.to_string()));
            }
            "clear" => self.session.clear_filters(),
            "sort" => self.session.sort_by(rest.parse()?),
            "more" | "m" => {
                if self.session.reveal_more().is_empty() {
                    writeln!(self.out, "{} no more pieces", self.table.prefix())?;
                }
            }
            "show" => {
                let revealed = self.session.revealed();
                write!(self.out, "{}", self.table.render(revealed))?;
                self.footer()?;
            }
            "list" => {
                let field: TextField = rest.parse()?;
                let values = self.session.distinct_values(field);
                write!(self.out, "{}", self.table.render_values(values))?;
            }
            "score" => self.session.open_score(required(rest, "an id")?)?,
            "audio" => {
                self.session.open_audio(required(rest, "an id")?)?;
            }
            "voice" => self.session.choose_voice(required(rest, "a voice")?)?,
            "get" => self.dispatch(Action::Retrieve)?,
            "open" => self.dispatch(Action::Preview)?,
            "back" => self.session.close_selector(),
            "help" | "h" | "?" => writeln!(self.out, "{HELP}")?,
            "quit" | "q" | "exit" => return Ok(Flow::Quit),
            other => bail!("unknown command '{other}', try 'help'"),
        }

        Ok(Flow::Continue)
    }

    fn dispatch(&mut self, action: Action) -> Result<(), RepertoireError> {
        let dispatch = self.session.dispatch(action, self.urls)?;
        writeln!(self.out, "{}", dispatch.url)?;
        Ok(())
    }

    // Reports every notification the last command produced.
    fn drain(&mut self) -> Result<(), RepertoireError> {
        let events: Vec<SessionEvent> = self.events.try_iter().collect();

        for event in events {
            match event {
                SessionEvent::Loaded { records } => {
                    writeln!(self.out, "{} loaded {} pieces", self.table.prefix(), records)?;
                }
                SessionEvent::ViewChanged { matched } => {
                    writeln!(self.out, "{} {} pieces match", self.table.prefix(), matched)?;
                }
                SessionEvent::Revealed { start, count } => {
                    let batch = self
                        .session
                        .revealed()
                        .get(start..start + count)
                        .unwrap_or_default();
                    write!(self.out, "{}", self.table.render(batch))?;
                    self.footer()?;
                }
                SessionEvent::SelectorChanged(state) => self.describe_selector(&state)?,
            }
        }

        Ok(())
    }

    fn footer(&mut self) -> Result<(), RepertoireError> {
        let footer = self
            .table
            .footer(self.session.revealed().len(), self.session.view().len());
        writeln!(self.out, "{}", footer)?;
        Ok(())
    }

    fn describe_selector(&mut self, state: &SelectorState) -> Result<(), RepertoireError> {
        let prefix = self.table.prefix();

        match state {
            SelectorState::Closed => writeln!(self.out, "{} choice closed", prefix)?,
            SelectorState::ScoreDialog { record } => writeln!(
                self.out,
                "{} score of '{}' chosen, 'get' or 'open' it",
                prefix,
                record.title()
            )?,
            SelectorState::AudioDialog { record, voice } => writeln!(
                self.out,
                "{} '{}' recording of '{}' chosen, voices: {}",
                prefix,
                voice,
                record.title(),
                record.available_voices().join(", ")
            )?,
        }

        Ok(())
    }
}

fn required<'s>(value: &'s str, what: &str) -> Result<&'s str, RepertoireError> {
    (!value.is_empty())
        .then_some(value)
        .ok_or_else(|| anyhow!("expected {what}"))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use serde_json::json;

    use super::*;
    use crate::{config::Schema, prefs::Theme, query::DEFAULT_LOCALE, selector::UrlTemplates};

    fn run(commands: &str) -> (String, Session) {
        colored::control::set_override(false);

        let mut session = Session::new(Schema::default(), DEFAULT_LOCALE, 2).expect("session");
        let events = session.subscribe();
        session.load(&[
            vec![
                json!(1),
                json!("Ave Maria"),
                json!("Bach"),
                json!("Easter"),
                json!(1),
                json!("https://example.org/ave.pdf"),
                json!(""),
                json!("https://example.org/ave-a.mp3"),
            ],
            vec![json!(2), json!("Gloria"), json!("Vivaldi"), json!("Christmas"), json!(0)],
            vec![json!(3), json!("Cantate"), json!("Bach"), json!("Easter"), json!(1)],
        ]);

        let urls = UrlTemplates::default();
        let mut out = Vec::new();
        let mut repl = Repl::new(session, events, &urls, Table::new(Theme::Light), &mut out);
        repl.run(Cursor::new(commands.to_string())).expect("repl runs");
        let session = repl.into_session();

        (String::from_utf8(out).expect("utf-8 output"), session)
    }

    #[test]
    fn test_initial_batch_is_shown() {
        let (out, session) = run("quit\n");

        assert!(out.contains("loaded 3 pieces"));
        assert!(out.contains("3 pieces match"));
        assert!(out.contains("showing 2 of 3 pieces"));
        assert_eq!(session.revealed().len(), 2);
    }

    #[test]
    fn test_filters_and_more() {
        let (out, session) = run("active on\nfilter author Bach\nmore\nmore\n");

        assert!(out.contains("2 pieces match"));
        assert!(out.contains("no more pieces"));
        assert_eq!(session.criteria().selector(TextField::Author), Some("Bach"));
        assert!(session.is_exhausted());
    }

    #[test]
    fn test_retrieve_audio() {
        let (out, session) = run("audio 1\nget\n");

        assert!(out.contains("'alto' recording of 'Ave Maria' chosen, voices: alto"));
        assert!(out.contains("https://www.drive.pl/download/audio/alto/1"));
        assert!(!session.selector().is_open(), "dispatching closes the choice");
    }

    #[test]
    fn test_errors_keep_the_loop_running() {
        let (out, session) = run("score 2\nvoice alto\nfrobnicate\nsort title\n");

        assert!(out.contains("has no sheet music"), "output was: {out}");
        assert!(out.contains("unknown command 'frobnicate'"));
        assert_eq!(session.sort().direction.to_string(), "desc");
    }
}
