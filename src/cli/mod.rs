pub mod logger;
pub mod repl;
pub mod table;

pub use self::{logger::Logger, repl::Repl, table::Table};

use std::io::{self, IsTerminal};

use {anyhow::Context, tracing::warn};

use crate::{
    catalog::TextField,
    config::{Args, Config, FileConfig, SourceConfig},
    prefs::{DisplayPrefs, FilePreferences, PreferenceStore},
    query::{SortDirection, SortState},
    selector::{Action, ResourceClass, UrlBuilder},
    session::Session,
    source::{fetch_in_background, Row},
    RepertoireError,
};

// What a single run of the binary does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Browse,
    Interactive,
    List(TextField),
    Retrieve {
        class: ResourceClass,
        id: String,
        voice: Option<String>,
        action: Action,
    },
    Prefs,
}

impl Command {
    pub fn from_args(args: &Args) -> Self {
        if args.changes_prefs() || args.print_prefs {
            Self::Prefs
        } else if args.interactive {
            Self::Interactive
        } else if let Some(field) = args.list {
            Self::List(field)
        } else if let Some(id) = &args.score {
            Self::Retrieve {
                class: ResourceClass::Score,
                id: id.clone(),
                voice: None,
                action: args.action,
            }
        } else if let Some(id) = &args.audio {
            Self::Retrieve {
                class: ResourceClass::Audio,
                id: id.clone(),
                voice: args.voice.clone(),
                action: args.action,
            }
        } else {
            Self::Browse
        }
    }
}

pub fn run() -> Result<(), RepertoireError> {
    let args = Args::parse_args()?;

    if args.no_color || !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let command = Command::from_args(&args);

    if command == Command::Prefs {
        let mut store = open_prefs()?;
        let mut prefs = DisplayPrefs::load(&store);
        return update_prefs(&args, &mut prefs, &mut store);
    }

    // Unreadable preferences only cost the theme when browsing.
    let prefs = match open_prefs() {
        Ok(store) => DisplayPrefs::load(&store),
        Err(err) => {
            warn!("ignoring preferences: {err:#}");
            DisplayPrefs::default()
        }
    };

    let file_config = FileConfig::resolve(args.config.as_deref())?;
    let config = Config::merge(file_config, &args)?;
    let urls = config.url_builder();
    let table = Table::new(prefs.theme);

    let mut session = Session::new(config.schema, &config.locale, config.batch_size)?;
    apply_args(&mut session, &args);
    let events = session.subscribe();

    let rows = load_rows(&config.source)?;
    session.load(&rows);

    match command {
        Command::Interactive => {
            let stdin = io::stdin();
            let mut repl = Repl::new(session, events, urls.as_ref(), table, io::stdout());
            repl.run(stdin.lock())
        }
        Command::List(field) => {
            print!("{}", table.render_values(session.distinct_values(field)));
            Ok(())
        }
        Command::Retrieve {
            class,
            id,
            voice,
            action,
        } => retrieve(&mut session, class, &id, voice.as_deref(), action, urls.as_ref()),
        Command::Browse => {
            browse(&mut session, &args, &table);
            Ok(())
        }
        Command::Prefs => Ok(()),
    }
}

fn open_prefs() -> Result<FilePreferences, RepertoireError> {
    FilePreferences::open(FilePreferences::default_path()?)
}

fn apply_args(session: &mut Session, args: &Args) {
    if let Some(search) = &args.search {
        session.set_search(search);
    }

    if args.active {
        session.set_active_only(true);
    }

    for (field, value) in args.selectors() {
        session.set_selector(field, Some(value.clone()));
    }

    if args.sort.is_some() || args.descending {
        let key = args.sort.unwrap_or(session.sort().key);
        let direction = match args.descending {
            true => SortDirection::Descending,
            false => SortDirection::Ascending,
        };
        session.set_sort(SortState::new(key, direction));
    }
}

// Runs the fetch off the main thread while a spinner is shown.
fn load_rows(source: &SourceConfig) -> Result<Vec<Row>, RepertoireError> {
    let data_source = source.data_source();
    let mut logger = Logger::start(format!("loading {}", data_source.describe()));

    let result = fetch_in_background(data_source)
        .recv()
        .context("the loading thread stopped unexpectedly")?;

    logger.stop(result.is_ok());
    result
}

fn browse(session: &mut Session, args: &Args, table: &Table) {
    if session.view().is_empty() {
        println!("{} no pieces match", table.prefix());
        return;
    }

    if args.all {
        while !session.reveal_more().is_empty() {}
    } else {
        for _ in 1..args.pages {
            session.reveal_more();
        }
    }

    print!("{}", table.render(session.revealed()));
    println!(
        "{}",
        table.footer(session.revealed().len(), session.view().len())
    );
}

fn retrieve(
    session: &mut Session,
    class: ResourceClass,
    id: &str,
    voice: Option<&str>,
    action: Action,
    urls: &dyn UrlBuilder,
) -> Result<(), RepertoireError> {
    match class {
        ResourceClass::Score => session.open_score(id)?,
        ResourceClass::Audio => {
            session.open_audio(id)?;
            if let Some(voice) = voice {
                session.choose_voice(voice)?;
            }
        }
    }

    let dispatch = session.dispatch(action, urls)?;
    println!("{}", dispatch.url);

    Ok(())
}

fn update_prefs(
    args: &Args,
    prefs: &mut DisplayPrefs,
    store: &mut dyn PreferenceStore,
) -> Result<(), RepertoireError> {
    if let Some(theme) = args.set_theme {
        prefs.set_theme(store, theme)?;
    }

    if args.toggle_theme {
        prefs.toggle_theme(store)?;
    }

    if let Some(delta) = args.font_step {
        prefs.step_font_size(store, delta)?;
    }

    let font_size = prefs
        .font_size
        .map(|size| size.to_string())
        .unwrap_or_else(|| "default".to_string());

    println!("theme: {}", prefs.theme);
    println!("font size: {}", font_size);

    Ok(())
}
