use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::{
    clock::{Clock, SystemClock},
    config::Config,
    content::{self, ContactForm},
    domain::{
        event::{EventFilter, NewEvent},
        media::{BinaryStore, RecordId},
    },
    error::SiteError,
    events::EventBoard,
    gallery::Gallery,
    player::{playlist::Playlist, video::VideoList},
    session::Session,
    storage::{fs, operations::Storage},
    ui::{self, Frontend, notice::{Level, Notice}},
    upload::{Uploader, Validator},
};

#[derive(Parser)]
#[command(name = "bandsite")]
#[command(version = "0.1")]
#[command(about = "Band website content manager")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Admin username, logs in for this invocation
    #[arg(long, global = true, requires = "password")]
    pub user: Option<String>,

    #[arg(long, global = true, requires = "user")]
    pub password: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show what the site stores
    Status,
    /// Music player tracks
    Tracks {
        #[command(subcommand)]
        action: MediaAction,
    },
    /// Video section
    Videos {
        #[command(subcommand)]
        action: MediaAction,
    },
    /// Photo gallery
    Images {
        #[command(subcommand)]
        action: ImageAction,
    },
    /// Tour dates
    Events {
        #[command(subcommand)]
        action: EventAction,
    },
    /// Band bio
    Bio {
        #[command(subcommand)]
        action: BioAction,
    },
    /// Sign up for the newsletter
    Subscribe { email: String },
    /// Leave a message for the band
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
    /// Saved messages and newsletter signups (admin)
    Inbox,
}

#[derive(Subcommand)]
pub enum MediaAction {
    List,
    /// Upload files, or every matching file under a directory
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        follow_symlinks: bool,
    },
    /// Remove by list position
    Remove { index: usize },
}

#[derive(Subcommand)]
pub enum ImageAction {
    List,
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        follow_symlinks: bool,
    },
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum EventAction {
    List {
        /// upcoming, past or all
        #[arg(short, long, default_value = "upcoming")]
        filter: EventFilter,
    },
    Add {
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        venue: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        tickets: Option<String>,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum BioAction {
    Show,
    Set { content: String },
}

/// Prints notices and asks confirmations on the terminal.
pub struct ConsoleFrontend {
    pub assume_yes: bool,
}

impl Frontend for ConsoleFrontend {
    fn notify(&mut self, notice: Notice) {
        match notice.level {
            Level::Error => eprintln!("{notice}"),
            _ => println!("{notice}"),
        }
    }

    fn confirm(&mut self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{question} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Err(e) => {
                log::warn!("could not read answer: {e}");
                false
            }
        }
    }

    fn request_login(&mut self) {
        println!("Log in with --user <name> --password <password>.");
    }
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config.to_string_lossy())?;

    let mut ui = ConsoleFrontend {
        assume_yes: cli.yes,
    };
    let mut session = Session::new(cfg.admin.clone());
    if let (Some(user), Some(password)) = (&cli.user, &cli.password) {
        if !session.login(user, password) {
            ui.notify(Notice::error("Invalid credentials"));
            return Ok(ExitCode::FAILURE);
        }
    }

    let mut storage = Storage::new(&cfg.database)?;
    let mut app = App {
        storage: &mut storage,
        session: &session,
        ui: &mut ui,
        clock: &SystemClock,
        validator: Validator::new(cfg.limits),
        cfg: &cfg,
    };

    match app.dispatch(cli.command) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // already shown by the gate
        Err(SiteError::Authorization(_)) => Ok(ExitCode::FAILURE),
        Err(e) => {
            ui::report(app.ui, &e);
            Ok(ExitCode::FAILURE)
        }
    }
}

struct App<'a> {
    storage: &'a mut Storage,
    session: &'a Session,
    ui: &'a mut ConsoleFrontend,
    clock: &'a dyn Clock,
    validator: Validator,
    cfg: &'a Config,
}

impl App<'_> {
    fn dispatch(&mut self, command: Commands) -> Result<(), SiteError> {
        match command {
            Commands::Status => self.status(),
            Commands::Tracks { action } => self.tracks(action),
            Commands::Videos { action } => self.videos(action),
            Commands::Images { action } => self.images(action),
            Commands::Events { action } => self.events(action),
            Commands::Bio { action } => match action {
                BioAction::Show => {
                    match content::bio(self.storage)? {
                        Some(bio) => println!("{bio}"),
                        None => println!("No bio yet."),
                    }
                    Ok(())
                }
                BioAction::Set { content } => content::save_bio(self.storage, self.ui, &content),
            },
            Commands::Subscribe { email } => {
                content::subscribe(self.storage, self.ui, self.clock, &email).map(|_| ())
            }
            Commands::Contact {
                name,
                email,
                message,
            } => content::send_contact(
                self.storage,
                self.ui,
                self.clock,
                ContactForm {
                    name,
                    email,
                    message,
                },
            )
            .map(|_| ()),
            Commands::Inbox => {
                let (messages, subscriptions) = content::inbox(self.storage, self.session, self.ui)?;
                println!("Messages ({}):", messages.len());
                for m in &messages {
                    println!("  {} <{}> {}", m.name, m.email, m.date.format("%Y-%m-%d %H:%M"));
                    println!("    {}", m.message);
                }
                println!("Newsletter ({}):", subscriptions.len());
                for s in &subscriptions {
                    println!("  {} since {}", s.email, s.date.format("%Y-%m-%d"));
                }
                Ok(())
            }
        }
    }

    fn status(&mut self) -> Result<(), SiteError> {
        println!("Schema version {}", self.storage.schema_version()?);
        for store in BinaryStore::ALL {
            println!("  {store}: {} record(s)", self.storage.count(store)?);
        }
        println!("  events: {}", self.storage.events()?.len());
        println!(
            "  newsletter: {}",
            self.storage.newsletter_subscriptions()?.len()
        );
        match self.session.state().identity() {
            Some(who) => println!("Logged in as {who}"),
            None => println!("Not logged in"),
        }
        Ok(())
    }

    fn tracks(&mut self, action: MediaAction) -> Result<(), SiteError> {
        let mut playlist = Playlist::new(&self.cfg.player);
        playlist.load(self.storage)?;

        match action {
            MediaAction::List => {
                if playlist.is_empty() {
                    println!("No tracks yet.");
                }
                for (i, track) in playlist.tracks().iter().enumerate() {
                    println!("{i:>3}. {} - {}", track.title(), playlist.artist());
                }
            }
            MediaAction::Add {
                paths,
                follow_symlinks,
            } => {
                let files = fs::collect_candidates(&paths, follow_symlinks)?;
                Uploader::new(self.validator).tracks(
                    self.storage,
                    self.session,
                    self.ui,
                    self.clock,
                    &mut playlist,
                    files,
                )?;
            }
            MediaAction::Remove { index } => {
                ui::authorize(self.session, self.ui, "remove tracks")?;
                let Some(title) = playlist.tracks().get(index).map(|t| t.title().to_string()) else {
                    self.ui.notify(Notice::warning(format!("No track at position {index}")));
                    return Ok(());
                };
                if self.ui.confirm(&format!("Remove {title}?")) {
                    playlist.remove_track(self.storage, index)?;
                    self.ui.notify(Notice::success(format!("Removed {title}")));
                }
            }
        }
        Ok(())
    }

    fn videos(&mut self, action: MediaAction) -> Result<(), SiteError> {
        let mut videos = VideoList::new();
        videos.load(self.storage)?;

        match action {
            MediaAction::List => {
                if videos.is_empty() {
                    println!("No videos yet.");
                }
                for (i, video) in videos.videos().iter().enumerate() {
                    println!("{i:>3}. {}", video.title());
                }
            }
            MediaAction::Add {
                paths,
                follow_symlinks,
            } => {
                let files = fs::collect_candidates(&paths, follow_symlinks)?;
                Uploader::new(self.validator).videos(
                    self.storage,
                    self.session,
                    self.ui,
                    self.clock,
                    &mut videos,
                    files,
                )?;
            }
            MediaAction::Remove { index } => {
                ui::authorize(self.session, self.ui, "remove videos")?;
                let Some(title) = videos.videos().get(index).map(|v| v.title().to_string()) else {
                    self.ui.notify(Notice::warning(format!("No video at position {index}")));
                    return Ok(());
                };
                if self.ui.confirm(&format!("Remove {title}?")) {
                    videos.remove_video(self.storage, index)?;
                    self.ui.notify(Notice::success(format!("Removed {title}")));
                }
            }
        }
        Ok(())
    }

    fn images(&mut self, action: ImageAction) -> Result<(), SiteError> {
        let mut gallery = Gallery::new(self.validator);
        gallery.load(self.storage)?;

        match action {
            ImageAction::List => {
                if gallery.list().is_empty() {
                    println!("No images yet.");
                }
                for (item, image) in gallery.items(self.session).iter().zip(gallery.list()) {
                    println!(
                        "{}  {}  {}",
                        item.id,
                        image.uploaded_at.format("%Y-%m-%d"),
                        item.filename
                    );
                }
            }
            ImageAction::Upload {
                paths,
                follow_symlinks,
            } => {
                let files = fs::collect_candidates(&paths, follow_symlinks)?;
                gallery.upload(self.storage, self.session, self.ui, self.clock, files)?;
            }
            ImageAction::Delete { id } => {
                gallery.delete(self.storage, self.session, self.ui, &RecordId::Key(id))?;
            }
        }
        Ok(())
    }

    fn events(&mut self, action: EventAction) -> Result<(), SiteError> {
        let mut board = EventBoard::new();
        board.load(self.storage)?;

        match action {
            EventAction::List { filter } => {
                board.set_filter(filter);
                let cards = board.cards(self.session, self.clock.today());
                if cards.is_empty() {
                    println!("No events.");
                }
                for card in cards {
                    let e = &card.event;
                    print!("{:<14} {} - {}", card.date_label, e.venue, e.location);
                    if let Some(url) = &e.ticket_url {
                        print!("  tickets: {url}");
                    }
                    if card.can_delete {
                        print!("  [id {}]", e.id);
                    }
                    println!();
                }
            }
            EventAction::Add {
                date,
                venue,
                location,
                tickets,
            } => {
                board.create(
                    self.storage,
                    self.session,
                    self.ui,
                    self.clock,
                    NewEvent {
                        date,
                        venue,
                        location,
                        ticket_url: tickets,
                    },
                )?;
            }
            EventAction::Delete { id } => {
                board.delete(self.storage, self.session, self.ui, id)?;
            }
        }
        Ok(())
    }
}
