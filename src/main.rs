use clap::{ArgAction, Parser, Subcommand};
use iced::widget::{column, container, image, stack, text};
use iced::{keyboard, window, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod gallery;
mod media;
mod source;
mod state;
mod ui;

use config::Config;
use error::Result;
use gallery::filter::{ChannelChoice, SortMode};
use gallery::tile::{cover_for, TileCover};
use media::video::{self, VideoCommand, VideoControl, VideoEvent, VideoUpdate};
use media::{thumbnail, MediaClient};
use source::{open_source, CatalogSource, ItemSource, JsonSource};
use state::data::{Item, MediaKind};
use state::library::Library;
use state::session::GallerySession;
use ui::{MediaState, VideoScreen};

/// Media gallery with channel filters and a lightbox viewer
#[derive(Debug, Parser)]
#[command(name = "media-gallery", version, about)]
struct Cli {
    /// Path to the TOML settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON export or SQLite catalog to show (overrides the settings file)
    #[arg(short, long, value_name = "FILE")]
    source: Option<PathBuf>,

    /// Start with this channel selected instead of "All"
    #[arg(long, value_name = "NAME")]
    channel: Option<String>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import a JSON export into the SQLite catalog
    Import {
        json: PathBuf,

        /// Catalog to import into (defaults to the user data directory)
        #[arg(long, value_name = "FILE")]
        db: Option<PathBuf>,
    },
}

/// Main application state
struct Gallery {
    config: Config,
    /// Full item list, immutable until the next load
    items: Vec<Item>,
    session: GallerySession,
    media: MediaClient,
    cache_dir: PathBuf,
    /// Tile thumbnails keyed by source url
    thumbnails: HashMap<String, MediaState>,
    /// Full-size lightbox images keyed by url
    slides: HashMap<String, MediaState>,
    /// Frames of the active video slide
    video: Option<VideoScreen>,
    /// Running decoder of the active video slide
    video_control: Option<VideoControl>,
    /// Description of the source the items came from
    origin: String,
    /// Channel applied whenever a new item list arrives
    initial_channel: ChannelChoice,
    /// Status message to display to the user
    status: String,
    fullscreen: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Background item fetch finished
    ItemsLoaded(std::result::Result<Vec<Item>, String>),
    /// User clicked the "Open catalog" button
    OpenCatalog,
    ChannelSelected(ChannelChoice),
    SortSelected(SortMode),
    /// A grid tile was clicked, by visible index
    TileActivated(usize),
    ThumbnailLoaded(String, std::result::Result<Vec<u8>, String>),
    SlideLoaded(String, std::result::Result<Vec<u8>, String>),
    Video(VideoUpdate),
    Lightbox(LightboxMessage),
}

#[derive(Debug, Clone)]
enum LightboxMessage {
    Close,
    Next,
    Prev,
    JumpTo(usize),
    TogglePlayback,
    CopyLink(String),
    ToggleFullscreen,
}

impl Gallery {
    /// Create the application and start fetching items
    fn new(
        config: Config,
        source: Box<dyn ItemSource>,
        media: MediaClient,
        cache_dir: PathBuf,
        initial_channel: ChannelChoice,
    ) -> (Self, Task<Message>) {
        let session = GallerySession::new(config.lightbox.autoplay_video);
        let mut gallery = Gallery {
            config,
            items: Vec::new(),
            session,
            media,
            cache_dir,
            thumbnails: HashMap::new(),
            slides: HashMap::new(),
            video: None,
            video_control: None,
            origin: String::new(),
            initial_channel,
            status: String::new(),
            fullscreen: false,
        };
        let task = gallery.load_from(source);
        (gallery, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = self.handle(message);
        self.sync_video();
        task
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ItemsLoaded(Ok(items)) => {
                info!(count = items.len(), "gallery ready");
                self.status = format!("Loaded from {}", self.origin);
                self.items = items;
                self.session = GallerySession::new(self.config.lightbox.autoplay_video);
                self.session
                    .set_channel(&self.items, self.initial_channel.clone());
                self.slides.clear();
                self.request_thumbnails()
            }
            Message::ItemsLoaded(Err(err)) => {
                error!(error = %err, "could not load items");
                self.status = format!("⚠️ Could not load items: {err}");
                self.items.clear();
                self.session = GallerySession::new(self.config.lightbox.autoplay_video);
                Task::none()
            }
            Message::OpenCatalog => {
                // Show the native file picker dialog
                let picked = FileDialog::new()
                    .set_title("Open gallery catalog or export")
                    .add_filter("Gallery", &["json", "db", "sqlite"])
                    .pick_file();

                match picked {
                    Some(path) => self.load_from(open_source(&path)),
                    None => Task::none(),
                }
            }
            Message::ChannelSelected(choice) => {
                self.session.set_channel(&self.items, choice);
                self.load_current_slide()
            }
            Message::SortSelected(mode) => {
                self.session.set_sort(&self.items, mode);
                self.load_current_slide()
            }
            Message::TileActivated(index) => {
                self.session.open(&self.items, index);
                self.load_current_slide()
            }
            Message::ThumbnailLoaded(url, result) => {
                let state = match result {
                    Ok(bytes) => MediaState::Ready(image::Handle::from_bytes(bytes)),
                    Err(err) => {
                        warn!(url = %url, error = %err, "thumbnail failed");
                        MediaState::Failed
                    }
                };
                self.thumbnails.insert(url, state);
                Task::none()
            }
            Message::SlideLoaded(url, result) => {
                let state = match result {
                    Ok(bytes) => MediaState::Ready(image::Handle::from_bytes(bytes)),
                    Err(err) => {
                        warn!(url = %url, error = %err, "slide failed");
                        MediaState::Failed
                    }
                };
                self.slides.insert(url, state);
                Task::none()
            }
            Message::Video(update) => {
                self.on_video(update);
                Task::none()
            }
            Message::Lightbox(message) => self.update_lightbox(message),
        }
    }

    fn update_lightbox(&mut self, message: LightboxMessage) -> Task<Message> {
        match message {
            LightboxMessage::Close => {
                self.session.close();
                if self.fullscreen {
                    return self.set_fullscreen(false);
                }
                Task::none()
            }
            LightboxMessage::Next => {
                self.session.next(&self.items);
                self.load_current_slide()
            }
            LightboxMessage::Prev => {
                self.session.prev(&self.items);
                self.load_current_slide()
            }
            LightboxMessage::JumpTo(slide) => {
                self.session.jump_to(&self.items, slide);
                self.load_current_slide()
            }
            LightboxMessage::TogglePlayback => {
                self.session.toggle_playing();
                self.send_playback_command();
                Task::none()
            }
            LightboxMessage::CopyLink(url) => iced::clipboard::write(url),
            LightboxMessage::ToggleFullscreen => self.set_fullscreen(!self.fullscreen),
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let visible = self.session.visible(&self.items);

        let base = column![
            ui::filters::view(
                self.session.channel_choices(&self.items),
                self.session.channel(),
                self.session.sort_mode(),
                visible.len(),
            ),
            container(text(self.status.as_str()).size(12)).padding([0, 8]),
            ui::grid::view(&visible, &self.thumbnails, &self.config.grid),
        ]
        .width(Length::Fill)
        .height(Length::Fill);

        match ui::lightbox::view(
            &self.session,
            &self.items,
            &self.slides,
            self.video.as_ref(),
            self.fullscreen,
        ) {
            Some(overlay) => stack![base, overlay].into(),
            None => base.into(),
        }
    }

    /// Keyboard navigation exists only while the lightbox is open, and a
    /// decoder runs only while a video slide is active
    fn subscription(&self) -> Subscription<Message> {
        let keys = if self.session.keyboard_bound() {
            keyboard::on_key_press(ui::lightbox::on_key)
        } else {
            Subscription::none()
        };

        let decoder = match self.session.playback() {
            Some(playback) => {
                video::playback(playback.url.clone(), playback.session).map(Message::Video)
            }
            None => Subscription::none(),
        };

        Subscription::batch([keys, decoder])
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn load_from(&mut self, origin: Box<dyn ItemSource>) -> Task<Message> {
        self.origin = origin.describe();
        self.status = format!("Loading items from {}…", self.origin);
        Task::perform(source::fetch_items(origin), |result| {
            Message::ItemsLoaded(result.map_err(|e| e.to_string()))
        })
    }

    /// Start fetching every tile thumbnail that is not cached in memory yet
    fn request_thumbnails(&mut self) -> Task<Message> {
        let width = self.config.media.thumbnail_width;
        let covers: Vec<(String, bool)> = self
            .items
            .iter()
            .filter_map(|item| match cover_for(item) {
                TileCover::Image(url) => Some((url.to_string(), false)),
                TileCover::Video(url) => Some((url.to_string(), true)),
                TileCover::Design | TileCover::Empty => None,
            })
            .collect();

        let mut tasks = Vec::new();
        for (url, is_video) in covers {
            if self.thumbnails.contains_key(&url) {
                continue;
            }
            self.thumbnails.insert(url.clone(), MediaState::Loading);

            let target = url.clone();
            let done = move |result: Result<Vec<u8>>| {
                Message::ThumbnailLoaded(target, result.map_err(|e| e.to_string()))
            };
            let task = if is_video {
                Task::perform(
                    thumbnail::load_video_thumbnail(self.cache_dir.clone(), url, width),
                    done,
                )
            } else {
                Task::perform(
                    thumbnail::load_thumbnail(self.media.clone(), self.cache_dir.clone(), url, width),
                    done,
                )
            };
            tasks.push(task);
        }

        Task::batch(tasks)
    }

    /// Lazily fetch the active slide once it is an image we have not loaded
    fn load_current_slide(&mut self) -> Task<Message> {
        let Some(slide) = self.session.current_slide(&self.items) else {
            return Task::none();
        };
        if slide.kind != MediaKind::Image || self.slides.contains_key(&slide.url) {
            return Task::none();
        }

        let url = slide.url.clone();
        self.slides.insert(url.clone(), MediaState::Loading);

        let client = self.media.clone();
        let target = url.clone();
        Task::perform(
            async move { client.fetch_bytes(&target).await },
            move |result| Message::SlideLoaded(url.clone(), result.map_err(|e| e.to_string())),
        )
    }

    /// Keep the video screen on the current playback session
    ///
    /// A new session (another video slide, or the lightbox closing) drops the
    /// old decoder control; its subscription ends with it.
    fn sync_video(&mut self) {
        let session = self.session.playback().map(|p| p.session);
        if self.video.as_ref().map(|v| v.session) == session {
            return;
        }
        self.video_control = None;
        self.video = session.map(VideoScreen::new);
    }

    fn on_video(&mut self, update: VideoUpdate) {
        let Some(screen) = self.video.as_mut().filter(|v| v.session == update.session) else {
            debug!(session = update.session, "dropping event from a stale video session");
            return;
        };
        match update.event {
            VideoEvent::Started(control) => {
                self.video_control = Some(control);
                self.send_playback_command();
            }
            VideoEvent::Frame(frame) => {
                screen.frame = Some(image::Handle::from_rgba(
                    frame.width,
                    frame.height,
                    std::sync::Arc::unwrap_or_clone(frame.rgba),
                ));
            }
            VideoEvent::Finished => self.session.playback_finished(update.session),
            VideoEvent::Failed(err) => {
                warn!(session = update.session, error = %err, "video playback failed");
                screen.error = Some(format!("Could not play video: {err}"));
            }
        }
    }

    /// Tell the running decoder whether it should be playing
    fn send_playback_command(&self) {
        if let (Some(control), Some(playback)) = (&self.video_control, self.session.playback()) {
            control.send(if playback.playing {
                VideoCommand::Play
            } else {
                VideoCommand::Pause
            });
        }
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Task<Message> {
        self.fullscreen = fullscreen;
        let mode = if fullscreen {
            window::Mode::Fullscreen
        } else {
            window::Mode::Windowed
        };
        window::get_latest().and_then(move |id| window::change_mode(id, mode))
    }
}

fn init_tracing(verbosity: u8) {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "media_gallery={level},wgpu=warn,wgpu_core=warn,iced_wgpu=warn,naga=warn"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Import a JSON export into the catalog and report the counts
fn import(json: &Path, db: Option<PathBuf>) -> Result<()> {
    let items = JsonSource::new(json).fetch_items()?;
    let mut library = match db {
        Some(path) => Library::open(path)?,
        None => Library::open_default()?,
    };
    let result = library.import_items(&items)?;
    let total = library.item_count()?;
    info!(
        catalog = %library.path().display(),
        total,
        "✅ Import complete! Added {} items, updated {}.",
        result.imported,
        result.updated
    );
    Ok(())
}

fn run(config: Config, initial_channel: ChannelChoice) -> Result<()> {
    let media = MediaClient::new(config.media.http_timeout())?;
    let cache_dir = thumbnail::get_thumbnail_cache_dir()?;
    let source: Box<dyn ItemSource> = match &config.source.path {
        Some(path) => open_source(path),
        None => Box::new(CatalogSource::new(Library::default_path()?)),
    };
    info!(source = %source.describe(), "🎨 starting gallery");

    iced::application("Media Gallery", Gallery::update, Gallery::view)
        .subscription(Gallery::subscription)
        .theme(Gallery::theme)
        .centered()
        .run_with(move || Gallery::new(config, source, media, cache_dir, initial_channel))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(source) = cli.source {
        config.source.path = Some(source);
    }

    match cli.command {
        Some(Command::Import { json, db }) => import(&json, db),
        None => {
            let channel = ChannelChoice::from_selection(cli.channel.as_deref().unwrap_or(""));
            run(config, channel)
        }
    }
}
