use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use musikepoker::catalogue::DEFAULT_REMOTE_BASE_URL;
use musikepoker::config::{AppConfig, CliConfig, FileConfig, DEFAULT_REQUEST_TIMEOUT_SEC};
use musikepoker::resolver::{PlayableSource, UploadedFile};
use musikepoker::{
    AudioStore, AutoplayPolicy, Catalogue, HttpPlaybackEngine, ObjectUrlRegistry, PlaybackState,
    QuizView, SqliteAudioStore, TimelineView, ViewContext,
};

mod cli_style;
use cli_style::{
    get_styles, print_empty_list, print_error, print_key_value, print_success, print_warning,
    Columns,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(
    styles = get_styles(),
    version,
    about = "Local audio cache for the music history timeline"
)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the audio store database.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Base URL the remote copies are streamed from.
    #[clap(long, default_value = DEFAULT_REMOTE_BASE_URL)]
    pub remote_base_url: String,

    /// Library file to use instead of the built-in one.
    #[clap(long, value_parser = parse_path)]
    pub catalogue: Option<PathBuf>,

    /// Whether playback may start without a user gesture.
    #[clap(long, value_enum, default_value_t = AutoplayPolicy::RequireGesture)]
    pub autoplay: AutoplayPolicy,

    /// Largest payload the store accepts, in bytes.
    #[clap(long)]
    pub max_payload_bytes: Option<u64>,

    /// Timeout in seconds for fetching remote audio.
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SEC)]
    pub request_timeout_sec: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists the works in chronological order and where each would play from.
    Timeline,

    /// Lists the file names stored locally.
    Keys,

    /// Stores every file whose name matches a work in the library.
    Import {
        #[clap(required = true, value_parser = parse_path)]
        files: Vec<PathBuf>,
    },

    /// Stores a file as the local copy of one work.
    Upload {
        piece_id: String,
        #[clap(value_parser = parse_path)]
        file: PathBuf,
    },

    /// Shows the source a work would be played from.
    Resolve { piece_id: String },

    /// Loads and starts a work as if its play button was pressed.
    Play { piece_id: String },
}

fn read_upload(path: &Path) -> Result<UploadedFile> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .with_context(|| format!("Not a file: {:?}", path))?;
    let payload = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    Ok(UploadedFile::new(name, payload))
}

fn describe_state(state: &PlaybackState) -> String {
    match state {
        PlaybackState::Idle => "idle".to_string(),
        PlaybackState::Loading { piece_id } => format!("loaded {}", piece_id),
        PlaybackState::Playing { piece_id } => format!("playing {}", piece_id),
        PlaybackState::Paused { piece_id } => format!("paused {}", piece_id),
        PlaybackState::Failed { piece_id, failure } => format!("{} failed: {}", piece_id, failure),
    }
}

fn show_timeline(view: &TimelineView) {
    let mut columns = Columns::new(&["Year", "Period", "Composer", "Title", "Source"]);
    for card in view.cards() {
        columns.add_row(vec![
            card.entry.display_year(),
            card.entry.period.display_name().to_string(),
            card.entry.composer.clone(),
            card.entry.title.clone(),
            if card.is_local { "local" } else { "remote" }.to_string(),
        ]);
    }
    columns.print();
}

async fn run(command: Command, ctx: &ViewContext) -> Result<()> {
    match command {
        Command::Timeline => {
            let view = TimelineView::mount(ctx);
            if let Some(status) = view.status() {
                print_warning(status);
            }
            show_timeline(&view);
            view.unmount().await;
        }
        Command::Keys => {
            let mut keys = ctx.store.list_keys()?;
            keys.sort();
            if keys.is_empty() {
                print_empty_list("No audio stored locally");
            }
            for key in keys {
                match ctx.catalogue.get_by_file_name(&key) {
                    Some(piece) => print_key_value(&key, &piece.id),
                    None => print_key_value(&key, "(not in library)"),
                }
            }
        }
        Command::Import { files } => {
            let uploads = files
                .iter()
                .map(|path| read_upload(path))
                .collect::<Result<Vec<_>>>()?;
            let mut view = QuizView::mount(ctx);
            match view.upload_files(uploads) {
                Some(report) => {
                    for (name, piece_id) in &report.matched {
                        print_success(&format!("{} -> {}", name, piece_id));
                    }
                    for name in &report.unmatched {
                        print_warning(&format!("{} matches no work in the library", name));
                    }
                    print_key_value("Status", view.status());
                }
                None => print_error(view.status()),
            }
            view.unmount().await;
        }
        Command::Upload { piece_id, file } => {
            if ctx.catalogue.get(&piece_id).is_none() {
                bail!("Unknown piece id: {}", piece_id);
            }
            let upload = read_upload(&file)?;
            let mut view = TimelineView::mount(ctx);
            if view.manual_upload(&piece_id, upload) {
                print_success(&format!("Stored local copy of {}", piece_id));
            } else {
                print_error(view.status().unwrap_or("Upload failed"));
            }
            view.unmount().await;
        }
        Command::Resolve { piece_id } => {
            let view = TimelineView::mount(ctx);
            match view.source_for(&piece_id) {
                Some(PlayableSource::Local(url)) => print_key_value("Local", url),
                Some(PlayableSource::Remote(url)) => print_key_value("Remote", url),
                None => print_error(&format!("Unknown piece id: {}", piece_id)),
            }
            view.unmount().await;
        }
        Command::Play { piece_id } => {
            let mut view = TimelineView::mount(ctx);
            let state = describe_state(view.toggle(&piece_id).await);
            print_key_value("State", &state);
            if let Some(advisory) = view.advisory() {
                print_warning(advisory);
            }
            view.unmount().await;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_dir: cli_args.db_dir.clone(),
        remote_base_url: cli_args.remote_base_url.clone(),
        catalogue_path: cli_args.catalogue.clone(),
        autoplay: cli_args.autoplay,
        max_payload_bytes: cli_args.max_payload_bytes,
        request_timeout_sec: cli_args.request_timeout_sec,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    let catalogue = match &config.catalogue_path {
        Some(path) => {
            info!("Loading library from {:?}...", path);
            Catalogue::load(path, &config.remote_base_url)?
        }
        None => Catalogue::builtin(&config.remote_base_url)?,
    };

    info!("Opening audio store at {:?}...", config.audio_db_path());
    let store: Arc<dyn AudioStore> = Arc::new(
        SqliteAudioStore::new(config.audio_db_path())
            .with_max_payload_bytes(config.max_payload_bytes),
    );

    let registry = ObjectUrlRegistry::new();
    let engine = Arc::new(HttpPlaybackEngine::new(
        registry.clone(),
        config.autoplay,
        config.request_timeout_sec,
    )?);
    let ctx = ViewContext::new(Arc::new(catalogue), store, registry, engine);

    run(cli_args.command, &ctx).await
}
