use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use lecture_core::srt::{format_timestamp, parse_srt, to_srt};
use lecture_core::{CatalogEntry, Familiarity, SubtitleId};
use lecture_viewer::{
    CatalogState, CatalogView, Config, HttpLectureApi, LectureApi, LessonEditor, PlaybackClock,
    PlayerSession, PlayerSettings, SubtitleError, SubtitleUpload, VocabularyStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Playback limit when no duration is given; Ctrl-C ends it sooner
const UNTIL_INTERRUPTED: Duration = Duration::from_secs(60 * 60 * 24);

#[derive(Parser)]
#[command(name = "lecture-viewer")]
#[command(version, about = "Browse recorded lessons, their subtitles, photos and vocabulary")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: search the standard locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API origin
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Override the subtitle language
    #[arg(long, global = true)]
    language: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List processed and unprocessed recordings
    Catalog {
        /// Search titles and teachers (or identifiers of unprocessed recordings)
        #[arg(short, long)]
        query: Option<String>,
        /// Month to show, 1-12 (default: current month)
        #[arg(long)]
        month: Option<u32>,
        /// Year to show (default: current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Simulate playback and print subtitles as they become active
    Play {
        lesson_id: String,
        /// Start position in seconds
        #[arg(long, default_value_t = 0.0)]
        from: f64,
        /// Stop after this many seconds (default: until Ctrl-C)
        #[arg(long)]
        seconds: Option<f64>,
    },
    /// Manage lesson subtitles
    Subtitles {
        #[command(subcommand)]
        command: SubtitleCommands,
    },
    /// Show or edit lesson metadata
    Lesson {
        #[command(subcommand)]
        command: LessonCommands,
    },
    /// List blackboard photos for a lesson day
    Photos { lesson_id: String },
    /// Download the audio of a recording
    Audio {
        file: String,
        /// Output path (default: the download directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Personal vocabulary list
    Vocab {
        #[command(subcommand)]
        command: VocabCommands,
    },
    /// Show the effective configuration
    Config {
        /// Write the configuration to this path
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum SubtitleCommands {
    /// List subtitles for a lesson
    List { lesson_id: String },
    /// Add a subtitle ending at the given position
    Add {
        lesson_id: String,
        /// Playback position in seconds
        #[arg(long)]
        at: f64,
        text: String,
    },
    /// Delete a subtitle by server id
    Delete { lesson_id: String, subtitle_id: String },
    /// Write subtitles as SRT
    Export {
        lesson_id: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload every cue of an SRT file
    Import { lesson_id: String, file: PathBuf },
}

#[derive(Subcommand)]
enum LessonCommands {
    /// Show the lesson record
    Show { video_id: String },
    /// Create or update the record, e.g. --set title="Clase 3"
    Save {
        video_id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        fields: Vec<String>,
    },
    /// Delete the lesson record
    Delete { video_id: String },
}

#[derive(Subcommand)]
enum VocabCommands {
    /// List words, optionally only one familiarity level
    List {
        #[arg(long)]
        familiarity: Option<Familiarity>,
    },
    /// Add a word
    Add {
        word: String,
        translation: String,
        #[arg(long, default_value_t = Familiarity::NotLearned)]
        familiarity: Familiarity,
    },
    /// Remove a word by id
    Remove { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Failed to load config, using defaults: {}", e);
            Config::from_env()
        }),
    };
    if let Some(api_url) = &cli.api_url {
        config.api.base_url = api_url.clone();
    }
    if let Some(language) = &cli.language {
        config.api.language = language.clone();
    }

    init_logging(&config, cli.verbose);
    config.validate()?;

    let api: Arc<dyn LectureApi> = Arc::new(HttpLectureApi::new(&config.api)?);
    let settings = PlayerSettings::from(&config);

    match cli.command {
        Commands::Catalog { query, month, year } => {
            let today = Local::now().date_naive();
            let mut view = CatalogView::new(api, today);
            if let Some(year) = year {
                view.set_year(year);
            }
            if let Some(month) = month {
                view.set_month(month)?;
            }
            if let Some(query) = query {
                view.set_query(query);
            }

            if let CatalogState::Failed(message) = view.load().await {
                bail!("Could not load the catalog: {}", message);
            }

            let listing = view.visible().unwrap_or_default();
            let month_year = view.month_year();
            if view.query().trim().is_empty() {
                println!("📅 {:02}/{}", month_year.month(), month_year.year());
            } else {
                println!("🔍 \"{}\"", view.query());
            }

            println!("Unprocessed ({}):", listing.unprocessed.len());
            for entry in &listing.unprocessed {
                print_entry(entry);
            }
            println!("Processed ({}):", listing.processed.len());
            for entry in &listing.processed {
                print_entry(entry);
            }

            let years = view.years(today.year());
            info!("Years with lessons: {:?}", years);
        }

        Commands::Play { lesson_id, from, seconds } => {
            let mut session = PlayerSession::new(api, settings, lesson_id);
            session.load().await?;

            let clock = session.clock();
            clock.load(None);
            clock.seek(from);
            clock.play();
            session.start_sampling();
            info!("▶️ Playing {} from {:.1}s", session.lesson_id(), from);

            let mut updates = session
                .subscribe()
                .ok_or_else(|| anyhow!("Subtitle sampler did not start"))?;
            let limit = seconds
                .filter(|s| s.is_finite() && *s >= 0.0)
                .map(Duration::from_secs_f64)
                .unwrap_or(UNTIL_INTERRUPTED);
            let deadline = tokio::time::sleep(limit);
            tokio::pin!(deadline);

            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let active = updates.borrow_and_update().clone();
                        match active {
                            Some(active) => println!(
                                "[{}] {}",
                                format_timestamp(active.entry.start_time.max(0.0)),
                                active.entry.text
                            ),
                            None => println!("..."),
                        }
                    }
                    _ = &mut deadline => break,
                    _ = tokio::signal::ctrl_c() => break,
                }
            }

            session.stop_sampling();
            clock.pause();
            if let Some(position) = clock.position() {
                info!("⏹️ Stopped at {:.1}s", position);
            }
        }

        Commands::Subtitles { command } => run_subtitles(command, api, settings).await?,

        Commands::Lesson { command } => run_lesson(command, api).await?,

        Commands::Photos { lesson_id } => {
            let mut session = PlayerSession::new(api, settings, lesson_id);
            session.load().await?;
            if let Some(message) = session.photo_error() {
                bail!("Could not load photos for {}: {}", session.lesson_id(), message);
            }
            if session.photos().is_empty() {
                println!("📭 No photos for {}", session.lesson_id());
                return Ok(());
            }

            for _ in 0..session.photos().len() {
                let label = session.photos().position_label().unwrap_or_default();
                let url = session.current_photo_url().unwrap_or_default();
                println!("{}: {}", label, url);
                session.photos_mut().next();
            }
        }

        Commands::Audio { file, output } => {
            let bytes = api.get_audio(&file).await?;
            let path = match output {
                Some(path) => path,
                None => {
                    tokio::fs::create_dir_all(&config.storage.download_dir).await?;
                    config.storage.download_dir.join(&file)
                }
            };
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("✅ Saved {} bytes to {}", bytes.len(), path.display());
        }

        Commands::Vocab { command } => {
            run_vocab(command, VocabularyStore::new(config.storage.vocabulary_file.clone())).await?
        }

        Commands::Config { save } => {
            println!("{}", config.summary());
            if let Some(path) = save {
                config.save(&path)?;
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Config, verbose: bool) {
    let default_filter = if verbose {
        "lecture_viewer=debug,lecture_core=debug,info".to_string()
    } else {
        format!("lecture_viewer={},warn", config.output.log_level)
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_entry(entry: &CatalogEntry) {
    let date = entry
        .upload_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string());
    match entry.teacher_name.as_deref().filter(|t| !t.is_empty()) {
        Some(teacher) => println!("  {}  {}  ({})  [{}]", date, entry.display_name(), teacher, entry.key),
        None => println!("  {}  {}", date, entry.display_name()),
    }
}

async fn run_subtitles(command: SubtitleCommands, api: Arc<dyn LectureApi>, settings: PlayerSettings) -> Result<()> {
    match command {
        SubtitleCommands::List { lesson_id } => {
            let mut session = PlayerSession::new(api, settings, lesson_id);
            session.load().await?;
            for entry in session.subtitles() {
                println!(
                    "{:>8}  {:>8.2} - {:<8.2} {}",
                    entry.id, entry.start_time, entry.end_time, entry.text
                );
            }
            info!("📝 {} subtitles", session.subtitles().len());
        }

        SubtitleCommands::Add { lesson_id, at, text } => {
            let mut session = PlayerSession::new(api, settings, lesson_id);
            session.load().await?;
            let clock = session.clock();
            clock.load(None);
            clock.seek(at);

            match session.add_subtitle(&text).await {
                Ok(entry) => info!(
                    "✅ Added subtitle [{:.2}, {:.2}] {}",
                    entry.start_time, entry.end_time, entry.text
                ),
                Err(SubtitleError::Upload { entry, source }) => {
                    bail!("Subtitle {:?} was not saved: {}", entry.text, source.user_message())
                }
                Err(e) => return Err(e.into()),
            }
        }

        SubtitleCommands::Delete { lesson_id, subtitle_id } => {
            let mut session = PlayerSession::new(api, settings, lesson_id);
            session.load().await?;
            let removed = session.delete_subtitle(&SubtitleId::persisted(subtitle_id.clone())).await?;
            if removed {
                info!("🗑️ Deleted subtitle {}", subtitle_id);
            } else {
                warn!("⚠️ Subtitle {} was not in the local list", subtitle_id);
            }
        }

        SubtitleCommands::Export { lesson_id, output } => {
            let mut session = PlayerSession::new(api, settings, lesson_id);
            session.load().await?;
            let srt_content = to_srt(session.subtitles());
            match output {
                Some(path) => {
                    tokio::fs::write(&path, srt_content).await?;
                    info!("💾 Wrote {} subtitles to {}", session.subtitles().len(), path.display());
                }
                None => print!("{}", srt_content),
            }
        }

        SubtitleCommands::Import { lesson_id, file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let cues = parse_srt(&content)?;

            let mut uploaded = 0;
            for cue in cues {
                let upload = SubtitleUpload {
                    video_id: lesson_id.clone(),
                    language: settings.language.clone(),
                    text: cue.text,
                    start_time: cue.start_time,
                    end_time: cue.end_time,
                };
                match api.upload_subtitle(&upload).await {
                    Ok(()) => uploaded += 1,
                    Err(e) => warn!("Skipping cue at {:.2}s: {}", upload.start_time, e.user_message()),
                }
            }
            info!("✅ Imported {} cues from {}", uploaded, file.display());
        }
    }
    Ok(())
}

async fn run_lesson(command: LessonCommands, api: Arc<dyn LectureApi>) -> Result<()> {
    match command {
        LessonCommands::Show { video_id } => {
            let mut editor = LessonEditor::new(api, video_id);
            editor.load().await?;
            let record = editor.form();
            println!("{} ({:?})", record.video_id, editor.mode());
            println!("  title:               {}", record.title);
            println!("  teacher_name:        {}", record.teacher_name);
            println!("  description:         {}", record.description);
            println!("  keywords:            {}", record.keywords);
            println!("  tags:                {}", record.tags);
            println!("  notes_link:          {}", record.notes_link);
            println!("  subtitles_status:    {}", record.subtitles_status);
            println!("  comprehension_level: {}", record.comprehension_level);
        }

        LessonCommands::Save { video_id, fields } => {
            let mut editor = LessonEditor::new(api, video_id);
            editor.load().await?;
            for field in &fields {
                let (name, value) = field
                    .split_once('=')
                    .ok_or_else(|| anyhow!("Expected FIELD=VALUE, got {:?}", field))?;
                if !editor.form_mut().set_field(name.trim(), value) {
                    bail!("Unknown lesson field: {}", name);
                }
            }
            let message = editor.save().await?;
            info!("✅ {}", message);
        }

        LessonCommands::Delete { video_id } => {
            let mut editor = LessonEditor::new(api, video_id);
            editor.load().await?;
            let message = editor.delete().await?;
            info!("🗑️ {}", message);
        }
    }
    Ok(())
}

async fn run_vocab(command: VocabCommands, store: VocabularyStore) -> Result<()> {
    let mut list = store.load().await?;
    match command {
        VocabCommands::List { familiarity } => {
            let levels: Vec<Familiarity> = match familiarity {
                Some(level) => vec![level],
                None => Familiarity::ALL.to_vec(),
            };
            for level in levels {
                println!("{}:", level);
                for entry in list.by_familiarity(level) {
                    println!("  {:>14}  {} = {}", entry.id, entry.word, entry.translation);
                }
            }
        }

        VocabCommands::Add { word, translation, familiarity } => {
            let id = list.add(&word, &translation, familiarity)?.id;
            store.save(&list).await?;
            info!("✅ Added {} ({})", word, id);
        }

        VocabCommands::Remove { id } => {
            if list.remove(id) {
                store.save(&list).await?;
                info!("🗑️ Removed {}", id);
            } else {
                warn!("⚠️ No vocabulary entry with id {}", id);
            }
        }
    }
    Ok(())
}
