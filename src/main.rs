use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use tokio::task::JoinHandle;

use facadegen::{
    logger::{self, LogLevel, LoggerConfig},
    models::supported_models,
    Config, DebugLog, GenerationRequest, GenerationType, ImageSubType,
    InspirationStore, MediaFile, ResultGallery, Studio, StudioError, SurpriseTheme, ThemeTab,
    VideoSubType,
};

#[derive(Parser, Debug)]
#[command(name = "facadegen", version, about = "Projection-mapping design generator")]
struct Cli {
    /// Backend base URL (overrides FACADEGEN_BACKEND_URL)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Saved inspiration file (overrides FACADEGEN_INSPIRATION_PATH)
    #[arg(long, global = true)]
    inspiration_file: Option<PathBuf>,

    /// Print request/response debug events
    #[arg(long, global = true)]
    debug: bool,

    /// More log output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(short, long, global = true)]
    quiet: bool,

    /// Also append log lines to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate image or video designs
    Generate(GenerateArgs),
    /// Expand a short idea into a detailed prompt
    Enhance { prompt: String },
    /// Resize and letterbox an image to a fixed canvas
    Preprocess {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[arg(long, default_value_t = 720)]
        height: u32,
    },
    /// Manage saved inspiration
    Inspiration {
        #[command(subcommand)]
        action: InspirationAction,
    },
    /// List the models behind each mode
    Models,
}

#[derive(Subcommand, Debug)]
enum InspirationAction {
    List,
    /// Save an image file as inspiration
    Add { path: PathBuf },
    Remove { index: usize },
    Clear,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(long = "type", default_value = "image")]
    generation_type: GenerationType,

    /// Image mode: facade | fun
    #[arg(long, default_value = "facade")]
    image_mode: ImageSubType,

    /// Video mode: life | transition
    #[arg(long, default_value = "life")]
    video_mode: VideoSubType,

    /// House photo / outline map (image facade mode)
    #[arg(long)]
    map: Option<PathBuf>,

    #[arg(long)]
    start_scene: Option<PathBuf>,

    #[arg(long)]
    end_scene: Option<PathBuf>,

    #[arg(long, default_value = "text")]
    tab: ThemeTab,

    #[arg(long, default_value = "")]
    prompt: String,

    /// Enhance the prompt before generating
    #[arg(long)]
    enhance: bool,

    #[arg(long = "inspiration")]
    inspiration: Vec<PathBuf>,

    /// Indices into the saved inspiration list
    #[arg(long = "saved")]
    saved: Vec<usize>,

    /// Surprise preset; switches to the surprise tab
    #[arg(long)]
    surprise: Option<SurpriseTheme>,

    /// Number of outputs: 1, 2 or 4
    #[arg(long)]
    count: Option<u8>,

    /// Video duration in seconds (5-10)
    #[arg(long, default_value_t = 5)]
    duration: u32,

    #[arg(long, default_value = "output")]
    out: PathBuf,

    /// Save every result to the inspiration library
    #[arg(long)]
    save: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    let mut log_config = if cli.json_logs {
        LoggerConfig::for_scripts()
    } else {
        LoggerConfig::new()
    }
    .with_level(LogLevel::from_verbosity(cli.verbose, cli.quiet));
    if let Some(path) = &cli.log_file {
        log_config = log_config.with_log_file(path);
    }
    if let Err(e) = logger::init_with_config(log_config) {
        eprintln!("Failed to initialize logger: {}", e);
    }
    if !dotenv_loaded {
        log::debug!("No .env file found, using system environment variables");
    }

    let mut config = Config::from_env();
    if let Some(url) = &cli.backend_url {
        config.backend = config.backend.with_base_url(url.as_str());
    }
    if let Some(path) = &cli.inspiration_file {
        config.inspiration_path = path.clone();
    }
    logger::log_config_info(&config);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: Config) -> Result<(), StudioError> {
    let (debug, printer) = debug_channel(cli.debug);

    let outcome = match cli.command {
        Command::Generate(args) => generate(args, &config, &debug).await,
        Command::Enhance { prompt } => {
            let studio = Studio::new(&config)?;
            let enhanced = studio.enhance_prompt(&prompt, &debug).await?;
            println!("{}", enhanced);
            Ok(())
        }
        Command::Preprocess {
            input,
            output,
            width,
            height,
        } => {
            let file = MediaFile::from_path(&input)?;
            let processed = facadegen::preprocess_image(&file, width, height)?;
            std::fs::write(&output, &processed.bytes)
                .map_err(|e| StudioError::StorageError(format!("{}: {}", output.display(), e)))?;
            log::info!("💾 Wrote {}", output.display());
            Ok(())
        }
        Command::Inspiration { action } => inspiration(action, &config).await,
        Command::Models => {
            for model in supported_models() {
                println!(
                    "{:<32} {:<22} {:<8} {:<6} {}",
                    model.id,
                    model.name,
                    model.provider,
                    model.category.as_str(),
                    model.description
                );
            }
            Ok(())
        }
    };

    drop(debug);
    if let Some(handle) = printer {
        let _ = handle.await;
    }
    outcome
}

fn debug_channel(enabled: bool) -> (DebugLog, Option<JoinHandle<()>>) {
    if !enabled {
        return (DebugLog::disabled(), None);
    }

    let (debug, mut stream) = DebugLog::channel();
    let handle = tokio::spawn(async move {
        while let Some(event) = stream.next().await {
            println!("{}", logger::format_debug_event(&event, true));
        }
    });
    (debug, Some(handle))
}

async fn generate(args: GenerateArgs, config: &Config, debug: &DebugLog) -> Result<(), StudioError> {
    let studio = Studio::new(config)?;
    let mut store = InspirationStore::open_file(&config.inspiration_path).await;

    let prompt = if args.enhance && !args.prompt.trim().is_empty() {
        let enhanced = studio.enhance_prompt(&args.prompt, debug).await?;
        log::info!("✨ Enhanced prompt: {}", enhanced);
        enhanced
    } else {
        args.prompt.clone()
    };

    let mut builder = GenerationRequest::builder(args.generation_type)
        .image_sub_type(args.image_mode)
        .video_sub_type(args.video_mode)
        .active_tab(args.tab)
        .text_prompt(prompt)
        .duration_secs(args.duration);

    if let Some(path) = &args.map {
        builder = builder.map_file(MediaFile::from_path(path)?);
    }
    if let Some(path) = &args.start_scene {
        builder = builder.start_scene(MediaFile::from_path(path)?);
    }
    if let Some(path) = &args.end_scene {
        builder = builder.end_scene(MediaFile::from_path(path)?);
    }
    for path in &args.inspiration {
        builder = builder.inspiration_image(MediaFile::from_path(path)?);
    }
    for &index in &args.saved {
        let data_url = store.get(index).ok_or_else(|| {
            StudioError::MissingInput(format!("No saved inspiration at index {}", index))
        })?;
        builder = builder.selected_inspiration(data_url);
    }
    if let Some(theme) = args.surprise {
        builder = builder.active_tab(ThemeTab::Surprise).surprise_theme(theme);
    }
    if let Some(count) = args.count {
        builder = builder.output_count(count);
    }

    let request = builder.build()?;
    log::info!(
        "🎨 Generating {} {} design(s)",
        request.output_count,
        request.generation_type()
    );

    let gallery = ResultGallery::new(studio.generate(&request, debug).await?);
    log::info!("✅ {} of {} succeeded", gallery.len(), request.output_count);

    for (i, result) in gallery.results().iter().enumerate() {
        let path = result.write_to_dir(&args.out, i)?;
        log::info!("💾 Saved {}", path.display());
        if args.save && store.save(result.data_url.clone()).await? {
            log::info!("⭐ Added result {} to saved inspiration", i + 1);
        }
    }

    Ok(())
}

async fn inspiration(action: InspirationAction, config: &Config) -> Result<(), StudioError> {
    let mut store = InspirationStore::open_file(&config.inspiration_path).await;

    match action {
        InspirationAction::List => {
            for (i, item) in store.items().iter().enumerate() {
                let (mime, size) = match facadegen::models::decode_data_url(item) {
                    Ok((mime, bytes)) => (mime, bytes.len()),
                    Err(_) => ("unknown".to_string(), 0),
                };
                println!("{:>3}  {:<12} {} bytes", i, mime, size);
            }
            if store.is_empty() {
                println!("No saved inspiration yet.");
            }
        }
        InspirationAction::Add { path } => {
            let file = MediaFile::from_path(&path)?;
            if store.save(file.to_data_url()).await? {
                log::info!("⭐ Saved {}", path.display());
            } else {
                log::info!("{} is already saved", path.display());
            }
        }
        InspirationAction::Remove { index } => {
            let item = store
                .get(index)
                .map(str::to_string)
                .ok_or_else(|| {
                    StudioError::MissingInput(format!("No saved inspiration at index {}", index))
                })?;
            store.remove(&item).await?;
            log::info!("🗑️  Removed item {}", index);
        }
        InspirationAction::Clear => {
            store.clear().await?;
            log::info!("🗑️  Cleared saved inspiration");
        }
    }

    Ok(())
}
