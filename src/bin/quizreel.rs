use std::path::PathBuf;

use clap::{Parser, Subcommand};

use quizreel::{
    Config, ElevenLabsTts, Generator, RenderJob, RenderRequest, content, image_prep,
};

const DEFAULT_HOOK: &str = "Let's play!";
const DEFAULT_THEME: &str = "General";

#[derive(Parser, Debug)]
#[command(name = "quizreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a quiz video from questions and images (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Write solid-color placeholder image pairs for test runs.
    Placeholders(PlaceholdersArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Settings JSON (video, voice, timing, output sections).
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// JSON array of question strings.
    #[arg(long)]
    questions: PathBuf,

    /// JSON array of hook strings; the first entry is used.
    #[arg(long)]
    hooks: Option<PathBuf>,

    /// Hook text, overriding --hooks.
    #[arg(long)]
    hook: Option<String>,

    /// Theme name shown on the intro card.
    #[arg(long)]
    theme: Option<String>,

    /// Image files, two per question in order (top then bottom).
    #[arg(long, num_args = 1.., value_name = "IMAGE")]
    images: Vec<PathBuf>,

    /// Generate placeholder image pairs instead of reading --images.
    #[arg(long)]
    create_placeholders: bool,

    /// Insert a pause clip between consecutive questions.
    #[arg(long)]
    pause_between_questions: bool,

    /// Ticking-clock audio played during pause clips.
    #[arg(long)]
    clock_audio: Option<PathBuf>,

    /// Output MP4 path, overriding the config's output settings.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlaceholdersArgs {
    /// Number of questions to cover (two images each).
    #[arg(long)]
    count: usize,

    /// Directory to write the images into.
    #[arg(long, default_value = "placeholders")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizreel=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Placeholders(args) => cmd_placeholders(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = Config::load(&args.config)?;
    let questions = content::load_questions(&args.questions)?;

    let hook = match (&args.hook, &args.hooks) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => content::load_hooks(path)?
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_HOOK.to_string()),
        (None, None) => DEFAULT_HOOK.to_string(),
    };
    let theme = args.theme.unwrap_or_else(|| DEFAULT_THEME.to_string());

    let (images, placeholder_files) = if args.create_placeholders {
        let dir = cfg.output_settings.output_dir.join("placeholders");
        let paths = image_prep::placeholder_pairs(questions.len(), &dir)?;
        (paths.clone(), paths)
    } else {
        (args.images, Vec::new())
    };
    let image_pairs = content::pair_images(&questions, &images)?;

    let synth = ElevenLabsTts::new(&cfg.voice_settings)?;
    let request = RenderRequest {
        theme,
        hook,
        questions,
        image_pairs,
        clock_audio: args.clock_audio,
        legacy_pauses: args.pause_between_questions,
        output_path: args.output,
    };

    let job = RenderJob::spawn(Generator::new(cfg, Box::new(synth)), request);
    let out = job.wait(|msg| eprintln!("{msg}"))?;
    image_prep::cleanup_placeholders(&placeholder_files);
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_placeholders(args: PlaceholdersArgs) -> anyhow::Result<()> {
    if args.count == 0 {
        anyhow::bail!("--count must be at least 1");
    }
    let paths = image_prep::placeholder_pairs(args.count, &args.out_dir)?;
    for p in &paths {
        eprintln!("wrote {}", p.display());
    }
    Ok(())
}
