use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use rust_wcloud::{LayoutConfig, LayoutOverrides, Tokenizer, WordCloud};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Generate a word cloud image from a text file.
#[derive(Debug, Parser)]
#[clap(name = "rust_wcloud", version, about)]
struct Cli {
    /// Plain text input
    input: PathBuf,

    /// Output file; a numeric suffix is added if it already exists
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// JSON file with layout overrides (camelCase keys)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// svg, png, jpg, jpeg or webp
    #[clap(short, long)]
    format: Option<String>,

    #[clap(long)]
    width: Option<u32>,

    #[clap(long)]
    height: Option<u32>,

    #[clap(long)]
    theme: Option<String>,

    #[clap(long)]
    max_words: Option<usize>,

    /// TrueType/OpenType font used for measuring and raster output
    #[clap(long, env = "WCLOUD_FONT")]
    font: Option<PathBuf>,

    /// Seed for reproducible word angles
    #[clap(long)]
    seed: Option<u64>,

    #[clap(long, default_value_t = 2)]
    min_word_length: usize,

    /// Comma separated words to leave out
    #[clap(long, value_delimiter = ',')]
    filter: Vec<String>,

    /// Fold all words to lowercase before counting
    #[clap(long)]
    lowercase: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> rust_wcloud::Result<()> {
    let read = |path: &PathBuf| {
        fs::read_to_string(path).map_err(|source| rust_wcloud::Error::Input {
            path: path.clone(),
            source,
        })
    };

    let mut overrides: LayoutOverrides = match &cli.config {
        Some(path) => serde_json::from_str(&read(path)?)?,
        None => LayoutOverrides::default(),
    };
    overrides.format = cli.format.clone().or(overrides.format);
    overrides.width = cli.width.or(overrides.width);
    overrides.height = cli.height.or(overrides.height);
    overrides.theme = cli.theme.clone().or(overrides.theme);
    overrides.max_words = cli.max_words.or(overrides.max_words);

    let config = LayoutConfig::from_overrides(&overrides)?;
    let extension = config.format.extension();

    let tokenizer = Tokenizer::default()
        .with_min_word_length(cli.min_word_length)
        .with_filter(&cli.filter)
        .with_lowercase(cli.lowercase)
        .with_merge_case(!cli.lowercase);

    let mut wordcloud = WordCloud::default()
        .with_tokenizer(tokenizer)
        .with_config(config)?;
    if let Some(font) = &cli.font {
        wordcloud = wordcloud.with_font_from_path(font)?;
    }
    if let Some(seed) = cli.seed {
        wordcloud = wordcloud.with_seed(seed);
    }

    let text = read(&cli.input)?;
    let generation = wordcloud.generate_from_text(&text)?;

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension(extension));
    let saved = generation.artifact.save(&output)?;

    println!(
        "{} ({} of {} words placed)",
        saved.display(),
        generation.placed_count(),
        generation.placed_count() + generation.dropped_count()
    );

    Ok(())
}
