use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use vidsum::chapters::timestamp_to_seconds;
use vidsum::config::{Config, TranscriptFormat};
use vidsum::pipeline::{
    summarize_transcript, transcribe_file, youtube_caption_text, SummaryReport,
};
use vidsum::subtitle;
use vidsum::summarize::{SummaryOptions, SummaryStream};
use vidsum::transcribe::ProgressSink;
use vidsum::youtube::fetch_metadata;

#[derive(Parser)]
#[command(name = "vidsum")]
#[command(version, about = "Chaptered summaries for video/audio files and YouTube links")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe and summarize a local video/audio file
    File {
        /// Input video/audio file
        input: PathBuf,

        /// Transcript rendering: plain, timestamped, srt
        #[arg(short, long, default_value = "srt")]
        format: String,

        /// Transcript output file (defaults to input name with matching extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Summary language (defaults to configured language)
        #[arg(short, long)]
        language: Option<String>,

        /// Additional free-text context for the summary
        #[arg(short, long)]
        context: Option<String>,

        /// Stop after writing the transcript
        #[arg(long)]
        no_summary: bool,
    },

    /// Summarize a YouTube video from its captions
    Youtube {
        /// Video URL
        url: String,

        /// Caption language code
        #[arg(long, default_value = "en")]
        captions_lang: String,

        /// Summary language (defaults to configured language)
        #[arg(short, long)]
        language: Option<String>,

        /// Additional free-text context for the summary
        #[arg(short, long)]
        context: Option<String>,

        /// Print video metadata before the summary
        #[arg(long)]
        metadata: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

/// Chunk progress rendered as an indicatif bar.
struct ChunkProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl ChunkProgress {
    fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }
}

impl ProgressSink for ChunkProgress {
    fn chunk_done(&self, completed: usize, total: usize) {
        let mut guard = self.bar.lock().expect("progress lock poisoned");
        let bar = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        });
        bar.set_position(completed as u64);
        if completed == total {
            bar.finish_with_message("Transcription complete");
        }
    }
}

fn derive_output_path(input: &Path, format: TranscriptFormat) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let extension = match format {
        TranscriptFormat::Srt => "srt",
        TranscriptFormat::Plain | TranscriptFormat::Timestamped => "txt",
    };
    let mut output = input.to_path_buf();
    output.set_file_name(format!("{}.{}", stem.to_string_lossy(), extension));
    output
}

/// Drain the summary token stream to stdout, returning the full text.
async fn print_summary_stream(mut stream: SummaryStream) -> Result<String> {
    let mut full_text = String::new();
    let mut stdout = std::io::stdout();

    while let Some(fragment) = stream.next_fragment().await {
        let fragment = fragment?;
        print!("{fragment}");
        stdout.flush()?;
        full_text.push_str(&fragment);
    }
    println!();

    Ok(full_text)
}

fn print_chapters(report: &SummaryReport) {
    if report.chapters.is_empty() {
        return;
    }

    println!();
    println!("Chapters:");
    for chapter in &report.chapters {
        match timestamp_to_seconds(&chapter.start) {
            Ok(seconds) => println!(
                "  {} – {}  {} (seek to {}s)",
                chapter.start, chapter.end, chapter.title, seconds
            ),
            Err(e) => warn!("Skipping chapter '{}': {}", chapter.title, e),
        }
    }
}

async fn run_summary(
    transcript_text: &str,
    config: &Config,
    language: Option<String>,
    context: Option<String>,
) -> Result<()> {
    let options = SummaryOptions {
        language: language.unwrap_or_else(|| config.language.clone()),
        context,
    };

    let stream = summarize_transcript(transcript_text, config, &options)
        .await
        .context("Failed to start summary generation")?;

    let full_text = print_summary_stream(stream).await?;
    let report = SummaryReport::from_text(full_text);
    print_chapters(&report);

    Ok(())
}

async fn run_file(
    input: PathBuf,
    format: String,
    output: Option<PathBuf>,
    language: Option<String>,
    context: Option<String>,
    no_summary: bool,
    config: &Config,
) -> Result<()> {
    let format: TranscriptFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let output = output.unwrap_or_else(|| derive_output_path(&input, format));

    info!("Input:  {}", input.display());
    info!("Output: {}", output.display());

    let progress = ChunkProgress::new();
    let transcript = transcribe_file(&input, config, &progress)
        .await
        .context("Transcription failed")?;

    let rendered = subtitle::render(&transcript.segments, format);
    std::fs::write(&output, &rendered)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "Wrote {} segments to {}",
        transcript.segments.len(),
        output.display()
    );

    if no_summary {
        return Ok(());
    }

    // The summary always consumes the timestamped rendering so the
    // model can anchor chapter ranges.
    let summary_input = subtitle::render_timestamped(&transcript.segments);
    run_summary(&summary_input, config, language, context).await
}

async fn run_youtube(
    url: String,
    captions_lang: String,
    language: Option<String>,
    context: Option<String>,
    metadata: bool,
    config: &Config,
) -> Result<()> {
    if metadata {
        let meta = fetch_metadata(&url).context("Failed to fetch video metadata")?;
        println!("Title:    {}", meta.title);
        println!("Channel:  {}", meta.channel);
        println!("Uploaded: {}", meta.upload_date);
        println!("Duration: {:.0}s", meta.duration);
        if !meta.tags.is_empty() {
            println!("Tags:     {}", meta.tags.join(", "));
        }
        println!();
    }

    let caption_text = youtube_caption_text(&url, &captions_lang)
        .await
        .context("Failed to fetch captions")?;

    let Some(caption_text) = caption_text else {
        anyhow::bail!(
            "No captions available for this video in '{}'. \
             If you have the file, use the 'file' subcommand instead.",
            captions_lang
        );
    };

    run_summary(&caption_text, config, language, context).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    match cli.command {
        Commands::File {
            input,
            format,
            output,
            language,
            context,
            no_summary,
        } => run_file(input, format, output, language, context, no_summary, &config).await,
        Commands::Youtube {
            url,
            captions_lang,
            language,
            context,
            metadata,
        } => run_youtube(url, captions_lang, language, context, metadata, &config).await,
    }
}
