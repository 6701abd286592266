//! unchat CLI - AI chat export tool

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unchat::extract::write_document;
use unchat::render::{files_to_csv, render_with_stats};
use unchat::{
    html_to_markdown_with, BuildConfig, CleanupPreset, DirectorySink, ExportDocument,
    ExportSession, FileFilter, GptRecord, JsonFormat, PlatformConfig, RenderOptions, SnapshotPage,
    Timing,
};

#[derive(Parser)]
#[command(name = "unchat")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Export saved AI chat pages to Markdown, text, JSON, and CSV", long_about = None)]
struct Cli {
    /// Saved chat page (HTML)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Chat platform the page was saved from
    #[arg(long, value_enum, default_value = "generic")]
    platform: Platform,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every command that reads a saved page.
#[derive(clap::Args)]
struct PageArgs {
    /// Saved chat page (HTML)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Chat platform the page was saved from
    #[arg(long, value_enum, default_value = "generic")]
    platform: Platform,

    /// Platform configuration JSON (overrides --platform)
    #[arg(long, value_name = "JSON", env = "UNCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Original page URL, recorded in the export metadata
    #[arg(long)]
    url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a saved conversation to Markdown
    #[command(alias = "md")]
    Markdown {
        #[command(flatten)]
        page: PageArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Include YAML frontmatter
        #[arg(short, long)]
        frontmatter: bool,

        /// Escape Markdown special characters in text
        #[arg(long)]
        escape: bool,

        /// Text cleanup preset
        #[arg(long, value_enum)]
        cleanup: Option<CleanupLevel>,

        /// Maximum heading level (1-6)
        #[arg(long, default_value = "6")]
        max_heading: u8,
    },

    /// Export a saved conversation to JSON
    Json {
        #[command(flatten)]
        page: PageArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Export a saved conversation to plain text
    Text {
        #[command(flatten)]
        page: PageArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Text cleanup preset
        #[arg(long, value_enum)]
        cleanup: Option<CleanupLevel>,
    },

    /// Export files found on a saved page as a directory bundle
    Files {
        #[command(flatten)]
        page: PageArgs,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Only keep these file types (e.g. "md,json,pdf.txt")
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,

        /// Minimum file size in characters
        #[arg(long, default_value = "0")]
        min_size: usize,

        /// Maximum file size in characters
        #[arg(long)]
        max_size: Option<usize>,

        /// Also write a CSV listing
        #[arg(long)]
        csv: bool,
    },

    /// Export captured custom GPT data to JSON or CSV
    Gpts {
        /// Captured discovery responses or previous JSON exports
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write CSV instead of JSON
        #[arg(long)]
        csv: bool,
    },

    /// Convert an HTML fragment to Markdown
    Convert {
        /// HTML fragment file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Escape Markdown special characters in text
        #[arg(long)]
        escape: bool,
    },

    /// Show conversation statistics
    Info {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Platform {
    Chatgpt,
    Claude,
    Deepseek,
    Generic,
}

impl From<Platform> for PlatformConfig {
    fn from(platform: Platform) -> Self {
        match platform {
            Platform::Chatgpt => PlatformConfig::chatgpt(),
            Platform::Claude => PlatformConfig::claude(),
            Platform::Deepseek => PlatformConfig::deepseek(),
            Platform::Generic => PlatformConfig::default(),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Minimal cleanup (Unicode normalization only)
    Minimal,
    /// Standard cleanup (default)
    Standard,
    /// Aggressive cleanup (squeeze spaces)
    Aggressive,
}

impl From<CleanupLevel> for CleanupPreset {
    fn from(level: CleanupLevel) -> Self {
        match level {
            CleanupLevel::Minimal => CleanupPreset::Minimal,
            CleanupLevel::Standard => CleanupPreset::Standard,
            CleanupLevel::Aggressive => CleanupPreset::Aggressive,
        }
    }
}

type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Markdown {
            page,
            output,
            frontmatter,
            escape,
            cleanup,
            max_heading,
        }) => {
            let mut options = RenderOptions::new()
                .with_frontmatter(frontmatter)
                .with_escaping(escape)
                .with_max_heading(max_heading);
            if let Some(level) = cleanup {
                options = options.with_cleanup_preset(level.into());
            }
            cmd_conversation(&page, output.as_deref(), options, ExportSession::export_markdown)
        }
        Some(Commands::Json {
            page,
            output,
            compact,
        }) => {
            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let options = RenderOptions::new().with_json_format(format);
            cmd_conversation(&page, output.as_deref(), options, ExportSession::export_json)
        }
        Some(Commands::Text {
            page,
            output,
            cleanup,
        }) => {
            let mut options = RenderOptions::new();
            if let Some(level) = cleanup {
                options = options.with_cleanup_preset(level.into());
            }
            cmd_conversation(&page, output.as_deref(), options, ExportSession::export_text)
        }
        Some(Commands::Files {
            page,
            output,
            types,
            min_size,
            max_size,
            csv,
        }) => {
            let filter = FileFilter::new()
                .with_types(types)
                .with_size(min_size, max_size);
            cmd_files(&page, &output, filter, csv)
        }
        Some(Commands::Gpts {
            inputs,
            output,
            csv,
        }) => cmd_gpts(&inputs, output.as_deref(), csv),
        Some(Commands::Convert {
            input,
            output,
            escape,
        }) => cmd_convert(&input, output.as_deref(), escape),
        Some(Commands::Info { page }) => cmd_info(&page),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: export everything if input is provided
            if let Some(input) = cli.input {
                cmd_export_all(&input, cli.output.as_deref(), cli.platform)
            } else {
                println!("{}", "Usage: unchat <FILE> [OUTPUT]".yellow());
                println!("       unchat --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Run an async extraction step on a single-threaded runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    Ok(runtime.block_on(future))
}

fn load_config(page: &PageArgs) -> Result<PlatformConfig, Box<dyn std::error::Error>> {
    let mut config = match &page.config {
        Some(path) => PlatformConfig::from_json_file(path)?,
        None => page.platform.into(),
    };
    // A saved page is static; nothing opens or settles after a click
    config.timing = Timing {
        open_timeout_ms: 1,
        close_timeout_ms: 1,
        ..Timing::instant()
    };
    Ok(config)
}

fn load_page(page: &PageArgs) -> Result<SnapshotPage, Box<dyn std::error::Error>> {
    let snapshot = SnapshotPage::from_file(&page.input)?;
    Ok(match &page.url {
        Some(url) => snapshot.with_url(url.clone()),
        None => snapshot,
    })
}

fn open_session(
    page: &PageArgs,
    options: Option<RenderOptions>,
) -> Result<(ExportSession, SnapshotPage), Box<dyn std::error::Error>> {
    let config = load_config(page)?;
    let assistant = config.assistant_name.clone();
    let mut session = ExportSession::new(config)?;
    if let Some(options) = options {
        session = session.with_render_options(options.with_assistant_name(assistant));
    }
    Ok((session, load_page(page)?))
}

fn emit(document: &ExportDocument, output: Option<&Path>) -> CmdResult {
    if let Some(path) = output {
        write_document(path, document)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else if let Some(body) = document.as_str() {
        println!("{}", body);
    }
    Ok(())
}

fn cmd_conversation(
    page: &PageArgs,
    output: Option<&Path>,
    options: RenderOptions,
    export: fn(&ExportSession) -> unchat::Result<ExportDocument>,
) -> CmdResult {
    let (mut session, snapshot) = open_session(page, Some(options))?;
    let count = block_on(session.capture_messages(&snapshot))??;
    log::info!("{} messages extracted from {}", count, page.input.display());

    let document = export(&session)?;
    emit(&document, output)
}

fn cmd_files(page: &PageArgs, output: &Path, filter: FileFilter, csv: bool) -> CmdResult {
    let (session, snapshot) = open_session(page, None)?;
    let mut session = session.with_file_filter(filter);
    let count = block_on(session.capture_files(&snapshot))??;

    let bundle = session.export_files()?;
    let mut sink = DirectorySink::new(output);
    let path = session.deliver(&bundle, &mut sink)?;

    println!("{} {} files to {}", "Exported".green(), count, path.display());
    for file in session.files() {
        println!("  {} {} ({} chars)", "├─".dimmed(), file.filename, file.size);
    }

    if csv {
        let listing = ExportDocument::Csv(files_to_csv(session.files()));
        let path = session.deliver(&listing, &mut sink)?;
        println!("{} {}", "Listing saved to".green(), path.display());
    }

    Ok(())
}

fn cmd_gpts(inputs: &[PathBuf], output: Option<&Path>, csv: bool) -> CmdResult {
    let mut session = ExportSession::new(PlatformConfig::chatgpt())?;

    for input in inputs {
        let data = fs::read_to_string(input)?;
        let count = match session.ingest_gpt_json(&data) {
            Ok(count) => count,
            Err(_) => {
                // Previously exported array of records
                let records: Vec<GptRecord> = serde_json::from_str(&data)?;
                let count = records.len();
                session.ingest_gpts(records);
                count
            }
        };
        log::info!("{} GPT records from {}", count, input.display());
    }

    let document = if csv {
        session.export_gpts_csv()?
    } else {
        session.export_gpts()?
    };
    emit(&document, output)?;

    if output.is_some() {
        println!("{} {} GPTs", "Exported".green(), session.gpts().len());
    }
    Ok(())
}

fn cmd_convert(input: &Path, output: Option<&Path>, escape: bool) -> CmdResult {
    let html = fs::read_to_string(input)?;
    let options = RenderOptions::new().with_escaping(escape);
    let markdown = html_to_markdown_with(&html, &BuildConfig::default(), &options);
    emit(&ExportDocument::Markdown(markdown), output)
}

fn cmd_export_all(input: &Path, output: Option<&Path>, platform: Platform) -> CmdResult {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_export", stem))
    });
    let page = PageArgs {
        input: input.to_path_buf(),
        platform,
        config: None,
        url: None,
    };

    let pb = ProgressBar::new(4);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Extracting...");
    let options = RenderOptions::new().with_frontmatter(true);
    let (mut session, snapshot) = open_session(&page, Some(options))?;
    let summary = block_on(session.capture(&snapshot))??;
    pb.inc(1);

    let mut sink = DirectorySink::new(&output_dir);
    let mut written = Vec::new();

    pb.set_message("Generating Markdown...");
    if summary.messages > 0 {
        written.push(session.deliver(&session.export_markdown()?, &mut sink)?);
    }
    pb.inc(1);

    pb.set_message("Generating text and JSON...");
    if summary.messages > 0 {
        written.push(session.deliver(&session.export_text()?, &mut sink)?);
        written.push(session.deliver(&session.export_json()?, &mut sink)?);
    }
    pb.inc(1);

    pb.set_message("Writing files...");
    if summary.files > 0 {
        written.push(session.deliver(&session.export_files()?, &mut sink)?);
    }
    pb.inc(1);

    pb.finish_with_message("Done!");

    if written.is_empty() {
        return Err(Box::new(unchat::Error::NoContentFound));
    }

    println!("\n{}", "Output files:".green().bold());
    for (i, path) in written.iter().enumerate() {
        let branch = if i + 1 == written.len() { "└─" } else { "├─" };
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        println!("  {} {}", branch.dimmed(), name);
    }

    Ok(())
}

fn cmd_info(page: &PageArgs) -> CmdResult {
    let (mut session, snapshot) = open_session(page, None)?;
    block_on(session.capture(&snapshot))??;

    let metadata = session.metadata();
    println!("{}", "Conversation Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), page.input.display());
    println!("{}: {}", "Title".bold(), metadata.title);
    println!("{}: {}", "Platform".bold(), metadata.platform);
    if !metadata.url.is_empty() {
        println!("{}: {}", "URL".bold(), metadata.url);
    }
    println!("{}: {}", "Files".bold(), session.files().len());

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let result = render_with_stats(
        &session.conversation(),
        &RenderOptions::new().with_stats(true),
    )?;
    let stats = result.stats;
    println!(
        "{}: {} ({} user, {} assistant)",
        "Messages".bold(),
        stats.message_count,
        stats.user_message_count,
        stats.assistant_message_count
    );
    if stats.thinking_count > 0 {
        println!("{}: {}", "With reasoning".bold(), stats.thinking_count);
    }
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);
    println!("{}: {}", "Code blocks".bold(), stats.code_block_count);
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "Links".bold(), stats.link_count);
    println!("{}: {}", "Images".bold(), stats.image_count);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unchat".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("AI chat export tool");
    println!();
    println!("License: MIT");
}
