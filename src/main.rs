// clipmark: clipboard content ⇄ Markdown from the command line.
//
// Clipboard access stays with the caller: payloads come from files or stdin
// and results go to stdout, so the tool composes with pbpaste/xclip/wl-paste.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;

use clipmark::{ClipboardPayload, ConversionError, ConversionOptions};

#[derive(Parser)]
#[command(name = "clipmark", version, about = "Convert rich clipboard content to Markdown and back")]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an HTML and/or plain-text payload to Markdown
    ToMarkdown {
        /// File holding the HTML representation
        #[arg(long)]
        html: Option<PathBuf>,

        /// File holding the plain-text representation (default: stdin)
        #[arg(long)]
        text: Option<PathBuf>,

        /// Strip images, video, audio and iframes
        #[arg(long)]
        plain: bool,

        /// JSON file with conversion options
        #[arg(short, long, env = "CLIPMARK_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Convert Markdown to a styled HTML document
    ToRichText {
        /// Markdown file (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}

fn write_stdout(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes()).context("Failed to write output")?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n").context("Failed to write output")?;
    }
    Ok(())
}

fn to_markdown(
    html: Option<PathBuf>,
    text: Option<PathBuf>,
    plain: bool,
    config: Option<PathBuf>,
) -> Result<()> {
    let mut options = match config {
        Some(path) => ConversionOptions::from_json_file(&path)?,
        None => ConversionOptions::default(),
    };
    if plain {
        options.strip_media = true;
    }

    let html = html.as_deref().map(read_file).transpose()?;
    let text = match (text, &html) {
        (Some(path), _) => Some(read_file(&path)?),
        (None, None) => Some(read_stdin()?),
        (None, Some(_)) => None,
    };
    let payload = ClipboardPayload::new(html, text);

    let markdown = match clipmark::convert_clipboard_to_markdown(&payload, &options) {
        Ok(markdown) => markdown,
        Err(ConversionError::PlainTextOnly { .. }) if !options.plain_text_fallback => {
            warn!("No HTML or tabular data found, converting lines to paragraphs");
            let fallback = options.clone().with_plain_text_fallback(true);
            clipmark::convert_clipboard_to_markdown(&payload, &fallback)?
        }
        Err(e) => return Err(e.into()),
    };

    write_stdout(&markdown)
}

fn to_rich_text(input: Option<PathBuf>) -> Result<()> {
    let markdown = match input {
        Some(path) => read_file(&path)?,
        None => read_stdin()?,
    };
    if markdown.trim().is_empty() {
        return Err(ConversionError::EmptyClipboard.into());
    }
    write_stdout(&clipmark::markdown_to_rich_text(&markdown))
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match opts.command {
        Command::ToMarkdown {
            html,
            text,
            plain,
            config,
        } => to_markdown(html, text, plain, config),
        Command::ToRichText { input } => to_rich_text(input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("clipmark: {e:#}");
            ExitCode::FAILURE
        }
    }
}
