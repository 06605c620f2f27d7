//! Entry point for the interlinear reader.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments and load `conf/config.toml`.
//! - Load the document and translate its first sentences.
//! - Open a reader session and hand it to the terminal host loop.

mod app;

use crate::app::{Message, OutputMode, run_app};
use anyhow::{Context, Result, anyhow, bail};
use interlinear_core::cache::{load_bookmark, load_display_params};
use interlinear_core::cancellation::CancellationToken;
use interlinear_core::config::{AppConfig, load_config};
use interlinear_core::document_loader::{DocumentContent, load_document};
use interlinear_core::feed::{FeedHandle, translate_initial};
use interlinear_core::measure::WrappingMeasurer;
use interlinear_core::text_utils::flatten_paragraphs;
use interlinear_core::translator::{ProcessTranslator, Translator};
use interlinear_core::{ReaderSession, SentencePair};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";

struct Args {
    config_path: PathBuf,
    output: OutputMode,
    document: PathBuf,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let mut config = load_config(&args.config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %args.document.display(),
        level = %config.log_level,
        "Starting interlinear reader"
    );

    let cache_root = config.cache_root();
    if let Some(params) = load_display_params(&cache_root, &args.document) {
        info!(
            font_size = params.font_size,
            margin = params.margin,
            "Loaded per-document display overrides from cache"
        );
        config.set_display_params(params);
    }

    let (tx, rx) = mpsc::channel();
    let interrupt = CancellationToken::new();
    {
        let tx = tx.clone();
        let interrupt = interrupt.clone();
        if let Err(err) = ctrlc::set_handler(move || {
            info!("Received Ctrl+C; stopping reader");
            interrupt.cancel();
            let _ = tx.send(Message::Interrupted);
        }) {
            warn!("Failed to install Ctrl+C signal handler: {err}");
        }
    }

    let document = load_document(&args.document)?.require_content()?;
    let mut session = match document.content {
        DocumentContent::Paired(pairs) => open_session(&document.name, pairs, 0, &config),
        DocumentContent::Sentences(paragraphs) => {
            let sentences = flatten_paragraphs(paragraphs);
            let translator = spawn_translator(&config)?;
            let sizes = config.feed_sizes();
            let initial = translate_initial(translator.as_ref(), &sentences, sizes)
                .context("Failed to translate the opening sentences")?;
            interrupt.check_cancelled("initial_translate")?;

            let start_idx = initial.len();
            let total = sentences.len();
            let mut session = open_session(&document.name, initial, total, &config);
            if start_idx < total {
                info!(
                    remaining = total - start_idx,
                    batch = sizes.background,
                    "Starting background translation"
                );
                session.attach_feed(FeedHandle::spawn(translator, sentences, start_idx, sizes));
            }
            session
        }
    };

    if let Some(bookmark) = load_bookmark(&cache_root, &args.document) {
        info!(page = bookmark.page, "Resuming from cached page");
        session.restore_bookmark(&bookmark);
    }

    run_app(session, config, args.document, args.output, tx, rx)
        .context("Reader loop failed")?;
    Ok(())
}

fn open_session(
    name: &str,
    pairs: Vec<SentencePair>,
    total: usize,
    config: &AppConfig,
) -> ReaderSession {
    ReaderSession::open(
        name,
        pairs,
        total,
        config.display_params(),
        config.viewport(),
        Arc::new(WrappingMeasurer::default()),
        config.resize_window(),
    )
}

fn spawn_translator(config: &AppConfig) -> Result<Arc<dyn Translator>> {
    if config.translator_command.is_empty() {
        bail!(
            "No translator configured; set [translation].command in the config \
             or open a pre-paired .json file"
        );
    }
    let translator = ProcessTranslator::spawn(&config.translator_command)
        .context("Failed to start the translator worker")?;
    Ok(Arc::new(translator))
}

fn usage() -> anyhow::Error {
    anyhow!("Usage: interlinear-reader [--config PATH] [--json] <document>")
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut output = OutputMode::Text;
    let mut document = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = PathBuf::from(args.next().ok_or_else(usage)?);
            }
            "--json" => output = OutputMode::Json,
            flag if flag.starts_with("--") => return Err(usage()),
            _ if document.is_none() => document = Some(PathBuf::from(&arg)),
            _ => return Err(usage()),
        }
    }

    let document = document.ok_or_else(usage)?;
    if !Path::new(&document).exists() {
        return Err(anyhow!("File not found: {}", document.display()));
    }
    Ok(Args {
        config_path,
        output,
        document,
    })
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
