use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bibdraft_core::config_file::{self, ConfigFile};
use bibdraft_core::{
    Extracted, PaperDraft, Pipeline, Preferences, Source, StatusEvent, StatusSink, WebContent,
};
use bibdraft_pdf_mupdf::MupdfBackend;

mod output;

use output::ColorMode;

/// Bibliographic draft extractor - Turn PDFs and paper web pages into reference drafts
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Give up on the extraction after this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Library root that relative PDF paths are resolved against
    #[arg(long, global = true)]
    lib_folder: Option<PathBuf>,

    /// Comma-separated list of web importers to disable
    #[arg(long, global = true, value_delimiter = ',')]
    disable_importers: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a draft from the first page of a PDF
    Pdf {
        /// PDF path, absolute or relative to the library root
        path: String,
    },

    /// Fetch a web page and run the web importers on it
    Web {
        /// URL of the paper's page
        url: String,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let prefs = resolve_preferences(cli.lib_folder, cli.disable_importers);
    let color = ColorMode(!cli.no_color);
    let timeout = cli.timeout.map(Duration::from_secs);

    match cli.command {
        Command::Config => print_config(&prefs),
        Command::Pdf { path } => with_timeout(timeout, extract_pdf(prefs, path, color)).await,
        Command::Web { url } => {
            let matched = with_timeout(timeout, extract_web(prefs, url, color)).await?;
            if !matched {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// CLI flags > env vars > config file > defaults.
fn resolve_preferences(lib_folder: Option<PathBuf>, disable_importers: Vec<String>) -> Preferences {
    let mut prefs = config_file::load_config().to_preferences();

    let lib_folder =
        lib_folder.or_else(|| std::env::var("BIBDRAFT_LIB_FOLDER").ok().map(PathBuf::from));
    if let Some(folder) = lib_folder {
        prefs.app_lib_folder = folder;
    }

    for name in disable_importers {
        let name = name.trim().to_string();
        if !name.is_empty() && prefs.importer_enabled(&name) {
            prefs.disabled_importers.push(name);
        }
    }

    prefs
}

async fn with_timeout<T>(
    timeout: Option<Duration>,
    fut: impl std::future::Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .with_context(|| format!("extraction timed out after {}s", limit.as_secs()))?,
        None => fut.await,
    }
}

fn print_config(prefs: &Preferences) -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(&ConfigFile::from_preferences(prefs))?;
    print!("{}", rendered);
    if let Some(path) = config_file::config_path() {
        eprintln!("# config file: {}", path.display());
    }
    Ok(())
}

/// Status events go to stderr so stdout stays valid JSON.
fn status_sink(color: ColorMode) -> StatusSink {
    let writer: Arc<Mutex<Box<dyn Write + Send>>> =
        Arc::new(Mutex::new(Box::new(std::io::stderr())));
    Arc::new(move |event: StatusEvent| {
        if let Ok(mut w) = writer.lock() {
            let _ = output::print_status(&mut *w, &event, color);
            let _ = w.flush();
        }
    })
}

fn build_pipeline(prefs: Preferences, color: ColorMode) -> anyhow::Result<Pipeline> {
    Pipeline::new(Arc::new(prefs), Arc::new(MupdfBackend::new()), status_sink(color))
        .context("failed to build extraction pipeline")
}

async fn extract_pdf(prefs: Preferences, path: String, color: ColorMode) -> anyhow::Result<()> {
    let lib_folder = prefs.app_lib_folder.clone();
    let pipeline = build_pipeline(prefs, color)?;

    let draft = PaperDraft::with_main_url(path.as_str());
    let extracted = pipeline
        .extract(Source::Pdf(draft.clone()))
        .await
        .with_context(|| format!("failed to extract from {}", path))?;

    let result = extracted.into_draft().unwrap_or_else(|| draft.clone());
    if result == draft {
        output::print_notice(
            &mut std::io::stderr(),
            &output::unchanged_pdf_notice(&path, &lib_folder),
            color,
        )?;
    }

    output::print_draft(&mut std::io::stdout(), &result)
}

async fn extract_web(prefs: Preferences, url: String, color: ColorMode) -> anyhow::Result<bool> {
    let client = prefs.http_client()?;
    let pipeline = build_pipeline(prefs, color)?;

    tracing::debug!(url = %url, "fetching page");
    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("failed to fetch {}", url))?;
    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("HTTP {} from {}", status.as_u16(), url);
    }

    // Redirects may have moved us; importers gate on where the page lives
    let final_url = response.url().to_string();
    let document = response.text().await?;

    let content = WebContent::new(final_url, document);
    match pipeline.extract(Source::Web(content)).await? {
        Extracted::Draft(draft) => {
            output::print_draft(&mut std::io::stdout(), &draft)?;
            Ok(true)
        }
        Extracted::NoMatch => {
            output::print_notice(
                &mut std::io::stderr(),
                &format!("No web importer matched {}", url),
                color,
            )?;
            Ok(false)
        }
    }
}
