use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use inspection_server::routes::export::file_name;
use inspection_server::{router, AppState, LetterheadConfig, ServerConfig};
use inspections::{samples, Report, ReportKind};
use report_pdf::html::HtmlRenderer;
use report_pdf::{Letterhead, PdfBuilder, RenderedPdf};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

const DEFAULT_FILTER: &str = "inspection_server=info,inspections=info,report_pdf=info,tower_http=debug";

/// Building-inspection reports: REST service, local rendering and PDF export.
///
/// Settings are read from flags, the environment, or a `.env` file in the working directory.
/// Fonts are located through `INSPECTION_FONTS_DIR` or the usual system font directories.
#[derive(Parser)]
#[command(name = "inspections", author, version, about)]
struct Cli {
    /// Enable debug logging for every crate.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST service.
    Serve(ServerConfig),

    /// Render a JSON report record to PDF.
    Render(RenderArgs),

    /// Render a JSON report record to the standalone HTML view.
    Html(HtmlArgs),

    /// Download the PDF of a stored report from a running service.
    Export(ExportArgs),

    /// Render every built-in sample report as PDF and HTML.
    Samples(SamplesArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Report kind, e.g. `parapet` or `daily-field`.
    #[arg(short, long)]
    kind: ReportKind,

    /// JSON record to render.
    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long, default_value = "report.pdf")]
    output: PathBuf,

    /// Add one PDF bookmark per section.
    #[arg(long)]
    bookmarks: bool,

    /// Reference printed under the title.
    #[arg(long)]
    reference: Option<String>,

    #[command(flatten)]
    letterhead: LetterheadConfig,
}

#[derive(Args)]
struct HtmlArgs {
    #[arg(short, long)]
    kind: ReportKind,

    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long, default_value = "report.html")]
    output: PathBuf,

    #[command(flatten)]
    letterhead: LetterheadConfig,
}

#[derive(Args)]
struct ExportArgs {
    /// Base URL of the running service.
    #[arg(long, env = "INSPECTIONS_URL", default_value = "http://127.0.0.1:8080")]
    url: String,

    #[arg(short, long)]
    kind: ReportKind,

    #[arg(long)]
    id: Uuid,

    /// Defaults to `<kind>-<id>.pdf` in the working directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, default_value = "120")]
    timeout_secs: u64,
}

#[derive(Args)]
struct SamplesArgs {
    #[arg(short, long, default_value = "target/samples")]
    output_dir: PathBuf,

    #[command(flatten)]
    letterhead: LetterheadConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err).context("loading .env");
        }
    }
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Serve(config) => serve(config).await,
        Commands::Render(args) => render(args),
        Commands::Html(args) => html(args),
        Commands::Export(args) => export(args).await,
        Commands::Samples(args) => render_samples(args),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config
        .socket_addr()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let state = AppState::from_config(&config)
        .await
        .with_context(|| format!("opening report store {}", config.database_url))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);
    info!("Print timeout: {}ms", config.print_timeout_ms);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

fn load_report(kind: ReportKind, input: &Path) -> anyhow::Result<Report> {
    let body =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let report = Report::from_json_str(kind, &body)?;
    report
        .validate()
        .with_context(|| format!("{} is not a valid {} report", input.display(), kind))?;
    Ok(report)
}

fn render_pdf(
    report: &Report,
    letterhead: Letterhead,
    reference: Option<&str>,
    bookmarks: bool,
) -> anyhow::Result<RenderedPdf> {
    let builder = PdfBuilder::new(report.document(reference)?).with_letterhead(letterhead);
    let rendered = if bookmarks {
        builder.render_with_bookmarks()
    } else {
        builder.render()
    };
    rendered.map_err(|err| anyhow!("rendering {} report: {}", report.kind(), err))
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn render(args: RenderArgs) -> anyhow::Result<()> {
    let report = load_report(args.kind, &args.input)?;
    let rendered = render_pdf(
        &report,
        args.letterhead.letterhead(),
        args.reference.as_deref(),
        args.bookmarks,
    )?;
    write_output(&args.output, &rendered.bytes)?;
    info!(
        "Wrote {} ({} pages)",
        args.output.display(),
        rendered.page_count
    );
    Ok(())
}

fn html(args: HtmlArgs) -> anyhow::Result<()> {
    let report = load_report(args.kind, &args.input)?;
    let markup = HtmlRenderer::new()
        .with_letterhead(args.letterhead.letterhead())
        .render(&report.document(None)?)
        .with_context(|| format!("rendering {} report", args.kind))?;
    write_output(&args.output, markup.as_bytes())?;
    info!("Wrote {}", args.output.display());
    Ok(())
}

async fn export(args: ExportArgs) -> anyhow::Result<()> {
    let url = format!(
        "{}/api/reports/{}/{}/pdf",
        args.url.trim_end_matches('/'),
        args.kind.slug(),
        args.id
    );
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()?;
    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("requesting {}", url))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body["error"].as_str().map(str::to_string))
            .unwrap_or_else(|| status.to_string());
        bail!("export of {} report {} failed: {}", args.kind, args.id, detail);
    }

    let bytes = response.bytes().await.context("reading PDF response")?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(file_name(args.kind, args.id)));
    write_output(&output, &bytes)?;
    info!("Saved {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}

fn render_samples(args: SamplesArgs) -> anyhow::Result<()> {
    let letterhead = args.letterhead.letterhead();
    let renderer = HtmlRenderer::new().with_letterhead(letterhead.clone());

    for report in samples::all() {
        let slug = report.kind().slug();
        let rendered = render_pdf(&report, letterhead.clone(), Some("SAMPLE"), true)?;
        write_output(&args.output_dir.join(format!("{}.pdf", slug)), &rendered.bytes)?;

        let markup = renderer
            .render(&report.document(Some("SAMPLE"))?)
            .with_context(|| format!("rendering {} sample", slug))?;
        write_output(&args.output_dir.join(format!("{}.html", slug)), markup.as_bytes())?;
        info!("Rendered {} sample ({} pages)", slug, rendered.page_count);
    }

    info!("Samples written to {}", args.output_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_parses_kind_slugs() {
        let cli = Cli::parse_from([
            "inspections",
            "render",
            "--kind",
            "daily-field",
            "--input",
            "daily.json",
            "--bookmarks",
        ]);
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.kind, ReportKind::DailyField);
                assert_eq!(args.output, PathBuf::from("report.pdf"));
                assert!(args.bookmarks);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn unknown_kinds_are_rejected() {
        let result = Cli::try_parse_from([
            "inspections",
            "html",
            "--kind",
            "roofing",
            "--input",
            "x.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn report_files_round_trip_through_load() {
        let dir = std::env::temp_dir().join(format!("inspections-cli-{}", std::process::id()));
        let path = dir.join("concrete.json");
        let report = samples::sample(ReportKind::Concrete);
        write_output(&path, report.to_json().unwrap().to_string().as_bytes()).unwrap();

        let loaded = load_report(ReportKind::Concrete, &path).unwrap();
        assert_eq!(loaded, report);
        fs::remove_dir_all(dir).ok();
    }
}
