//! Headless-browser printing of rendered report HTML.
//!
//! Every job gets a fresh browser with its own profile directory.  The page content is set
//! directly, the job waits for web fonts and images to settle, and Chrome's print-to-PDF produces
//! an A4 document with the letterhead header and footer templates.  The browser is closed on
//! every path, including timeouts.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use futures::future::BoxFuture;
use futures::StreamExt;
use report_pdf::html::{print_footer_template, print_header_template};
use report_pdf::Letterhead;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

/// A4 in inches, as expected by `Page.printToPDF`.
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.7;
/// Leaves room for the header and footer templates.
const VERTICAL_MARGIN_IN: f64 = 0.75;
const HORIZONTAL_MARGIN_IN: f64 = 0.5;

/// Resolves once web fonts are ready and every image has either loaded or failed.
const WAIT_FOR_ASSETS: &str = r#"(async () => {
    if (document.fonts && document.fonts.ready) {
        await document.fonts.ready;
    }
    const pending = Array.from(document.images)
        .filter((img) => !img.complete)
        .map((img) => new Promise((resolve) => {
            img.addEventListener('load', resolve, { once: true });
            img.addEventListener('error', resolve, { once: true });
        }));
    await Promise.all(pending);
    return document.images.length;
})()"#;

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("Browser could not be started: {0}")]
    Launch(String),
    #[error("Print job timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("Browser failed to print: {0}")]
    Browser(String),
}

/// A standalone HTML page to print.
#[derive(Clone, Debug, PartialEq)]
pub struct PrintJob {
    pub html: String,
    pub title: String,
    pub header_template: Option<String>,
    pub footer_template: Option<String>,
}

impl PrintJob {
    pub fn new(html: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            title: title.into(),
            header_template: None,
            footer_template: None,
        }
    }

    /// Adds the company header and the `Page N of M` footer.
    pub fn with_letterhead(mut self, letterhead: &Letterhead) -> Self {
        self.header_template = Some(print_header_template(letterhead, &self.title));
        self.footer_template = Some(print_footer_template(letterhead));
        self
    }

    fn pdf_params(&self) -> PrintToPdfParams {
        let decorated = self.header_template.is_some() || self.footer_template.is_some();
        PrintToPdfParams {
            print_background: Some(true),
            display_header_footer: Some(decorated),
            // An empty template would fall back to Chrome's default date and URL line.
            header_template: Some(
                self.header_template
                    .clone()
                    .unwrap_or_else(|| "<span></span>".to_string()),
            ),
            footer_template: Some(
                self.footer_template
                    .clone()
                    .unwrap_or_else(|| "<span></span>".to_string()),
            ),
            paper_width: Some(A4_WIDTH_IN),
            paper_height: Some(A4_HEIGHT_IN),
            margin_top: Some(VERTICAL_MARGIN_IN),
            margin_bottom: Some(VERTICAL_MARGIN_IN),
            margin_left: Some(HORIZONTAL_MARGIN_IN),
            margin_right: Some(HORIZONTAL_MARGIN_IN),
            ..Default::default()
        }
    }
}

/// Turns HTML into PDF bytes.
pub trait HtmlPrinter: Send + Sync {
    fn print<'a>(&'a self, job: &'a PrintJob) -> BoxFuture<'a, Result<Vec<u8>, PrintError>>;
}

/// Prints through a locally installed Chrome or Chromium.
#[derive(Clone, Debug)]
pub struct ChromePrinter {
    executable: Option<PathBuf>,
    timeout: Duration,
    profile_root: PathBuf,
}

struct RunningBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

fn profile_dir(root: &Path) -> PathBuf {
    static NEXT_PROFILE: AtomicU64 = AtomicU64::new(0);
    let id = NEXT_PROFILE.fetch_add(1, Ordering::SeqCst);
    root.join(format!(
        "inspection-print-{}-{}",
        std::process::id(),
        id
    ))
}

impl ChromePrinter {
    pub fn new(executable: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            executable,
            timeout,
            profile_root: std::env::temp_dir(),
        }
    }

    /// Directory under which per-job browser profiles are created.
    pub fn with_profile_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.profile_root = root.into();
        self
    }

    async fn launch(&self, profile: &Path) -> Result<RunningBrowser, PrintError> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile)
            .arg("--font-render-hinting=none");
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(PrintError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| PrintError::Launch(err.to_string()))?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!("Browser handler event error: {:?}", err);
                }
            }
        });

        Ok(RunningBrowser { browser, handler })
    }

    async fn render(browser: &Browser, job: &PrintJob) -> Result<Vec<u8>, PrintError> {
        let failed = |err: chromiumoxide::error::CdpError| PrintError::Browser(err.to_string());

        let page = browser.new_page("about:blank").await.map_err(failed)?;
        page.set_content(job.html.as_str()).await.map_err(failed)?;

        let wait = EvaluateParams::builder()
            .expression(WAIT_FOR_ASSETS)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(PrintError::Browser)?;
        let images = page.evaluate_expression(wait).await.map_err(failed)?;
        debug!(
            "Assets settled for '{}' ({} images)",
            job.title,
            images.into_value::<u64>().unwrap_or_default()
        );

        let bytes = page.pdf(job.pdf_params()).await.map_err(failed)?;
        if let Err(err) = page.close().await {
            debug!("Closing print page failed: {}", err);
        }
        Ok(bytes)
    }

    async fn shutdown(running: RunningBrowser) {
        let RunningBrowser {
            mut browser,
            handler,
        } = running;
        if let Err(err) = browser.close().await {
            warn!("Closing browser failed: {}", err);
        }
        if let Err(err) = browser.wait().await {
            warn!("Waiting for browser exit failed: {}", err);
        }
        handler.abort();
    }

    async fn remove_profile(profile: &Path) {
        match tokio::fs::remove_dir_all(profile).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => debug!("Removing browser profile {} failed: {}", profile.display(), err),
        }
    }

    async fn print_job(&self, job: &PrintJob) -> Result<Vec<u8>, PrintError> {
        let profile = profile_dir(&self.profile_root);
        let deadline = Instant::now() + self.timeout;

        // A launch cut short by the deadline drops the browser child, which kills it.
        let launched = match timeout_at(deadline, self.launch(&profile)).await {
            Ok(launched) => launched,
            Err(_) => Err(PrintError::Timeout(self.timeout)),
        };
        let running = match launched {
            Ok(running) => running,
            Err(err) => {
                Self::remove_profile(&profile).await;
                return Err(err);
            }
        };

        let result = match timeout_at(deadline, Self::render(&running.browser, job)).await {
            Ok(result) => result,
            Err(_) => Err(PrintError::Timeout(self.timeout)),
        };
        Self::shutdown(running).await;
        Self::remove_profile(&profile).await;

        if let Ok(bytes) = &result {
            info!("Printed '{}' ({} bytes)", job.title, bytes.len());
        }
        result
    }
}

impl HtmlPrinter for ChromePrinter {
    fn print<'a>(&'a self, job: &'a PrintJob) -> BoxFuture<'a, Result<Vec<u8>, PrintError>> {
        Box::pin(self.print_job(job))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letterhead_jobs_print_header_and_footer() {
        let job = PrintJob::new("<p>hi</p>", "Parapet Inspection Report")
            .with_letterhead(&Letterhead::default());
        let params = job.pdf_params();

        assert_eq!(params.display_header_footer, Some(true));
        assert_eq!(params.print_background, Some(true));
        assert_eq!(params.paper_width, Some(A4_WIDTH_IN));
        let footer = params.footer_template.unwrap_or_default();
        assert!(footer.contains("pageNumber"));
        assert!(footer.contains("totalPages"));
        let header = params.header_template.unwrap_or_default();
        assert!(header.contains("Parapet Inspection Report"));
    }

    #[test]
    fn plain_jobs_have_no_decorations() {
        let params = PrintJob::new("<p>hi</p>", "Untitled").pdf_params();
        assert_eq!(params.display_header_footer, Some(false));
    }

    #[test]
    fn profiles_are_unique() {
        let root = std::env::temp_dir();
        assert_ne!(profile_dir(&root), profile_dir(&root));
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn failed_launch_leaves_no_profile_behind() {
        let root = scratch_dir("inspection-print-missing");
        let printer = ChromePrinter::new(Some(root.join("no-such-chrome")), Duration::from_secs(5))
            .with_profile_root(root.join("profiles"));

        let result = printer.print_job(&PrintJob::new("<p>hi</p>", "Untitled")).await;
        assert!(matches!(result, Err(PrintError::Launch(_))));
        assert!(!root.join("profiles").exists());
        std::fs::remove_dir_all(root).ok();
    }

    /// A fake browser that creates its profile directory and never answers.
    #[cfg(unix)]
    #[tokio::test]
    async fn launch_timeout_removes_the_profile() {
        use std::os::unix::fs::PermissionsExt;

        let root = scratch_dir("inspection-print-stalled");
        let script = root.join("stalled-chrome");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             for arg in \"$@\"; do\n\
               case \"$arg\" in --user-data-dir=*) mkdir -p \"${arg#--user-data-dir=}\" ;; esac\n\
             done\n\
             exec sleep 30\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let profiles = root.join("profiles");
        std::fs::create_dir_all(&profiles).unwrap();
        let printer = ChromePrinter::new(Some(script), Duration::from_millis(500))
            .with_profile_root(&profiles);

        let result = printer.print_job(&PrintJob::new("<p>hi</p>", "Untitled")).await;
        assert!(matches!(result, Err(PrintError::Timeout(_))));
        assert_eq!(std::fs::read_dir(&profiles).unwrap().count(), 0);
        std::fs::remove_dir_all(root).ok();
    }
}
