//! Command-line and environment configuration for the service.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use report_pdf::{ImageSource, Letterhead};

/// Settings for `inspections serve`.
#[derive(Args, Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to
    #[arg(long, env = "INSPECTIONS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "INSPECTIONS_PORT", default_value = "8080")]
    pub port: u16,

    /// SQLite database, created on first start
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://inspections.db")]
    pub database_url: String,

    /// Upper bound for a single browser print job, launch included
    #[arg(long, env = "INSPECTIONS_PRINT_TIMEOUT_MS", default_value = "30000")]
    pub print_timeout_ms: u64,

    /// Largest accepted request body in megabytes; photos travel inline as base64
    #[arg(long, env = "INSPECTIONS_MAX_BODY_MB", default_value = "25")]
    pub max_body_mb: usize,

    /// Chrome or Chromium executable; detected automatically when omitted
    #[arg(long, env = "INSPECTIONS_CHROME")]
    pub chrome: Option<PathBuf>,

    #[command(flatten)]
    pub letterhead: LetterheadConfig,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn print_timeout(&self) -> Duration {
        Duration::from_millis(self.print_timeout_ms)
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_mb.saturating_mul(1024 * 1024)
    }
}

/// Company details printed on every page.
#[derive(Args, Clone, Debug, Default)]
pub struct LetterheadConfig {
    #[arg(long, env = "INSPECTIONS_COMPANY_NAME")]
    pub company_name: Option<String>,

    /// Address lines separated by `|`
    #[arg(long, env = "INSPECTIONS_COMPANY_ADDRESS", value_delimiter = '|')]
    pub company_address: Vec<String>,

    #[arg(long, env = "INSPECTIONS_COMPANY_PHONE")]
    pub company_phone: Option<String>,

    #[arg(long, env = "INSPECTIONS_COMPANY_EMAIL")]
    pub company_email: Option<String>,

    #[arg(long, env = "INSPECTIONS_COMPANY_WEBSITE")]
    pub company_website: Option<String>,

    #[arg(long, env = "INSPECTIONS_COMPANY_TAGLINE")]
    pub company_tagline: Option<String>,

    /// Logo image (PNG or JPEG)
    #[arg(long, env = "INSPECTIONS_LOGO")]
    pub logo: Option<String>,
}

impl LetterheadConfig {
    pub fn letterhead(&self) -> Letterhead {
        let base = match &self.company_name {
            Some(name) if !name.trim().is_empty() => Letterhead::new(name.trim()),
            _ => Letterhead::default(),
        };
        self.company_address
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .fold(base, |letterhead, line| letterhead.with_address_line(line))
            .with_phone(self.company_phone.clone())
            .with_email(self.company_email.clone())
            .with_website(self.company_website.clone())
            .with_tagline(self.company_tagline.clone())
            .with_logo(self.logo.clone().map(ImageSource::Path))
    }
}
