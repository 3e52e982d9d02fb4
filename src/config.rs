use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::crawler::{DEFAULT_API_URL, DEFAULT_USER_AGENT};

/// Log levels as defined in log2 crate
#[derive(Debug, Serialize, Deserialize, Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// This struct receives all program arguments while CrawlerConfig
/// describes only the crawler
#[derive(Parser, Debug, Serialize, Deserialize)]
#[command(author, version, about = "Word frequencies of Wikipedia articles and their neighbours", long_about = None)]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,
    /// MediaWiki action API endpoint
    #[arg(long, global = true, default_value = DEFAULT_API_URL)]
    pub api_url: String,
    /// User-Agent sent with every request
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
    /// Timeout of a single request in seconds
    #[arg(long, global = true, default_value = "10")]
    pub request_timeout: u64,
    /// Number of articles fetched at the same time within one depth level
    #[arg(long, global = true, default_value = "4")]
    pub concurrency: usize,
    /// Largest depth a query may ask for, unlimited when unset
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,
    /// Write the JSON result here instead of stdout
    #[arg(short, long, global = true)]
    pub output_file: Option<PathBuf>,
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", value_enum)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug, Serialize, Deserialize)]
pub enum Command {
    /// Serve `GET /word-frequency` and `POST /keywords`
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },
    /// Count words of an article and everything within `depth` links of it
    WordFrequency {
        /// Title of the root article
        #[arg(short, long)]
        article: String,
        #[arg(short, long, default_value = "0")]
        depth: usize,
    },
    /// Like word-frequency, minus ignored words, keeping only frequent ones
    Keywords {
        /// Title of the root article
        #[arg(short, long)]
        article: String,
        #[arg(short, long, default_value = "0")]
        depth: usize,
        /// Comma separated words left out of the count
        #[arg(short, long, value_delimiter = ',')]
        ignore: Vec<String>,
        /// Keep words whose percentage is above this
        #[arg(short, long, default_value = "0")]
        percentile: f64,
    },
}

impl Config {
    pub fn new() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be greater than 0");
        }
        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }
        if let Err(e) = Url::parse(&self.api_url) {
            anyhow::bail!("api_url '{}' is not a valid URL: {}", self.api_url, e);
        }
        Ok(())
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", s)
    }
}
