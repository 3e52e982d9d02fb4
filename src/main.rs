use log2::*;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use wiki_word_freq::config::{Command, Config};
use wiki_word_freq::frequency::{count_words, WordFrequencyTable};
use wiki_word_freq::{api, crawler};

/// Indicates start time of a project, lazily initialized
pub static START_TIME: once_cell::sync::Lazy<Instant> = once_cell::sync::Lazy::new(Instant::now);

/// Prints the table as JSON or writes it to `output_file`
fn emit(table: &WordFrequencyTable, output_file: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(table)?;
    match output_file {
        Some(path) => {
            std::fs::write(path, json)?;
            info!("Result written to {:?}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = *START_TIME;
    let cfg = Config::new();
    cfg.validate()?;
    let _log2 = stdout()
        .module(true) // include module name
        .module_with_line(true) // include line number from module
        .module_filter(|module| module.starts_with("wiki_word_freq"))
        .compress(false)
        .level(cfg.log_level.to_string())
        .start();

    let source = crawler::WikipediaSource::new(Url::parse(&cfg.api_url)?, &cfg.user_agent)?
        .with_request_timeout(cfg.request_timeout);
    let mut crawler_config = crawler::CrawlerConfig::new().with_concurrency(cfg.concurrency);
    if let Some(max_depth) = cfg.max_depth {
        crawler_config = crawler_config.with_max_depth(max_depth);
    }
    let crawler_config = Arc::new(crawler_config);
    let crawler = Arc::new(crawler::Crawler::new(Arc::new(source), crawler_config));

    match cfg.command {
        Command::Serve { host, port } => {
            let address = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&address).await?;
            info!("Listening on http://{}", address);
            axum::serve(listener, api::router(api::AppState::new(crawler))).await?;
        }
        Command::WordFrequency { article, depth } => {
            let texts = crawler.collect_document_texts(&article, depth).await?;
            let table = count_words(&texts, None);
            debug!("Counted {} distinct words in {} articles", table.len(), texts.len());
            emit(&table, cfg.output_file.as_deref())?;
        }
        Command::Keywords { article, depth, ignore, percentile } => {
            let texts = crawler.collect_document_texts(&article, depth).await?;
            let table = count_words(&texts, Some(ignore.as_slice())).filter_by_percentile(percentile);
            debug!("{} words above {}%", table.len(), percentile);
            emit(&table, cfg.output_file.as_deref())?;
        }
    }

    info!("Finished in {:?}", START_TIME.elapsed());
    Ok(())
}
