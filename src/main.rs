mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use ec2g_site::carousel::Slide;
use ec2g_site::config::SiteConfig;
use ec2g_site::content::ContentRecord;
use ec2g_site::countdown::{parse_deadline, Countdown, CountdownHandle, SystemClock};
use ec2g_site::page::Page;
use ec2g_site::publications::PublicationsWidget;
use ec2g_site::render::{strip_tags, StdoutTarget};
use ec2g_site::{logging, validator, Site};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.debug);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = SiteConfig::load(cli.config.as_deref())?;
    let content = match &cli.content {
        Some(path) => ContentRecord::load(path)?,
        None => ContentRecord::bundled()?,
    };
    let site = Site::new(config, content)?;

    match cli.command {
        Commands::News { limit } => {
            let limit = limit.unwrap_or(site.config().carousel.max_slides);
            for item in site.content().recent_news(limit) {
                let slide = Slide::from(item);
                println!("{}  {}", item.date, item.title);
                println!("    {}", strip_tags(&slide.content));
            }
        }
        Commands::Countdown { target } => {
            let deadline = match target {
                Some(raw) => parse_deadline(&raw, site.config().countdown.offset())
                    .with_context(|| format!("cannot parse countdown target: {raw}"))
                    .map(Some)?,
                None => site.countdown_deadline(),
            };
            let countdown = Countdown::new(StdoutTarget::inline(), deadline);
            let mut handle = CountdownHandle::start(countdown, Arc::new(SystemClock), site.config().countdown.tick())?;
            tokio::select! {
                _ = handle.finished() => {}
                _ = tokio::signal::ctrl_c() => {}
            }
            println!();
        }
        Commands::Publications { orcid } => {
            let mut widget = PublicationsWidget::new(StdoutTarget::new(), orcid, site.config().publications.limit);
            widget.load(site.works().as_ref()).await;
        }
        Commands::Render { page, out } => {
            let mut doc = Page::load(&page)?;
            let booted = site.boot(&mut doc).await;
            for line in doc.summary() { println!("{line}"); }
            if let Some(out) = out {
                tokio::fs::write(&out, doc.html()).await.with_context(|| format!("writing {}", out.display()))?;
                tracing::info!(path = %out.display(), "wrote page");
            }
            drop(booted);
        }
        Commands::Validate { root, no_color } => {
            let report = validator::validate(&root, &site.config().validator);
            report.print(&mut std::io::stdout().lock(), !no_color)?;
            if !report.passed() { return Ok(ExitCode::FAILURE); }
        }
        Commands::Content => {
            let c = site.content();
            println!("{} ({})", c.site.name, c.site.institution);
            println!("  navigation: {} link(s)", c.navigation.len());
            println!("  news: {}, events: {}, videos: {}, network: {}", c.news.len(), c.events.len(), c.videos.len(), c.network.len());
            for (category, people) in c.staff.iter() {
                println!("  staff/{category}: {}", people.len());
            }
            for id in c.duplicate_ids() {
                tracing::warn!(id = %id, "duplicate id in content record");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
