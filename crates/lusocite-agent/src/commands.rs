//! Subcommand handlers. Each one opens what it needs, runs one pipeline
//! step and prints a short summary on stdout.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context as _};
use console::style;
use lusocite_affiliation::{classify_records, TerminalResolver};
use lusocite_common::resolver::{Unattended, UnknownResolver};
use lusocite_common::sandbox::SandboxClient;
use lusocite_graph::gexf::write_gexf;
use lusocite_graph::{classify_citers, per_year, CitationGraph};
use lusocite_ingestion::models::{OrcidSection, Publication};
use lusocite_ingestion::sources::OrcidCredentials;
use lusocite_ingestion::{authors, citations, conference, language, Caches, Context, Registries};
use tracing::info;

use crate::config::Config;

pub fn registries(config: &Config) -> anyhow::Result<Registries> {
    let client = SandboxClient::new(
        &config.http.full_user_agent(),
        config.http.timeout_secs.map(Duration::from_secs),
    )?;
    let credentials = OrcidCredentials {
        client_id:     config.orcid.client_id.clone(),
        client_secret: config.orcid.client_secret.clone(),
        sandbox:       config.orcid.sandbox,
    };
    if credentials.client_id.is_none() {
        info!("No ORCID client credentials, using anonymous public API access");
    }
    Ok(Registries::http(client, credentials))
}

fn resolver(interactive: bool) -> Box<dyn UnknownResolver + Send> {
    if interactive {
        Box::new(TerminalResolver::new())
    } else {
        Box::new(Unattended)
    }
}

pub fn open_context(config: &Config, interactive: bool) -> anyhow::Result<Context> {
    let caches = Caches::open(&config.storage.data_dir)?;
    Ok(Context::new(caches, registries(config)?, resolver(interactive)))
}

async fn snapshot(
    config: &Config,
    registries: &Registries,
    alias: &str,
    force: bool,
) -> anyhow::Result<Vec<Publication>> {
    let model = language::load_model(&config.language.backend, &config.language.fasttext_model)?;
    conference::load(&config.storage.conferences_dir, registries.dblp.as_ref(), model.as_ref(), alias, force)
        .await?
        .with_context(|| format!("download of conference {alias} failed, see the log"))
}

fn of_year(publications: &[Publication], year: Option<&str>) -> Vec<Publication> {
    conference::of_year(publications, year).cloned().collect()
}

fn heading(text: &str) {
    println!("{}", style(text).bold().underlined());
}

// ── download ────────────────────────────────────────────────────────────────

pub async fn download(config: &Config, alias: &str, force: bool) -> anyhow::Result<()> {
    let registries = registries(config)?;
    let publications = snapshot(config, &registries, alias, force).await?;
    let path = conference::snapshot_path(&config.storage.conferences_dir, alias);
    println!("{alias}: {} publications in {}", publications.len(), path.display());
    Ok(())
}

// ── authors ─────────────────────────────────────────────────────────────────

pub async fn authors(config: &Config, alias: &str) -> anyhow::Result<()> {
    let registries = registries(config)?;
    let publications = snapshot(config, &registries, alias, false).await?;
    let mut directory = authors::open_directory(&config.storage.authors_dir)?;
    let added = authors::load_authors(registries.dblp.as_ref(), &mut directory, &publications).await?;
    println!("{added} new authors, {} in the directory", directory.len());
    Ok(())
}

// ── citations ───────────────────────────────────────────────────────────────

pub async fn citations(
    config: &Config,
    interactive: bool,
    alias: &str,
    year: Option<&str>,
    refresh: bool,
) -> anyhow::Result<()> {
    let mut ctx = open_context(config, interactive)?;
    let publications = snapshot(config, &ctx.registries, alias, false).await?;
    let selected = of_year(&publications, year);

    let report = citations::discover_citations(&mut ctx, &selected, refresh).await?;
    ctx.caches.save_all()?;

    heading("Citation discovery");
    println!("publications with a DOI   {}", report.publications);
    println!("queried                   {}", report.queried);
    println!("new citing ids            {}", report.new_citing);
    println!("enriched from registries  {}", report.enriched);
    println!("OpenCitations backfill    {}", report.backfilled);
    Ok(())
}

// ── classify ────────────────────────────────────────────────────────────────

/// Citing ids of the selected publications, or every record when no
/// conference is named.
fn citing_keys(ctx: &Context, publications: &[Publication]) -> Vec<String> {
    let mut keys = BTreeSet::new();
    for publication in publications {
        let Some(doi) = publication.doi_key() else { continue };
        if let Some(citing) = ctx.caches.citations.get(&doi) {
            keys.extend(citing.iter().cloned());
        }
    }
    keys.into_iter().collect()
}

pub async fn classify(
    config: &Config,
    interactive: bool,
    alias: Option<&str>,
    year: Option<&str>,
) -> anyhow::Result<()> {
    let mut ctx = open_context(config, interactive)?;
    let keys = match alias {
        Some(alias) => {
            let publications = snapshot(config, &ctx.registries, alias, false).await?;
            let keys = citing_keys(&ctx, &of_year(&publications, year));
            if keys.is_empty() {
                println!("No citing works recorded for {alias}; run `lusocite citations {alias}` first");
                return Ok(());
            }
            keys
        }
        None if year.is_some() => bail!("--year needs --alias"),
        None => Vec::new(),
    };

    let report = classify_records(&mut ctx, &keys).await?;
    ctx.caches.save_all()?;

    heading("Author classification");
    println!("classified  {}", report.classified);
    println!("related     {}", report.related);
    println!("unrelated   {}", report.unrelated);
    println!("undecided   {}", report.unknown);
    Ok(())
}

// ── report ──────────────────────────────────────────────────────────────────

pub async fn report(
    config: &Config,
    interactive: bool,
    alias: &str,
    year: Option<&str>,
    classify: bool,
    gexf: Option<&Path>,
) -> anyhow::Result<()> {
    let mut ctx = open_context(config, interactive)?;
    let publications = snapshot(config, &ctx.registries, alias, false).await?;
    let selected = of_year(&publications, year);

    if classify {
        let attempted = classify_citers(&mut ctx, &selected).await?;
        info!(attempted, "Classified pending citers");
    }

    heading("Publications per year");
    println!("{:<6} {:>5} {:>5} {:>5} {:>7} {:>7} {:>7} {:>7} {:>7}",
        "year", "pubs", "pt", "en", "cites", "cit.pt", "cit.en", "avg.pt", "avg.en");
    for y in per_year(&selected, &ctx.caches.citations) {
        println!("{:<6} {:>5} {:>5} {:>5} {:>7} {:>7} {:>7} {:>7.2} {:>7.2}",
            y.year, y.publications, y.portuguese, y.english, y.citations,
            y.citations_portuguese, y.citations_english, y.average_portuguese(), y.average_english());
    }

    let graph = CitationGraph::build(&selected, &ctx.caches.citations, &ctx.caches.doi_metadata);
    let tally = graph.tally();
    println!();
    heading("Citations by type");
    println!("Lusophone affiliation → Portuguese publication      {}", tally.pt_pt);
    println!("Lusophone affiliation → English publication         {}", tally.pt_en);
    println!("Non-Lusophone affiliation → Portuguese publication  {}", tally.n_pt_pt);
    println!("Non-Lusophone affiliation → English publication     {}", tally.n_pt_en);
    println!("Unknown affiliation                                 {}", tally.unknown);
    println!("nodes {}, edges {}", graph.node_count(), graph.edge_count());

    if let Some(path) = gexf {
        write_gexf(&graph, path)?;
        println!("graph written to {}", path.display());
    }
    ctx.caches.save_all()?;
    Ok(())
}

// ── orcid ───────────────────────────────────────────────────────────────────

pub async fn orcid(config: &Config, id: &str, section: &str) -> anyhow::Result<()> {
    let Some(section) = OrcidSection::parse(section) else {
        bail!("unknown ORCID section {section} (expected person or employments)");
    };
    let registries = registries(config)?;
    let body = registries.orcid.read_section(id, section).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
