//! Citation discovery.
//!
//! For every publication with a DOI, citing works are gathered from
//! OpenCitations and Semantic Scholar, merged into the citations map, and
//! each citing id still lacking metadata is resolved and enriched. The
//! citations map is saved after every publication and the DOI metadata map
//! after every batch of citing ids, so an interrupted run resumes where it
//! stopped.

use std::collections::BTreeSet;

use lusocite_common::Result;
use tracing::{debug, info, instrument, warn};

use crate::agency;
use crate::context::Context;
use crate::models::{is_registered_doi, Agency, CitationSet, DoiRecord, Publication};
use crate::sources::opencitations::{self, OpenCitationsApi, METADATA_BATCH};
use crate::sources::semanticscholar::{self, SemanticScholarApi, SemanticScholarCitations};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Publications with a DOI.
    pub publications: usize,
    /// Publications whose citations were queried this run.
    pub queried: usize,
    /// Citing ids added to the citations map.
    pub new_citing: usize,
    /// Citing ids that received registry metadata.
    pub enriched: usize,
    /// Citing ids that received OpenCitations metadata only.
    pub backfilled: usize,
}

/// Citing DOIs according to OpenCitations. `None` when the index did not
/// answer.
pub async fn citing_from_opencitations(api: &dyn OpenCitationsApi, doi: &str) -> Result<Option<CitationSet>> {
    let parsed = api
        .citations(doi)
        .await
        .and_then(|body| opencitations::parse_citing(&body));
    match parsed {
        Ok(citing) => Ok(Some(citing)),
        Err(e) if e.is_transient() => {
            warn!(doi, registry = "opencitations", error = %e, "Citation lookup failed");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Citing works according to Semantic Scholar. Failures are routine there
/// and only logged at debug level.
pub async fn citing_from_semantic_scholar(
    api: &dyn SemanticScholarApi,
    doi: &str,
) -> Result<Option<SemanticScholarCitations>> {
    match api.paper(doi).await {
        Ok(body) => Ok(Some(semanticscholar::parse_citations(&body))),
        Err(e) if e.is_transient() => {
            debug!(doi, registry = "semanticscholar", error = %e, "Citation lookup failed");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Paper ids without a DOI can only be described by Semantic Scholar.
fn register_paper_ids(ctx: &mut Context, paper_ids: &CitationSet) {
    for paper_id in paper_ids {
        match ctx.caches.doi_metadata.get(paper_id) {
            Some(record) if record.is_resolved() => {}
            Some(_) => {
                if let Some(record) = ctx.caches.doi_metadata.get_mut(paper_id) {
                    record.resolve(Agency::SemanticScholar);
                }
            }
            None => {
                ctx.caches
                    .doi_metadata
                    .insert(paper_id.as_str(), DoiRecord::with_agency(Agency::SemanticScholar));
            }
        }
    }
}

/// Lowercase a cached entry that was edited by hand.
fn normalise_entry(ctx: &mut Context, doi: &str) -> Vec<String> {
    let Some(citing) = ctx.caches.citations.get(doi) else { return Vec::new() };
    if citing.iter().all(|c| *c == c.to_lowercase()) {
        return citing.iter().cloned().collect();
    }
    let lowered: BTreeSet<String> = citing.iter().map(|c| c.to_lowercase()).collect();
    let out = lowered.iter().cloned().collect();
    ctx.caches.citations.insert(doi, lowered);
    out
}

/// Query both citation indexes for `doi` and merge into the citations map.
/// Returns how many ids were new. When neither index answers the map is
/// left untouched, so the next run asks again.
async fn query_citations(ctx: &mut Context, doi: &str) -> Result<usize> {
    let oc = citing_from_opencitations(ctx.registries.opencitations.as_ref(), doi).await?;
    let ss = citing_from_semantic_scholar(ctx.registries.semantic_scholar.as_ref(), doi).await?;
    if oc.is_none() && ss.is_none() {
        warn!(doi, "No citation index answered, will retry next run");
        return Ok(0);
    }
    let ss = ss.unwrap_or_default();
    register_paper_ids(ctx, &ss.paper_ids);

    let entry = ctx.caches.citations.entry_or_default(doi);
    let before = entry.len();
    entry.extend(oc.unwrap_or_default());
    entry.extend(ss.dois);
    entry.extend(ss.paper_ids);
    Ok(entry.len() - before)
}

#[instrument(skip_all, fields(n = publications.len(), refresh))]
pub async fn discover_citations(
    ctx: &mut Context,
    publications: &[Publication],
    refresh: bool,
) -> Result<DiscoveryReport> {
    let mut report = DiscoveryReport::default();
    let mut undescribed = BTreeSet::new();

    for publication in publications {
        let Some(doi) = publication.doi_key() else { continue };
        report.publications += 1;

        if refresh || !ctx.caches.citations.contains_key(&doi) {
            let added = query_citations(ctx, &doi).await?;
            report.queried += 1;
            report.new_citing += added;
            debug!(doi = %doi, added, "Queried citations");
        }
        let citing = normalise_entry(ctx, &doi);
        ctx.caches.citations.save()?;

        let pending: Vec<String> = citing
            .into_iter()
            .filter(|c| !ctx.caches.doi_metadata.get(c).is_some_and(DoiRecord::has_metadata))
            .collect();
        for key in &pending {
            if agency::enrich(ctx, key).await? {
                report.enriched += 1;
            } else if is_registered_doi(key) {
                undescribed.insert(key.clone());
            }
        }
        ctx.caches.doi_metadata.save()?;
    }

    let undescribed: Vec<String> = undescribed.into_iter().collect();
    report.backfilled = backfill_opencitations(ctx, &undescribed).await?;

    info!(
        publications = report.publications,
        queried = report.queried,
        new_citing = report.new_citing,
        enriched = report.enriched,
        backfilled = report.backfilled,
        "Citation discovery finished"
    );
    Ok(report)
}

/// Store OpenCitations metadata on records no registry has described.
///
/// DOIs are sent in batches of at most `METADATA_BATCH`; the map is saved
/// after each batch. Returns how many records were updated.
pub async fn backfill_opencitations(ctx: &mut Context, dois: &[String]) -> Result<usize> {
    let candidates: Vec<String> = dois
        .iter()
        .filter(|d| is_registered_doi(d))
        .filter(|d| {
            ctx.caches
                .doi_metadata
                .get(d)
                .is_some_and(|r| !r.has_metadata() && r.opencitations.is_none())
        })
        .cloned()
        .collect();

    let mut updated = 0;
    for batch in candidates.chunks(METADATA_BATCH) {
        let parsed = ctx
            .registries
            .opencitations
            .metadata(batch)
            .await
            .and_then(|body| opencitations::parse_metadata(&body));
        let found = match parsed {
            Ok(found) => found,
            Err(e) if e.is_transient() => {
                warn!(n = batch.len(), registry = "opencitations", error = %e, "Metadata batch failed");
                continue;
            }
            Err(e) => return Err(e),
        };

        for (doi, metadata) in found {
            if let Some(record) = ctx.caches.doi_metadata.get_mut(&doi) {
                if !record.has_metadata() {
                    record.opencitations = Some(metadata);
                    updated += 1;
                }
            }
        }
        ctx.caches.doi_metadata.save()?;
    }
    Ok(updated)
}
