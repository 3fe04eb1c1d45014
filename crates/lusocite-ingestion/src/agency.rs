//! Agency resolution and registry-routed metadata retrieval.
//!
//! An agency is resolved at most once per key; after that the record is
//! routed to exactly one metadata fetcher. Calling a fetcher for a record
//! resolved elsewhere is a logic error and is returned as a precondition
//! error, never degraded.

use lusocite_common::{LusociteError, Result};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::context::Context;
use crate::models::{is_registered_doi, is_test_doi, Agency, DoiRecord};
use crate::sources::{crossref, datacite, semanticscholar};

/// Ensure `key` has a record and try to resolve its agency.
///
/// Returns the agency now set, if any. Transient failures leave the agency
/// unset so the next run retries.
#[instrument(skip(ctx))]
pub async fn resolve_agency(ctx: &mut Context, key: &str) -> Option<Agency> {
    match ctx.caches.doi_metadata.get(key) {
        Some(record) => {
            if let Some(agency) = record.agency() {
                return Some(agency);
            }
        }
        None => {
            ctx.caches.doi_metadata.insert(key, DoiRecord::default());
        }
    }

    if is_test_doi(key) {
        warn!(doi = key, "Skipping agency lookup for test-prefix DOI");
        return None;
    }

    let agency = if is_registered_doi(key) {
        lookup_agency(ctx, key).await?
    } else {
        Agency::SemanticScholar
    };

    if let Some(record) = ctx.caches.doi_metadata.get_mut(key) {
        record.resolve(agency.clone());
    }
    debug!(doi = key, agency = %agency, "Resolved agency");
    Some(agency)
}

async fn lookup_agency(ctx: &Context, doi: &str) -> Option<Agency> {
    let crossref_api = &ctx.registries.crossref;
    match crossref_api.agency(doi).await {
        Ok(body) => match crossref::parse_agency(&body) {
            Ok(agency) => Some(agency),
            Err(e) => {
                warn!(doi, registry = "crossref", error = %e, "Agency lookup unusable");
                None
            }
        },
        // Present in the works index but not in the agency index.
        Err(e) if e.status() == Some(404) => match crossref_api.work(doi).await {
            Ok(_) => {
                info!(doi, "Agency inferred as crossref from work lookup");
                Some(Agency::Crossref)
            }
            Err(e) => {
                warn!(doi, registry = "crossref", error = %e, "Work lookup failed after agency 404");
                None
            }
        },
        Err(e) => {
            warn!(doi, registry = "crossref", error = %e, "Agency lookup failed");
            None
        }
    }
}

fn check_agency(ctx: &Context, key: &str, expected: &'static str) -> Result<()> {
    let record = ctx
        .caches
        .doi_metadata
        .get(key)
        .ok_or_else(|| LusociteError::MissingRecord { key: key.to_string() })?;
    match record.agency() {
        Some(found) if found.as_str() == expected => Ok(()),
        found => Err(LusociteError::AgencyMismatch {
            key: key.to_string(),
            expected,
            found: found.map(|a| a.to_string()).unwrap_or_else(|| "nothing".to_string()),
        }),
    }
}

/// Outcome of a registry call that may legitimately fail.
fn usable(key: &str, registry: &'static str, result: Result<Value>, accept: fn(&Value) -> bool) -> Result<Option<Value>> {
    match result {
        Ok(body) if accept(&body) => Ok(Some(body)),
        Ok(_) => {
            warn!(doi = key, registry, "Registry answered without usable metadata");
            Ok(None)
        }
        Err(e) if e.is_transient() => {
            warn!(doi = key, registry, error = %e, "Metadata fetch failed");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn attach(ctx: &mut Context, key: &str, body: Option<Value>) -> bool {
    match (body, ctx.caches.doi_metadata.get_mut(key)) {
        (Some(body), Some(record)) => {
            record.attach_metadata(body);
            true
        }
        _ => false,
    }
}

/// Attach Crossref work metadata. Returns whether metadata was attached.
#[instrument(skip(ctx))]
pub async fn metadata_from_crossref(ctx: &mut Context, key: &str) -> Result<bool> {
    check_agency(ctx, key, "crossref")?;
    let result = ctx.registries.crossref.work(key).await;
    let body = usable(key, "crossref", result, crossref::is_ok)?;
    Ok(attach(ctx, key, body))
}

#[instrument(skip(ctx))]
pub async fn metadata_from_datacite(ctx: &mut Context, key: &str) -> Result<bool> {
    check_agency(ctx, key, "datacite")?;
    let result = ctx.registries.datacite.doi(key).await;
    let body = usable(key, "datacite", result, datacite::has_data)?;
    Ok(attach(ctx, key, body))
}

#[instrument(skip(ctx))]
pub async fn metadata_from_semantic_scholar(ctx: &mut Context, key: &str) -> Result<bool> {
    check_agency(ctx, key, "semanticscholar")?;
    let result = ctx.registries.semantic_scholar.paper(key).await;
    let body = usable(key, "semanticscholar", result, semanticscholar::is_paper)?;
    Ok(attach(ctx, key, body))
}

/// Route `key` to the fetcher of its resolved agency.
///
/// Unresolved records are skipped; an unrecognised agency is a precondition
/// error.
pub async fn fetch_metadata(ctx: &mut Context, key: &str) -> Result<bool> {
    let agency = ctx
        .caches
        .doi_metadata
        .get(key)
        .map(DoiRecord::agency)
        .ok_or_else(|| LusociteError::MissingRecord { key: key.to_string() })?;

    match agency {
        None                          => Ok(false),
        Some(Agency::Crossref)        => metadata_from_crossref(ctx, key).await,
        Some(Agency::DataCite)        => metadata_from_datacite(ctx, key).await,
        Some(Agency::SemanticScholar) => metadata_from_semantic_scholar(ctx, key).await,
        Some(Agency::Other(agency))   => {
            Err(LusociteError::UnknownAgency { key: key.to_string(), agency })
        }
    }
}

/// Resolve and fetch one citing id if it still lacks metadata.
pub async fn enrich(ctx: &mut Context, key: &str) -> Result<bool> {
    if ctx.caches.doi_metadata.get(key).is_some_and(DoiRecord::has_metadata) {
        return Ok(false);
    }
    if resolve_agency(ctx, key).await.is_none() {
        return Ok(false);
    }
    fetch_metadata(ctx, key).await
}
