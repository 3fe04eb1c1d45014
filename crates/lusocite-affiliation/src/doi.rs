//! DOI-level author aggregation.
//!
//! Every author of a resolved record is classified from their affiliation
//! strings and, when present, their ORCID iD. Authors are then tallied and
//! the record gets a verdict only when the tally is conclusive.

use lusocite_common::{Relation, Result};
use lusocite_ingestion::agency;
use lusocite_ingestion::models::{Agency, DoiRecord};
use lusocite_ingestion::sources::semanticscholar::paper_page;
use lusocite_ingestion::Context;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::classify::classify_affiliation;
use crate::orcid::{canonical_orcid, classify_orcid};

/// DOI prefix of the conference's own publisher; such works are Portuguese
/// by policy, whoever wrote them.
pub const PUBLISHER_PREFIX: &str = "10.5753/";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AuthorTally {
    pub related: usize,
    pub unrelated: usize,
    pub unknown: usize,
}

impl AuthorTally {
    pub fn add(&mut self, relation: Relation) {
        match relation {
            Relation::Related   => self.related += 1,
            Relation::Unrelated => self.unrelated += 1,
            Relation::Unknown   => self.unknown += 1,
        }
    }

    /// Related if anyone is; unrelated only when everybody is known and
    /// nobody is related; otherwise undecided.
    pub fn verdict(&self) -> Relation {
        if self.related > 0 {
            Relation::Related
        } else if self.unrelated > 0 && self.unknown == 0 {
            Relation::Unrelated
        } else {
            Relation::Unknown
        }
    }
}

/// The classification inputs of one author.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AuthorSignals {
    pub affiliations: Vec<String>,
    pub orcid: Option<String>,
}

/// Where in the metadata the author list lives, per agency.
fn author_pointer(agency: &Agency, metadata: &Value) -> Option<&'static str> {
    match agency {
        Agency::Crossref => Some("/message/author"),
        Agency::DataCite if metadata.pointer("/data/creators").is_some() => Some("/data/creators"),
        Agency::DataCite => Some("/data/attributes/creators"),
        _ => None,
    }
}

fn crossref_signals(author: &Value) -> AuthorSignals {
    AuthorSignals {
        affiliations: author["affiliation"]
            .as_array()
            .map(|a| a.iter().filter_map(|x| x["name"].as_str().map(String::from)).collect())
            .unwrap_or_default(),
        orcid: author["ORCID"].as_str().and_then(canonical_orcid),
    }
}

fn datacite_signals(creator: &Value) -> AuthorSignals {
    let affiliations = creator["affiliation"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|x| match x {
                    Value::String(name) => Some(name.clone()),
                    other => other["name"].as_str().map(String::from),
                })
                .collect()
        })
        .unwrap_or_default();
    let orcid = creator["nameIdentifiers"]
        .as_array()
        .into_iter()
        .flatten()
        .find(|id| {
            let scheme = id["nameIdentifierScheme"].as_str().or_else(|| id["scheme"].as_str());
            scheme.is_some_and(|s| s.eq_ignore_ascii_case("orcid"))
        })
        .and_then(|id| id["nameIdentifier"].as_str())
        .and_then(canonical_orcid);
    AuthorSignals { affiliations, orcid }
}

/// Author signals of a record, or `None` when it has no author list.
pub fn author_signals(agency: &Agency, metadata: &Value) -> Option<Vec<AuthorSignals>> {
    let authors = metadata.pointer(author_pointer(agency, metadata)?)?.as_array()?;
    let extract = match agency {
        Agency::Crossref => crossref_signals,
        _ => datacite_signals,
    };
    Some(authors.iter().map(extract).collect())
}

/// Combined verdict of one author: any related signal wins.
pub async fn classify_author(ctx: &mut Context, author: &AuthorSignals) -> Result<Relation> {
    let mut relation = Relation::Unknown;
    for affiliation in &author.affiliations {
        let signal = classify_affiliation(&mut ctx.caches.affiliations, ctx.resolver.as_mut(), affiliation)?;
        relation = relation.either(signal);
    }
    if let Some(orcid) = &author.orcid {
        relation = relation.either(classify_orcid(ctx, orcid).await?);
    }
    Ok(relation)
}

/// Record each author's verdict next to the author in the raw metadata.
fn annotate_authors(record: &mut DoiRecord, pointer: &str, relations: &[Relation]) {
    let Some(authors) = record
        .registration
        .metadata_mut()
        .and_then(|m| m.pointer_mut(pointer))
        .and_then(Value::as_array_mut)
    else {
        return;
    };
    for (author, relation) in authors.iter_mut().zip(relations) {
        if let (Some(object), Some(related)) = (author.as_object_mut(), relation.as_bool()) {
            object.insert("related_to_portuguese".to_string(), Value::Bool(related));
        }
    }
}

/// Classify the authors of `key` and store the DOI-level verdict.
///
/// Resolves and fetches the record first if it is missing or undescribed.
/// An agency with no fetcher is an error. Returns the record's verdict after
/// the update.
#[instrument(skip(ctx))]
pub async fn classify_doi(ctx: &mut Context, key: &str) -> Result<Relation> {
    agency::enrich(ctx, key).await?;

    let Some(record) = ctx.caches.doi_metadata.get(key) else { return Ok(Relation::Unknown) };
    let agency = record.agency();
    let mut tally = AuthorTally::default();

    match (&agency, record.metadata()) {
        (Some(Agency::SemanticScholar), _) => {
            info!(doi = key, url = %paper_page(key), "Semantic Scholar record needs manual classification");
        }
        (Some(agency @ (Agency::Crossref | Agency::DataCite)), Some(metadata)) => {
            let pointer = author_pointer(agency, metadata);
            match author_signals(agency, metadata) {
                Some(authors) => {
                    let mut relations = Vec::with_capacity(authors.len());
                    for author in &authors {
                        let relation = classify_author(ctx, author).await?;
                        tally.add(relation);
                        relations.push(relation);
                    }
                    if let (Some(pointer), Some(record)) = (pointer, ctx.caches.doi_metadata.get_mut(key)) {
                        annotate_authors(record, pointer, &relations);
                    }
                }
                None => warn!(doi = key, agency = %agency, url = %format!("https://doi.org/{key}"), "No author data in metadata"),
            }
        }
        (Some(agency), None) => {
            warn!(doi = key, agency = %agency, "No metadata to classify");
        }
        _ => {}
    }

    let verdict = if key.starts_with(PUBLISHER_PREFIX) {
        Relation::Related
    } else {
        tally.verdict()
    };

    let Some(record) = ctx.caches.doi_metadata.get_mut(key) else { return Ok(verdict) };
    if verdict.is_known() {
        record.authors_related_to_portuguese = verdict;
    }
    info!(
        doi = key,
        related = tally.related,
        unrelated = tally.unrelated,
        unknown = tally.unknown,
        verdict = %record.authors_related_to_portuguese,
        "Classified DOI authors"
    );
    Ok(record.authors_related_to_portuguese)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyReport {
    pub classified: usize,
    pub related: usize,
    pub unrelated: usize,
    pub unknown: usize,
}

/// Classify every still-undecided record among `keys` (all records when
/// `keys` is empty), saving the ORCID, affiliation and DOI maps after each.
pub async fn classify_records(ctx: &mut Context, keys: &[String]) -> Result<ClassifyReport> {
    let keys: Vec<String> = if keys.is_empty() {
        ctx.caches.doi_metadata.keys().cloned().collect()
    } else {
        keys.to_vec()
    };

    let mut report = ClassifyReport::default();
    for key in &keys {
        let decided = ctx
            .caches
            .doi_metadata
            .get(key)
            .is_some_and(|r| r.authors_related_to_portuguese.is_known());
        if decided {
            continue;
        }

        let relation = classify_doi(ctx, key).await?;
        report.classified += 1;
        match relation {
            Relation::Related   => report.related += 1,
            Relation::Unrelated => report.unrelated += 1,
            Relation::Unknown   => report.unknown += 1,
        }

        ctx.caches.orcid.save()?;
        ctx.caches.affiliations.save()?;
        ctx.caches.doi_metadata.save()?;
    }
    info!(
        classified = report.classified,
        related = report.related,
        unrelated = report.unrelated,
        unknown = report.unknown,
        "Batch classification finished"
    );
    Ok(report)
}
