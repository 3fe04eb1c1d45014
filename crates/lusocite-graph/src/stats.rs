//! Per-year publication and citation summaries.

use std::collections::{BTreeMap, BTreeSet};

use lusocite_common::Cache;
use lusocite_ingestion::language::{is_english, is_portuguese};
use lusocite_ingestion::models::Publication;
use serde::Serialize;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: String,
    pub publications: usize,
    pub portuguese: usize,
    pub english: usize,
    pub citations: usize,
    pub citations_portuguese: usize,
    pub citations_english: usize,
}

impl YearSummary {
    pub fn average_portuguese(&self) -> f64 {
        average(self.citations_portuguese, self.portuguese)
    }

    pub fn average_english(&self) -> f64 {
        average(self.citations_english, self.english)
    }
}

fn average(citations: usize, publications: usize) -> f64 {
    if publications == 0 {
        0.0
    } else {
        citations as f64 / publications as f64
    }
}

/// Citation count of one publication from the cached citation sets.
pub fn citations_of(publication: &Publication, citations: &Cache<BTreeSet<String>>) -> usize {
    publication
        .doi_key()
        .and_then(|key| citations.get(&key).map(BTreeSet::len))
        .unwrap_or(0)
}

/// One summary per year present in `publications`, oldest first.
/// Publications in neither language only count towards the totals.
pub fn per_year<'a>(
    publications: impl IntoIterator<Item = &'a Publication>,
    citations: &Cache<BTreeSet<String>>,
) -> Vec<YearSummary> {
    let mut years: BTreeMap<String, YearSummary> = BTreeMap::new();
    for publication in publications {
        let year = publication.year().to_string();
        let summary = years
            .entry(year.clone())
            .or_insert_with(|| YearSummary { year, ..Default::default() });
        let cited = citations_of(publication, citations);
        let language = publication.language.as_deref().unwrap_or_default();

        summary.publications += 1;
        summary.citations += cited;
        if is_portuguese(language) {
            summary.portuguese += 1;
            summary.citations_portuguese += cited;
        } else if is_english(language) {
            summary.english += 1;
            summary.citations_english += cited;
        }
    }
    years.into_values().collect()
}
