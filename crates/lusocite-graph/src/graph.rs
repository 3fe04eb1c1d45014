//! Citation graph over one set of conference publications.
//!
//! Nodes are keyed by lowercase DOI (or Semantic Scholar paper id). Edges
//! point from the citing work to the cited publication and carry the
//! category of that citation: whether the citing authors are Lusophone,
//! crossed with the language of the cited publication.

use std::collections::{BTreeSet, HashMap};

use lusocite_affiliation::classify_doi;
use lusocite_common::{Cache, Relation, Result};
use lusocite_ingestion::language::is_portuguese;
use lusocite_ingestion::models::{Agency, DoiRecord, Publication};
use lusocite_ingestion::Context;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A publication of the conference itself.
    Own { portuguese: bool },
    /// An external citing work, with its authors' verdict.
    Citer(Relation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationNode {
    pub key: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CitingCategory {
    LusophoneToPortuguese,
    LusophoneToEnglish,
    OtherToPortuguese,
    OtherToEnglish,
    Unknown,
}

impl CitingCategory {
    pub fn of(citer: Relation, cited_portuguese: bool) -> Self {
        match (citer, cited_portuguese) {
            (Relation::Related, true)    => CitingCategory::LusophoneToPortuguese,
            (Relation::Related, false)   => CitingCategory::LusophoneToEnglish,
            (Relation::Unrelated, true)  => CitingCategory::OtherToPortuguese,
            (Relation::Unrelated, false) => CitingCategory::OtherToEnglish,
            (Relation::Unknown, _)       => CitingCategory::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CitingCategory::LusophoneToPortuguese => "Lusophone affiliation citing a Portuguese publication",
            CitingCategory::LusophoneToEnglish    => "Lusophone affiliation citing an English publication",
            CitingCategory::OtherToPortuguese     => "Non-Lusophone affiliation citing a Portuguese publication",
            CitingCategory::OtherToEnglish        => "Non-Lusophone affiliation citing an English publication",
            CitingCategory::Unknown               => "Unknown affiliation",
        }
    }
}

/// Citation counts per category. The first four are mutually exclusive
/// and only count citations whose citer has a verdict.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub pt_pt: usize,
    pub pt_en: usize,
    pub n_pt_pt: usize,
    pub n_pt_en: usize,
    pub unknown: usize,
}

impl Tally {
    pub fn add(&mut self, category: CitingCategory) {
        match category {
            CitingCategory::LusophoneToPortuguese => self.pt_pt += 1,
            CitingCategory::LusophoneToEnglish    => self.pt_en += 1,
            CitingCategory::OtherToPortuguese     => self.n_pt_pt += 1,
            CitingCategory::OtherToEnglish        => self.n_pt_en += 1,
            CitingCategory::Unknown               => self.unknown += 1,
        }
    }

    pub fn classified(&self) -> usize {
        self.pt_pt + self.pt_en + self.n_pt_pt + self.n_pt_en
    }
}

pub struct CitationGraph {
    graph: DiGraph<CitationNode, CitingCategory>,
    index: HashMap<String, NodeIndex>,
    tally: Tally,
}

impl CitationGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            tally: Tally::default(),
        }
    }

    /// Build the graph of `publications` from the cached citation sets and
    /// author verdicts. Publications without a DOI are left out.
    pub fn build<'a>(
        publications: impl IntoIterator<Item = &'a Publication>,
        citations: &Cache<BTreeSet<String>>,
        doi_metadata: &Cache<DoiRecord>,
    ) -> Self {
        let mut graph = Self::new();
        let own: Vec<(String, bool)> = publications
            .into_iter()
            .filter_map(|p| {
                let portuguese = p.language.as_deref().is_some_and(is_portuguese);
                p.doi_key().map(|key| (key, portuguese))
            })
            .collect();

        for (key, portuguese) in &own {
            graph.add_own(key, *portuguese);
        }

        for (cited, portuguese) in &own {
            let Some(citing) = citations.get(cited) else { continue };
            for citer in citing {
                let record = doi_metadata.get(citer);
                let relation = record.map_or(Relation::Unknown, |r| r.authors_related_to_portuguese);
                if relation.is_unknown() {
                    report_unclassified(citer, record);
                }
                graph.add_citation(citer, relation, cited, *portuguese);
            }
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            pt_pt = graph.tally.pt_pt,
            pt_en = graph.tally.pt_en,
            n_pt_pt = graph.tally.n_pt_pt,
            n_pt_en = graph.tally.n_pt_en,
            unknown = graph.tally.unknown,
            "Built citation graph"
        );
        graph
    }

    fn node(&mut self, key: &str, kind: NodeKind) -> NodeIndex {
        if let Some(&idx) = self.index.get(key) {
            return idx;
        }
        let idx = self.graph.add_node(CitationNode { key: key.to_string(), kind });
        self.index.insert(key.to_string(), idx);
        idx
    }

    /// Add a conference publication. An existing citer node with the same
    /// key becomes an own node.
    pub fn add_own(&mut self, key: &str, portuguese: bool) {
        let kind = NodeKind::Own { portuguese };
        let idx = self.node(key, kind);
        self.graph[idx].kind = kind;
    }

    /// Add the edge `citer → cited` and count it. Own publications citing
    /// each other keep their own-node annotation.
    pub fn add_citation(&mut self, citer: &str, relation: Relation, cited: &str, cited_portuguese: bool) {
        let from = self.node(citer, NodeKind::Citer(relation));
        let to = self.node(cited, NodeKind::Own { portuguese: cited_portuguese });
        if self.graph.find_edge(from, to).is_some() {
            return;
        }
        let category = CitingCategory::of(relation, cited_portuguese);
        self.graph.add_edge(from, to, category);
        self.tally.add(category);
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn get(&self, key: &str) -> Option<&CitationNode> {
        self.index.get(key).map(|&idx| &self.graph[idx])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CitationNode> {
        self.graph.node_weights()
    }

    /// Edges as `(citer, cited, category)`.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, CitingCategory)> {
        self.graph.edge_indices().filter_map(move |e| {
            let (from, to) = self.graph.edge_endpoints(e)?;
            Some((self.graph[from].key.as_str(), self.graph[to].key.as_str(), self.graph[e]))
        })
    }

    /// Number of distinct works citing `key`.
    pub fn citation_count(&self, key: &str) -> usize {
        self.index
            .get(key)
            .map_or(0, |&idx| self.graph.neighbors_directed(idx, Direction::Incoming).count())
    }
}

impl Default for CitationGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Point at citers that could be classified but are not yet.
fn report_unclassified(citer: &str, record: Option<&DoiRecord>) {
    match record.and_then(DoiRecord::agency) {
        Some(Agency::SemanticScholar) | None => {}
        Some(agency) => {
            info!(doi = citer, agency = %agency, url = %format!("https://doi.org/{citer}"), "Unclassified citer");
        }
    }
}

/// Run author classification for every citer of `publications` that has a
/// record but no verdict yet. Returns how many citers were attempted.
pub async fn classify_citers<'a>(
    ctx: &mut Context,
    publications: impl IntoIterator<Item = &'a Publication>,
) -> Result<usize> {
    let mut pending: BTreeSet<String> = BTreeSet::new();
    for publication in publications {
        let Some(doi) = publication.doi_key() else { continue };
        let Some(citing) = ctx.caches.citations.get(&doi) else { continue };
        for citer in citing {
            let undecided = ctx
                .caches
                .doi_metadata
                .get(citer)
                .is_some_and(|r| r.authors_related_to_portuguese.is_unknown());
            if undecided {
                pending.insert(citer.clone());
            }
        }
    }

    for citer in &pending {
        if let Err(e) = classify_doi(ctx, citer).await {
            if !e.is_transient() {
                return Err(e);
            }
            warn!(doi = %citer, error = %e, "Classification failed");
        }
        ctx.caches.orcid.save()?;
        ctx.caches.affiliations.save()?;
    }
    ctx.caches.doi_metadata.save()?;
    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_cross_verdict_and_language() {
        assert_eq!(CitingCategory::of(Relation::Related, true), CitingCategory::LusophoneToPortuguese);
        assert_eq!(CitingCategory::of(Relation::Related, false), CitingCategory::LusophoneToEnglish);
        assert_eq!(CitingCategory::of(Relation::Unrelated, true), CitingCategory::OtherToPortuguese);
        assert_eq!(CitingCategory::of(Relation::Unrelated, false), CitingCategory::OtherToEnglish);
        assert_eq!(CitingCategory::of(Relation::Unknown, true), CitingCategory::Unknown);
    }

    #[test]
    fn test_one_citer_of_two_publications_counts_twice() {
        let mut graph = CitationGraph::new();
        graph.add_own("10.5753/a", true);
        graph.add_own("10.5753/b", false);
        graph.add_citation("10.1000/x", Relation::Related, "10.5753/a", true);
        graph.add_citation("10.1000/x", Relation::Related, "10.5753/b", false);
        graph.add_citation("10.1000/x", Relation::Related, "10.5753/b", false);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.tally(), Tally { pt_pt: 1, pt_en: 1, ..Default::default() });
        assert_eq!(graph.citation_count("10.5753/b"), 1);
    }

    #[test]
    fn test_own_publication_citing_another_stays_own() {
        let mut graph = CitationGraph::new();
        graph.add_citation("10.5753/a", Relation::Related, "10.5753/b", true);
        graph.add_own("10.5753/a", false);
        graph.add_own("10.5753/b", true);

        assert_eq!(graph.get("10.5753/a").unwrap().kind, NodeKind::Own { portuguese: false });
        assert_eq!(graph.tally().pt_pt, 1);
    }
}
