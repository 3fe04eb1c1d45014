//! lusocite-graph: Citation-network aggregation and reporting.
//! Covers:
//! - Directed citation graph (citer → cited) with per-edge categories
//! - The four-way Lusophone / language tally
//! - Per-year publication and citation summaries
//! - GEXF export for Gephi

pub mod gexf;
pub mod graph;
pub mod stats;

pub use graph::{classify_citers, CitationGraph, CitationNode, CitingCategory, NodeKind, Tally};
pub use stats::{per_year, YearSummary};
