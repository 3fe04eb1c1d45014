//! GEXF 1.3 export of the citation graph, for Gephi.

use std::fs;
use std::path::Path;

use lusocite_common::{LusociteError, Relation, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use tracing::info;

use crate::graph::{CitationGraph, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const OWN_PORTUGUESE:  Rgb = Rgb(0, 255, 0);
pub const OWN_ENGLISH:     Rgb = Rgb(0, 0, 255);
pub const CITER_LUSOPHONE: Rgb = Rgb(255, 255, 0);
pub const CITER_OTHER:     Rgb = Rgb(255, 0, 255);
pub const CITER_UNKNOWN:   Rgb = Rgb(255, 0, 0);

pub fn color(kind: NodeKind) -> Rgb {
    match kind {
        NodeKind::Own { portuguese: true }   => OWN_PORTUGUESE,
        NodeKind::Own { portuguese: false }  => OWN_ENGLISH,
        NodeKind::Citer(Relation::Related)   => CITER_LUSOPHONE,
        NodeKind::Citer(Relation::Unrelated) => CITER_OTHER,
        NodeKind::Citer(Relation::Unknown)   => CITER_UNKNOWN,
    }
}

fn xml_err(e: impl std::fmt::Display) -> LusociteError {
    LusociteError::Xml(e.to_string())
}

fn start<'a>(w: &mut Writer<Vec<u8>>, tag: BytesStart<'a>) -> Result<()> {
    w.write_event(Event::Start(tag)).map_err(xml_err)
}

fn end(w: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    w.write_event(Event::End(BytesEnd::new(name))).map_err(xml_err)
}

fn empty<'a>(w: &mut Writer<Vec<u8>>, tag: BytesStart<'a>) -> Result<()> {
    w.write_event(Event::Empty(tag)).map_err(xml_err)
}

/// Render `graph` as a GEXF document. Node ids are the DOI keys.
pub fn to_gexf(graph: &CitationGraph) -> Result<String> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;

    start(&mut w, BytesStart::new("gexf").with_attributes([
        ("xmlns", "http://gexf.net/1.3"),
        ("xmlns:viz", "http://gexf.net/1.3/viz"),
        ("version", "1.3"),
    ]))?;
    start(&mut w, BytesStart::new("graph").with_attributes([
        ("defaultedgetype", "directed"),
        ("mode", "static"),
    ]))?;

    start(&mut w, BytesStart::new("nodes"))?;
    for node in graph.nodes() {
        start(&mut w, BytesStart::new("node").with_attributes([
            ("id", node.key.as_str()),
            ("label", node.key.as_str()),
        ]))?;
        let Rgb(r, g, b) = color(node.kind);
        let (r, g, b) = (r.to_string(), g.to_string(), b.to_string());
        empty(&mut w, BytesStart::new("viz:color").with_attributes([
            ("r", r.as_str()),
            ("g", g.as_str()),
            ("b", b.as_str()),
            ("a", "1.0"),
        ]))?;
        end(&mut w, "node")?;
    }
    end(&mut w, "nodes")?;

    start(&mut w, BytesStart::new("edges"))?;
    for (i, (source, target, category)) in graph.edges().enumerate() {
        let id = i.to_string();
        empty(&mut w, BytesStart::new("edge").with_attributes([
            ("id", id.as_str()),
            ("source", source),
            ("target", target),
            ("label", category.label()),
        ]))?;
    }
    end(&mut w, "edges")?;

    end(&mut w, "graph")?;
    end(&mut w, "gexf")?;

    String::from_utf8(w.into_inner()).map_err(xml_err)
}

pub fn write_gexf(graph: &CitationGraph, path: &Path) -> Result<()> {
    let document = to_gexf(graph)?;
    fs::write(path, document.as_bytes())
        .map_err(|source| LusociteError::Io { path: path.to_path_buf(), source })?;
    info!(path = %path.display(), nodes = graph.node_count(), edges = graph.edge_count(), "Wrote GEXF");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_colours() {
        assert_eq!(color(NodeKind::Own { portuguese: true }), Rgb(0, 255, 0));
        assert_eq!(color(NodeKind::Own { portuguese: false }), Rgb(0, 0, 255));
        assert_eq!(color(NodeKind::Citer(Relation::Related)), Rgb(255, 255, 0));
        assert_eq!(color(NodeKind::Citer(Relation::Unrelated)), Rgb(255, 0, 255));
        assert_eq!(color(NodeKind::Citer(Relation::Unknown)), Rgb(255, 0, 0));
    }

    #[test]
    fn test_document_shape() {
        let mut graph = CitationGraph::new();
        graph.add_own("10.5753/a", true);
        graph.add_citation("10.1000/x&y", Relation::Unrelated, "10.5753/a", true);

        let doc = to_gexf(&graph).unwrap();
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(doc.contains("<graph defaultedgetype=\"directed\" mode=\"static\">"));
        assert!(doc.contains("<node id=\"10.5753/a\" label=\"10.5753/a\">"));
        assert!(doc.contains("<viz:color r=\"0\" g=\"255\" b=\"0\" a=\"1.0\"/>"));
        // Attribute values are escaped.
        assert!(doc.contains("source=\"10.1000/x&amp;y\""));
        assert!(doc.contains("target=\"10.5753/a\""));
    }
}
