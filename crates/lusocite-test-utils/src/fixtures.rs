//! Registry-shaped JSON builders.

use serde_json::{json, Value};

// ── DBLP ────────────────────────────────────────────────────────────────────

pub fn dblp_hit(id: &str, title: &str, year: &str, doi: Option<&str>, pids: &[&str]) -> Value {
    let authors: Vec<Value> = pids
        .iter()
        .map(|pid| json!({ "@pid": pid, "text": format!("Author {pid}") }))
        .collect();
    let mut info = json!({
        "authors": { "author": authors },
        "title": title,
        "venue": "SBSI",
        "year": year,
        "type": "Conference and Workshop Papers",
        "key": format!("conf/sbsi/{id}"),
    });
    if let Some(doi) = doi {
        info["doi"] = json!(doi);
    }
    json!({ "@score": "1", "@id": id, "info": info, "url": format!("https://dblp.org/rec/conf/sbsi/{id}") })
}

/// A search page; `hits` empty means the zero-size count request.
pub fn dblp_page(total: usize, hits: Vec<Value>) -> Value {
    let mut body = json!({
        "result": {
            "query": "stream:conf/sbsi:",
            "status": { "@code": "200", "text": "OK" },
            "hits": { "@total": total.to_string(), "@computed": total.to_string(), "@sent": hits.len().to_string() }
        }
    });
    if !hits.is_empty() {
        body["result"]["hits"]["hit"] = Value::Array(hits);
    }
    body
}

pub fn dblp_person(pid: &str, affiliations: &[&str]) -> String {
    let notes: String = affiliations
        .iter()
        .map(|a| format!("<note type=\"affiliation\">{a}</note>"))
        .collect();
    format!(
        "<?xml version=\"1.0\"?><dblpperson name=\"{pid}\" pid=\"{pid}\" n=\"1\">\
         <person key=\"homepages/{pid}\"><author pid=\"{pid}\">{pid}</author>{notes}</person>\
         </dblpperson>"
    )
}

// ── Citation indexes ────────────────────────────────────────────────────────

pub fn oc_citations(cited: &str, citing: &[&str]) -> Value {
    Value::Array(
        citing
            .iter()
            .enumerate()
            .map(|(i, c)| json!({ "oci": format!("0{i}-0{i}"), "cited": format!("coci => {cited}"), "citing": format!("coci => {c}") }))
            .collect(),
    )
}

/// A Semantic Scholar paper; each citation is `(doi, paper_id)`.
pub fn s2_paper(paper_id: &str, citations: &[(Option<&str>, &str)]) -> Value {
    let citations: Vec<Value> = citations
        .iter()
        .map(|(doi, pid)| json!({ "doi": doi, "paperId": pid, "title": "Citing work" }))
        .collect();
    json!({ "paperId": paper_id, "title": "A paper", "authors": [], "citations": citations })
}

pub fn oc_metadata(doi: &str, title: &str) -> Value {
    json!({ "doi": doi, "title": title, "author": "Silva, Ana", "year": "2020" })
}

// ── Crossref ────────────────────────────────────────────────────────────────

pub fn crossref_agency(doi: &str, agency: &str) -> Value {
    json!({
        "status": "ok",
        "message-type": "work-agency",
        "message-version": "1.0.0",
        "message": { "DOI": doi, "agency": { "id": agency, "label": agency } }
    })
}

pub fn crossref_author(family: &str, affiliations: &[&str], orcid: Option<&str>) -> Value {
    let affiliation: Vec<Value> = affiliations.iter().map(|a| json!({ "name": a })).collect();
    let mut author = json!({ "given": "A.", "family": family, "sequence": "additional", "affiliation": affiliation });
    if let Some(orcid) = orcid {
        author["ORCID"] = json!(format!("http://orcid.org/{orcid}"));
        author["authenticated-orcid"] = json!(false);
    }
    author
}

pub fn crossref_work(doi: &str, authors: Vec<Value>) -> Value {
    json!({
        "status": "ok",
        "message-type": "work",
        "message": { "DOI": doi, "title": ["A work"], "author": authors }
    })
}

// ── DataCite ────────────────────────────────────────────────────────────────

pub fn datacite_creator(name: &str, affiliations: &[&str], orcid: Option<&str>) -> Value {
    let identifiers: Vec<Value> = orcid
        .map(|o| vec![json!({
            "nameIdentifier": format!("https://orcid.org/{o}"),
            "nameIdentifierScheme": "ORCID",
            "schemeUri": "https://orcid.org"
        })])
        .unwrap_or_default();
    json!({ "name": name, "nameType": "Personal", "affiliation": affiliations, "nameIdentifiers": identifiers })
}

pub fn datacite_doi(doi: &str, creators: Vec<Value>) -> Value {
    json!({ "data": { "id": doi, "type": "dois", "attributes": { "doi": doi, "creators": creators } } })
}

// ── ORCID ───────────────────────────────────────────────────────────────────

pub fn orcid_person(countries: &[&str], biography: Option<&str>) -> Value {
    let address: Vec<Value> = countries
        .iter()
        .map(|c| json!({ "country": { "value": c }, "visibility": "public" }))
        .collect();
    json!({
        "name": { "given-names": { "value": "Ana" } },
        "addresses": { "address": address },
        "biography": biography.map(|b| json!({ "content": b, "visibility": "public" })),
    })
}

/// ORCID v3.0 employments: affiliation groups of employment summaries.
pub fn orcid_employments(countries: &[&str]) -> Value {
    let groups: Vec<Value> = countries
        .iter()
        .map(|c| json!({
            "summaries": [ { "employment-summary": {
                "organization": { "name": "Org", "address": { "city": "City", "country": c } }
            } } ]
        }))
        .collect();
    json!({ "affiliation-group": groups })
}
