//! ORCID identity classification.
//!
//! Decision order, first conclusive signal wins:
//! 1. postal addresses on the person record
//! 2. organisation addresses in the employment history
//! 3. the biography, through the free-text heuristic
//!
//! A computed verdict is stored on the ORCID record and never recomputed.

use lusocite_common::resolver::Subject;
use lusocite_common::{Relation, Result};
use lusocite_ingestion::models::{OrcidRecord, OrcidSection};
use lusocite_ingestion::Context;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::classify::classify_text;
use crate::gazetteer::is_lusophone_iso;

const ORCID_LEN: usize = 19;

/// The 19-character ORCID iD at the end of `raw` (usually a URL).
///
/// Some registries drop the final check character when it is `X`; that
/// shows up as a dash four characters from the end and is repaired.
pub fn canonical_orcid(raw: &str) -> Option<String> {
    let chars: Vec<char> = raw.trim().chars().collect();
    if chars.len() < ORCID_LEN - 1 {
        return None;
    }
    if chars[chars.len() - 4] == '-' {
        let mut id: String = chars[chars.len() - (ORCID_LEN - 1)..].iter().collect();
        id.push('X');
        return Some(id);
    }
    if chars.len() < ORCID_LEN {
        return None;
    }
    Some(chars[chars.len() - ORCID_LEN..].iter().collect())
}

/// Fetch whichever sections of `orcid` are not cached yet.
/// Returns whether both sections are now present.
pub async fn load_orcid(ctx: &mut Context, orcid: &str) -> Result<bool> {
    let mut complete = true;
    for section in OrcidSection::ALL {
        let cached = ctx
            .caches
            .orcid
            .get(orcid)
            .is_some_and(|r| r.section(section).is_some());
        if cached {
            continue;
        }
        match ctx.registries.orcid.read_section(orcid, section).await {
            Ok(body) => ctx.caches.orcid.entry_or_default(orcid).set_section(section, body),
            Err(e) if e.is_transient() => {
                warn!(orcid, section = section.as_str(), registry = "orcid", error = %e, "ORCID fetch failed");
                complete = false;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(complete)
}

/// What the structured parts of a record say.
#[derive(Debug, Clone, PartialEq)]
pub enum Evidence {
    Decided(Relation),
    Biography(String),
    Nothing,
}

fn array<'a>(value: &'a Value, pointer: &str) -> &'a [Value] {
    value.pointer(pointer).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

fn any_lusophone<'a>(codes: impl Iterator<Item = Option<&'a str>>) -> Relation {
    let mut codes = codes;
    Relation::from_bool(codes.any(|c| c.is_some_and(is_lusophone_iso)))
}

/// Employment summaries in either the v2 (`employment-summary[]`) or v3
/// (`affiliation-group[].summaries[].employment-summary`) layout.
fn employment_summaries(employments: &Value) -> Vec<&Value> {
    let mut out: Vec<&Value> = array(employments, "/employment-summary").iter().collect();
    for group in array(employments, "/affiliation-group") {
        for summary in array(group, "/summaries") {
            if let Some(employment) = summary.get("employment-summary") {
                out.push(employment);
            }
        }
    }
    out
}

fn country_code(address: &Value) -> Option<&str> {
    match address.get("country")? {
        Value::String(code) => Some(code),
        Value::Object(country) => country.get("value").and_then(Value::as_str),
        _ => None,
    }
}

pub fn evidence(record: &OrcidRecord) -> Evidence {
    let null = Value::Null;
    let person = record.person.as_ref().unwrap_or(&null);

    let addresses = array(person, "/addresses/address");
    if !addresses.is_empty() {
        return Evidence::Decided(any_lusophone(addresses.iter().map(country_code)));
    }

    if let Some(employments) = &record.employments {
        let summaries = employment_summaries(employments);
        if !summaries.is_empty() {
            return Evidence::Decided(any_lusophone(
                summaries
                    .iter()
                    .map(|s| s.pointer("/organization/address").and_then(country_code)),
            ));
        }
    }

    match person.pointer("/biography/content").and_then(Value::as_str) {
        Some(bio) if !bio.trim().is_empty() => Evidence::Biography(bio.to_string()),
        _ => Evidence::Nothing,
    }
}

/// Verdict for one ORCID iD, fetching and caching as needed.
#[instrument(skip(ctx))]
pub async fn classify_orcid(ctx: &mut Context, orcid: &str) -> Result<Relation> {
    if let Some(record) = ctx.caches.orcid.get(orcid) {
        if record.related_to_portuguese.is_known() {
            return Ok(record.related_to_portuguese);
        }
    }

    if !load_orcid(ctx, orcid).await? {
        return Ok(Relation::Unknown);
    }
    let Some(record) = ctx.caches.orcid.get(orcid) else { return Ok(Relation::Unknown) };

    let relation = match evidence(record) {
        Evidence::Decided(relation) => relation,
        Evidence::Biography(bio) => classify_text(ctx.resolver.as_mut(), Subject::Biography, &bio)?,
        Evidence::Nothing => Relation::Unknown,
    };

    if relation.is_known() {
        if let Some(record) = ctx.caches.orcid.get_mut(orcid) {
            record.related_to_portuguese = relation;
        }
    }
    debug!(orcid, %relation, "Classified ORCID");
    Ok(relation)
}
