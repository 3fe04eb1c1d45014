//! Conference snapshot loader.
//!
//! A snapshot is the full DBLP publication list of one conference stream,
//! each hit tagged with the language of its title, cached as
//! `{conferences_dir}/{alias}.json`. A partial list is never returned or
//! written: any failed page voids the whole download.

use std::path::{Path, PathBuf};

use lusocite_common::store::{load_json, save_json};
use lusocite_common::Result;
use tracing::{info, instrument, warn};

use crate::language::{classify_publication, LanguageModel};
use crate::models::Publication;
use crate::sources::dblp::{parse_hits, parse_total, DblpApi, PAGE_SIZE};

pub fn snapshot_path(dir: &Path, alias: &str) -> PathBuf {
    dir.join(format!("{alias}.json"))
}

/// Fetch every page of `alias`. `None` if any request fails.
#[instrument(skip(dblp, model))]
pub async fn download(
    dblp: &dyn DblpApi,
    model: &dyn LanguageModel,
    alias: &str,
) -> Option<Vec<Publication>> {
    match fetch_all(dblp, alias).await {
        Ok(mut publications) => {
            for publication in &mut publications {
                classify_publication(model, publication);
            }
            info!(alias, n = publications.len(), "Downloaded conference");
            Some(publications)
        }
        Err(e) => {
            warn!(alias, registry = "dblp", error = %e, "Conference download failed");
            None
        }
    }
}

async fn fetch_all(dblp: &dyn DblpApi, alias: &str) -> Result<Vec<Publication>> {
    let head = dblp.search_page(alias, 0, 0).await?;
    let total = parse_total(&head)?;
    let pages = total.div_ceil(PAGE_SIZE);

    let mut publications = Vec::with_capacity(total);
    for page in 0..pages {
        let body = dblp.search_page(alias, PAGE_SIZE, page * PAGE_SIZE).await?;
        publications.extend(parse_hits(&body)?);
    }
    Ok(publications)
}

/// Cached snapshot of `alias`, downloading it when absent or when `force`d.
///
/// A failed download leaves any existing cache file untouched and yields
/// `None`.
pub async fn load(
    dir: &Path,
    dblp: &dyn DblpApi,
    model: &dyn LanguageModel,
    alias: &str,
    force: bool,
) -> Result<Option<Vec<Publication>>> {
    let path = snapshot_path(dir, alias);
    if !force && path.exists() {
        return Ok(Some(load_json(&path)?));
    }

    let Some(publications) = download(dblp, model, alias).await else {
        return Ok(None);
    };
    save_json(&publications, &path)?;
    Ok(Some(publications))
}

/// Publications of one year (all of them when `year` is `None`).
pub fn of_year<'a>(
    publications: &'a [Publication],
    year: Option<&'a str>,
) -> impl Iterator<Item = &'a Publication> + 'a {
    publications
        .iter()
        .filter(move |p| year.map_or(true, |y| p.year() == y))
}
