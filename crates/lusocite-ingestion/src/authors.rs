//! DBLP author directory: author pid → affiliation notes of their DBLP
//! person record, cached as `{authors_dir}/authors.json`.

use std::path::Path;

use lusocite_common::{Cache, Result};
use tracing::{info, warn};

use crate::models::Publication;
use crate::sources::dblp::{parse_affiliations, DblpApi};

pub const AUTHORS_FILE: &str = "authors.json";

pub type AuthorDirectory = Cache<Vec<String>>;

pub fn open_directory(authors_dir: &Path) -> Result<AuthorDirectory> {
    Cache::open(authors_dir.join(AUTHORS_FILE))
}

/// Affiliations of one author, or `None` on a transient failure.
pub async fn author_affiliations(dblp: &dyn DblpApi, pid: &str) -> Result<Option<Vec<String>>> {
    let parsed = dblp
        .person_xml(pid)
        .await
        .and_then(|xml| parse_affiliations(&xml));
    match parsed {
        Ok(affiliations) => Ok(Some(affiliations)),
        Err(e) if e.is_transient() => {
            warn!(pid, registry = "dblp", error = %e, "Person record unavailable");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Fetch every author of `publications` missing from `directory`.
/// Saves after each new author; returns how many were added.
pub async fn load_authors(
    dblp: &dyn DblpApi,
    directory: &mut AuthorDirectory,
    publications: &[Publication],
) -> Result<usize> {
    let mut added = 0;
    for publication in publications {
        for pid in publication.author_pids() {
            if directory.contains_key(pid) {
                continue;
            }
            if let Some(affiliations) = author_affiliations(dblp, pid).await? {
                directory.insert(pid, affiliations);
                directory.save()?;
                added += 1;
            }
        }
    }
    info!(added, total = directory.len(), "Author directory updated");
    Ok(added)
}
