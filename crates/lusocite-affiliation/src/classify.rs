//! Free-text classification: rule-based first, then the unknown-resolver.

use lusocite_common::resolver::{Subject, UnknownResolver};
use lusocite_common::{Cache, Relation, Result};
use tracing::debug;

use crate::gazetteer::rule_based;
use crate::normalise::normalise;

/// Verdict for one affiliation string, memoised per normalised form.
///
/// A string is put to the resolver at most once: any definite answer,
/// rule-based or resolved, is stored permanently. An empty string is
/// `Unknown` without asking.
pub fn classify_affiliation(
    affiliations: &mut Cache<bool>,
    resolver: &mut dyn UnknownResolver,
    raw: &str,
) -> Result<Relation> {
    let key = normalise(raw);
    if key.is_empty() {
        return Ok(Relation::Unknown);
    }
    if let Some(&related) = affiliations.get(&key) {
        return Ok(Relation::from_bool(related));
    }

    let relation = decide(resolver, Subject::Affiliation, &key)?;
    if let Some(related) = relation.as_bool() {
        affiliations.insert(key.clone(), related);
    }
    debug!(affiliation = %key, %relation, "Classified affiliation");
    Ok(relation)
}

/// Verdict for free text that is not memoised (ORCID biographies).
pub fn classify_text(resolver: &mut dyn UnknownResolver, subject: Subject, raw: &str) -> Result<Relation> {
    let text = normalise(raw);
    if text.is_empty() {
        return Ok(Relation::Unknown);
    }
    decide(resolver, subject, &text)
}

fn decide(resolver: &mut dyn UnknownResolver, subject: Subject, text: &str) -> Result<Relation> {
    match rule_based(text) {
        Relation::Unknown => Ok(Relation::from(resolver.resolve(subject, text)?)),
        known => Ok(known),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lusocite_common::resolver::CannedResolver;

    #[test]
    fn test_rule_based_verdicts_are_cached_without_asking() {
        let mut cache = Cache::in_memory();
        let mut resolver = CannedResolver::new();

        let r = classify_affiliation(&mut cache, &mut resolver, "Universidade de São Paulo, Brasil").unwrap();
        assert_eq!(r, Relation::Related);
        let r = classify_affiliation(&mut cache, &mut resolver, "MIT, United States").unwrap();
        assert_eq!(r, Relation::Unrelated);

        assert!(resolver.asked().is_empty());
        assert_eq!(cache.get("universidade de sao paulo, brasil"), Some(&true));
        assert_eq!(cache.get("mit, united states"), Some(&false));
    }

    #[test]
    fn test_unknown_is_asked_once_per_normalised_form() {
        let mut cache = Cache::in_memory();
        let mut resolver = CannedResolver::new().answer("some obscure institute, neverland", true);

        for raw in ["Some Obscure Institute, Neverland", "some obscure institute, neverland.", " SOME OBSCURE INSTITUTE, NEVERLAND"] {
            let r = classify_affiliation(&mut cache, &mut resolver, raw).unwrap();
            assert_eq!(r, Relation::Related);
        }
        assert_eq!(resolver.times_asked("some obscure institute, neverland"), 1);
    }

    #[test]
    fn test_unanswered_question_is_not_cached() {
        let mut cache = Cache::in_memory();
        let mut resolver = CannedResolver::new();

        assert_eq!(classify_affiliation(&mut cache, &mut resolver, "Neverland Lab").unwrap(), Relation::Unknown);
        assert_eq!(classify_affiliation(&mut cache, &mut resolver, "Neverland Lab").unwrap(), Relation::Unknown);
        assert_eq!(resolver.times_asked("neverland lab"), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_empty_affiliation_is_unknown_without_asking() {
        let mut cache = Cache::in_memory();
        let mut resolver = CannedResolver::new().otherwise(Some(true));
        assert_eq!(classify_affiliation(&mut cache, &mut resolver, " ; ").unwrap(), Relation::Unknown);
        assert!(resolver.asked().is_empty());
    }

    #[test]
    fn test_biography_goes_through_the_same_rules_unmemoised() {
        let mut resolver = CannedResolver::new().otherwise(Some(false));
        let r = classify_text(&mut resolver, Subject::Biography, "Professor at UFRJ, Rio de Janeiro").unwrap();
        assert_eq!(r, Relation::Related);
        let r = classify_text(&mut resolver, Subject::Biography, "I like graphs.").unwrap();
        assert_eq!(r, Relation::Unrelated);
        assert_eq!(resolver.asked(), &[(Subject::Biography, "i like graphs".to_string())]);
    }
}
