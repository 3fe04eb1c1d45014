//! Place-name lists behind the rule-based affiliation verdict.
//!
//! Entries are written as they appear in affiliations and normalised when
//! the patterns are built, so they compare against normalised text. Names
//! match on word boundaries: `para` (the state) must not fire inside
//! `separate`, nor `mali` at the end of `somali`.

use lazy_static::lazy_static;
use lusocite_common::Relation;
use regex::Regex;

use crate::normalise::normalise;

/// Portuguese-speaking countries and territories, in several spellings.
pub const LUSOPHONE_COUNTRIES: &[&str] = &[
    "mozambique", "mocambique", "moçambique", "brazil", "brasil", "angola",
    "cabo verde", "cape verde", "macau", "timor leste", "east timor",
    "equatorial guinea", "guine-bissau", "guinea-bissau", "portugal",
];

pub const BRAZILIAN_STATES: &[&str] = &[
    "acre", "alagoas", "amapa", "amazonas", "bahia", "ceara", "distrito federal",
    "espirito santo", "goias", "maranhao", "mato grosso", "mato grosso do sul",
    "minas gerais", "para", "paraiba", "parana", "pernambuco", "piaui",
    "rio de janeiro", "rio grande do norte", "rio grande do sul", "rondonia",
    "roraima", "santa catarina", "sao paulo", "sergipe", "tocantins",
];

/// ISO 3166 short names plus common English variants and misspellings.
pub const COUNTRIES: &[&str] = &[
    "afghanistan", "aland islands", "albania", "algeria", "american samoa", "andorra", "angola",
    "anguilla", "antarctica", "antigua and barbuda", "argentina", "armenia", "aruba", "australia",
    "austria", "azerbaijan", "bahamas", "bahrain", "bangladesh", "barbados", "belarus", "belgium",
    "belize", "benin", "bermuda", "bhutan", "bolivia", "bonaire", "bosnia and herzegovina", "bosnia",
    "herzegovina", "botswana", "bouvet", "british indian ocean territory", "brunei", "bulgaria",
    "burkina faso", "burundi", "cambodia", "cameroon", "canada", "cayman islands",
    "central african republic", "chad", "chile", "china", "christmas island",
    "cocos (keeling) islands", "keeling", "colombia", "comoros", "congo", "cook islands",
    "costa rica", "côte d'ivoire", "croatia", "cuba", "curaçao", "curacao", "cyprus", "czechia",
    "denmark", "djibouti", "dominica", "dominican republic", "ecuador", "egypt", "el salvador",
    "equatorial guinea", "eritrea", "estonia", "ethiopia", "falkland islands", "malvinas",
    "faroe islands", "fiji", "finland", "france", "french guiana", "french polynesia",
    "french southern territories", "gabon", "gambia", "georgia", "germany", "ghana", "gibraltar",
    "greece", "greenland", "grenada", "guadeloupe", "guam", "guatemala", "guernsey", "guinea",
    "guinea-bissau", "guyana", "haiti", "heard island and mcdonald islands", "holy see",
    "honduras", "hong kong", "hungary", "iceland", "india", "indonesia", "iran, islamic republic of",
    "iraq", "ireland", "isle of man", "israel", "italy", "jamaica", "japan", "jersey", "jordan",
    "kazakhstan", "kenya", "kiribati", "korea, democratic people's republic of",
    "korea, republic of", "kosovo", "kuwait", "kyrgyzstan", "lao people's democratic republic",
    "laos", "latvia", "lebanon", "lesotho", "liberia", "libya", "liechtenstein", "lithuania",
    "luxembourg", "macao", "north macedonia", "madagascar", "malawi", "malaysia", "maldives",
    "mali", "malta", "marshall islands", "martinique", "mauritania", "mauritius", "mayotte",
    "mexico", "micronesia, federated states of", "moldova, republic of", "monaco", "mongolia",
    "montenegro", "montserrat", "morocco", "mozambique", "myanmar", "namibia", "nauru", "nepal",
    "netherlands", "new caledonia", "new zealand", "nicaragua", "niger", "nigeria", "niue",
    "norfolk island", "northern mariana islands", "norway", "oman", "pakistan", "palau",
    "palestine, state of", "panama", "papua new guinea", "paraguay", "peru", "philippines",
    "pitcairn", "poland", "puerto rico", "qatar", "reunion", "romania", "russian federation",
    "rwanda", "saint barthélemy", "saint helena, ascension and tristan da cunha",
    "saint kitts and nevis", "saint lucia", "saint martin (french part)",
    "saint pierre and miquelon", "saint vincent and the grenadines", "samoa", "san marino",
    "sao tome and principe", "saudi arabia", "senegal", "serbia", "seychelles", "sierra leone",
    "singapore", "sint maarten (dutch part)", "slovakia", "slovenia", "solomon islands", "somalia",
    "south africa", "south georgia and the south sandwich islands", "south sudan", "spain",
    "sri lanka", "sudan", "suriname", "svalbard and jan mayen", "eswatini", "sweden",
    "switzerland", "syrian arab republic", "taiwan, province of china", "tajikistan",
    "tanzania, united republic of", "thailand", "timor-leste", "togo", "tokelau", "tonga",
    "trinidad and tobago", "tunisia", "türkiye", "turkmenistan", "turks and caicos islands",
    "tuvalu", "uganda", "ukraine", "united arab emirates",
    "united kingdom of great britain and northern ireland", "great britain", "northern ireland",
    "united states of america", "united states minor outlying islands", "uruguay", "uzbekistan",
    "vanuatu", "venezuela, bolivarian republic of", "viet nam", "virgin islands, british",
    "virgin islands, u.s.", "wallis and futuna", "western sahara", "yemen", "zambia", "zimbabwe",
    "united states", "iran", "united kingdom", "turkey", "itally", "russia",
];

/// ISO 3166-1 alpha-2 codes of the Lusophone countries, as used by ORCID.
pub const LUSOPHONE_ISO: &[&str] = &["AO", "BR", "CV", "GW", "MZ", "PT", "ST"];

fn alternation(names: &[&[&str]]) -> String {
    let mut entries: Vec<String> = names
        .iter()
        .flat_map(|list| list.iter())
        .map(|name| regex::escape(&normalise(name)))
        .collect();
    // Longest first so `mato grosso do sul` wins over `mato grosso`.
    entries.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    entries.dedup();
    entries.join("|")
}

lazy_static! {
    static ref LUSOPHONE_RE: Regex =
        Regex::new(&format!(r"\b(?:{})\b", alternation(&[BRAZILIAN_STATES, LUSOPHONE_COUNTRIES])))
            .expect("lusophone pattern");
    static ref COUNTRY_SUFFIX_RE: Regex =
        Regex::new(&format!(r"\b(?:{})$", alternation(&[COUNTRIES])))
            .expect("country pattern");
}

/// The place name that made `text` Lusophone, if any.
pub fn lusophone_match(text: &str) -> Option<&str> {
    if text.ends_with("brasil") || text.ends_with("brazil") {
        return Some(&text[text.len() - 6..]);
    }
    LUSOPHONE_RE.find(text).map(|m| m.as_str())
}

/// Country named at the end of `text`, if any.
pub fn trailing_country(text: &str) -> Option<&str> {
    COUNTRY_SUFFIX_RE.find(text).map(|m| m.as_str())
}

/// Verdict from the lists alone, on already-normalised text.
pub fn rule_based(text: &str) -> Relation {
    if lusophone_match(text).is_some() {
        Relation::Related
    } else if trailing_country(text).is_some() {
        Relation::Unrelated
    } else {
        Relation::Unknown
    }
}

pub fn is_lusophone_iso(code: &str) -> bool {
    LUSOPHONE_ISO.contains(&code.trim().to_ascii_uppercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brazilian_and_lusophone_affiliations_are_related() {
        assert_eq!(rule_based("universidade de sao paulo, brasil"), Relation::Related);
        assert_eq!(rule_based("universidade federal do para, belem"), Relation::Related);
        assert_eq!(rule_based("universidade de lisboa, portugal"), Relation::Related);
        assert_eq!(rule_based("universidade eduardo mondlane, maputo, moçambique"), Relation::Related);
        assert_eq!(rule_based("ufmgbrasil"), Relation::Related);
    }

    #[test]
    fn test_other_countries_are_unrelated() {
        assert_eq!(rule_based("mit, united states"), Relation::Unrelated);
        assert_eq!(rule_based("university of oxford, united kingdom"), Relation::Unrelated);
        assert_eq!(rule_based("icmc, virgin islands, u.s"), Relation::Unrelated);
    }

    #[test]
    fn test_unknown_places_stay_unknown() {
        assert_eq!(rule_based("some obscure institute, neverland"), Relation::Unknown);
        assert_eq!(rule_based(""), Relation::Unknown);
    }

    #[test]
    fn test_word_boundaries() {
        assert_eq!(rule_based("dept. of separate studies"), Relation::Unknown);
        assert_eq!(rule_based("massacre research lab, somali"), Relation::Unknown);
        assert_eq!(lusophone_match("cuiaba, mato grosso do sul"), Some("mato grosso do sul"));
    }

    #[test]
    fn test_lusophone_takes_precedence_over_country_suffix() {
        // `angola` is in both lists.
        assert_eq!(rule_based("universidade agostinho neto, angola"), Relation::Related);
    }

    #[test]
    fn test_iso_codes() {
        assert!(is_lusophone_iso("BR"));
        assert!(is_lusophone_iso("pt"));
        assert!(!is_lusophone_iso("US"));
    }
}
