//! Country-name normalisation against the ISO 3166-1 reference list.
//!
//! Registry exports spell countries inconsistently ("Vietnam", "Viet Nam",
//! "VNM"). Map views need one spelling per country, so every name is looked
//! up by alpha-2 code, alpha-3 code, reference name or a known alias,
//! case-insensitively. Unresolvable names pass through unchanged.

use std::collections::HashMap;
use std::sync::OnceLock;

use isocountry::CountryCode;

/// Common and official names that differ from the reference name,
/// mapped to alpha-2.
const ALIASES: &[(&str, &str)] = &[
    ("Bolivia", "BO"),
    ("Brunei", "BN"),
    ("Cape Verde", "CV"),
    ("Czech Republic", "CZ"),
    ("Democratic Republic of the Congo", "CD"),
    ("DR Congo", "CD"),
    ("Republic of the Congo", "CG"),
    ("Ivory Coast", "CI"),
    ("Cote d'Ivoire", "CI"),
    ("Swaziland", "SZ"),
    ("Iran", "IR"),
    ("North Korea", "KP"),
    ("South Korea", "KR"),
    ("Korea", "KR"),
    ("Laos", "LA"),
    ("Macedonia", "MK"),
    ("Micronesia", "FM"),
    ("Moldova", "MD"),
    ("Palestine", "PS"),
    ("Russia", "RU"),
    ("Syria", "SY"),
    ("Taiwan", "TW"),
    ("Tanzania", "TZ"),
    ("Turkey", "TR"),
    ("Turkiye", "TR"),
    ("UK", "GB"),
    ("Great Britain", "GB"),
    ("United Kingdom of Great Britain and Northern Ireland", "GB"),
    ("United States", "US"),
    ("United Kingdom", "GB"),
    ("USA", "US"),
    ("U.S.", "US"),
    ("United States of America", "US"),
    ("Venezuela", "VE"),
    ("Vietnam", "VN"),
    ("Burma", "MM"),
    ("East Timor", "TL"),
    ("The Gambia", "GM"),
    ("The Bahamas", "BS"),
    ("Vatican", "VA"),
    ("Reunion", "RE"),
    ("Curacao", "CW"),
];

fn lookup_table() -> &'static HashMap<String, &'static str> {
    static TABLE: OnceLock<HashMap<String, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut map = HashMap::new();
        for code in CountryCode::iter() {
            let name = code.name();
            map.insert(code.alpha2().to_lowercase(), name);
            map.insert(code.alpha3().to_lowercase(), name);
            map.insert(name.to_lowercase(), name);
        }
        for &(alias, alpha2) in ALIASES {
            if let Some(name) = map.get(&alpha2.to_lowercase()).copied() {
                map.insert(alias.to_lowercase(), name);
            }
        }
        map
    })
}

/// Reference name for a country, if it can be resolved.
pub fn lookup(name: &str) -> Option<&'static str> {
    lookup_table().get(&name.trim().to_lowercase()).copied()
}

/// Reference name for a country, or the input unchanged.
pub fn standardize_country(name: &str) -> String {
    lookup(name).map_or_else(|| name.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_names_and_codes() {
        assert_eq!(standardize_country("Brazil"), "Brazil");
        assert_eq!(standardize_country("BR"), "Brazil");
        assert_eq!(standardize_country("bra"), "Brazil");
        assert_eq!(standardize_country("  india "), "India");
    }

    #[test]
    fn test_aliases_resolve_to_the_coded_name() {
        assert_eq!(standardize_country("Vietnam"), standardize_country("VN"));
        assert_eq!(standardize_country("Bolivia"), standardize_country("BOL"));
        assert_eq!(standardize_country("USA"), standardize_country("United States"));
        assert_eq!(
            standardize_country("Democratic Republic of the Congo"),
            standardize_country("CD")
        );
        assert_ne!(standardize_country("CD"), standardize_country("CG"));
    }

    #[test]
    fn test_every_alias_resolves() {
        for (alias, alpha2) in ALIASES {
            assert!(lookup(alias).is_some(), "{alias} -> {alpha2} unresolved");
        }
    }

    #[test]
    fn test_unresolvable_names_pass_through() {
        assert_eq!(standardize_country("Unknown"), "Unknown");
        assert_eq!(standardize_country("Atlantis"), "Atlantis");
        assert_eq!(lookup("Atlantis"), None);
    }
}
