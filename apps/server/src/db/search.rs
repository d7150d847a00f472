//! Search parameters shared by every storage backend.

use costura_geo::{haversine_distance, Location};

use crate::models::Dressmaker;

/// Which discovery query to run. Exactly one mode per request.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchParams {
    Unfiltered,
    /// Any keyword matches any service tag.
    Keyword { keywords: Vec<String> },
    Proximity {
        center: Location,
        radius_meters: f64,
    },
    /// Within the radius and every keyword matches some tag.
    Combined {
        center: Location,
        radius_meters: f64,
        keywords: Vec<String>,
    },
}

impl SearchParams {
    pub fn mode(&self) -> &'static str {
        match self {
            SearchParams::Unfiltered => "unfiltered",
            SearchParams::Keyword { .. } => "keyword",
            SearchParams::Proximity { .. } => "proximity",
            SearchParams::Combined { .. } => "combined",
        }
    }

    pub fn area(&self) -> Option<(&Location, f64)> {
        match self {
            SearchParams::Proximity {
                center,
                radius_meters,
            }
            | SearchParams::Combined {
                center,
                radius_meters,
                ..
            } => Some((center, *radius_meters)),
            _ => None,
        }
    }

    pub fn keywords(&self) -> &[String] {
        match self {
            SearchParams::Keyword { keywords } | SearchParams::Combined { keywords, .. } => {
                keywords
            }
            _ => &[],
        }
    }

    /// Exact predicate, evaluated in memory.
    pub fn matches(&self, dressmaker: &Dressmaker) -> bool {
        match self {
            SearchParams::Unfiltered => true,
            SearchParams::Keyword { keywords } => matches_any(&dressmaker.services, keywords),
            SearchParams::Proximity {
                center,
                radius_meters,
            } => within(center, *radius_meters, dressmaker.location()),
            SearchParams::Combined {
                center,
                radius_meters,
                keywords,
            } => {
                within(center, *radius_meters, dressmaker.location())
                    && matches_all(&dressmaker.services, keywords)
            }
        }
    }

    /// Keep the matching candidates in result order: nearest first for
    /// geographic modes, oldest first otherwise. Ties break on id.
    pub fn rank(&self, candidates: Vec<Dressmaker>) -> Vec<Dressmaker> {
        let mut found: Vec<Dressmaker> = candidates
            .into_iter()
            .filter(|d| self.matches(d))
            .collect();
        match self.area() {
            Some((center, _)) => found.sort_by(|a, b| {
                haversine_distance(center, a.location())
                    .total_cmp(&haversine_distance(center, b.location()))
                    .then_with(|| a.id.cmp(&b.id))
            }),
            None => found.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            }),
        }
        found
    }
}

fn within(center: &Location, radius_meters: f64, point: &Location) -> bool {
    haversine_distance(center, point) <= radius_meters
}

/// Case-insensitive substring match of `keyword` inside `tag`.
pub fn tag_matches(tag: &str, keyword: &str) -> bool {
    tag.to_lowercase().contains(&keyword.to_lowercase())
}

pub fn matches_any(services: &[String], keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|k| services.iter().any(|tag| tag_matches(tag, k)))
}

pub fn matches_all(services: &[String], keywords: &[String]) -> bool {
    keywords
        .iter()
        .all(|k| services.iter().any(|tag| tag_matches(tag, k)))
}

/// Split a comma-separated keyword list. `\,` keeps a literal comma and `\\` a
/// backslash; blank entries are dropped.
pub fn split_keywords(input: &str) -> Vec<String> {
    split_unescaped(input, ',')
        .into_iter()
        .map(unescape)
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

fn split_unescaped(input: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    let bytes = input.as_bytes();
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 1;
                if i < bytes.len() && bytes[i].is_ascii() {
                    i += 1;
                }
            }
            b if b == sep as u8 => {
                out.push(&input[start..i]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    out.push(&input[start..]);
    out
}

fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ (',' | '\\')) => out.push(next),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Escape `%`, `_` and `\` for use inside an `ILIKE` pattern.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, CreateDressmaker};
    use uuid::Uuid;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn dressmaker_at(id: u128, lat: f64, lng: f64) -> Dressmaker {
        let mut d = Dressmaker::new(
            CreateDressmaker {
                email: format!("{id}@x.com"),
                password: "x".to_string(),
                name: "Test".to_string(),
                contact: "1".to_string(),
                services: tags(&["Costura"]),
                address: Address {
                    city: String::new(),
                    state: String::new(),
                    neighborhood: String::new(),
                    street: String::new(),
                    number: String::new(),
                    location: Location::new(lat, lng),
                },
            },
            "hash".to_string(),
        );
        d.id = Uuid::from_u128(id);
        d
    }

    #[test]
    fn equal_distances_are_ordered_by_id() {
        let params = SearchParams::Proximity {
            center: Location::new(-23.55, -46.63),
            radius_meters: 5_000.0,
        };
        let found = params.rank(vec![
            dressmaker_at(3, -23.551, -46.631),
            dressmaker_at(1, -23.551, -46.631),
            dressmaker_at(2, -23.56, -46.64),
        ]);
        let ids: Vec<_> = found.iter().map(|d| d.id.as_u128()).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn unranked_modes_order_by_creation_then_id() {
        let mut older = dressmaker_at(9, 0.0, 0.0);
        older.created_at = older.created_at - chrono::Duration::seconds(60);
        let same_a = dressmaker_at(5, 0.0, 0.0);
        let mut same_b = dressmaker_at(4, 0.0, 0.0);
        same_b.created_at = same_a.created_at;

        let found = SearchParams::Unfiltered.rank(vec![same_a, same_b, older]);
        let ids: Vec<_> = found.iter().map(|d| d.id.as_u128()).collect();
        assert_eq!(ids, vec![9, 4, 5]);
    }

    #[test]
    fn rank_drops_candidates_outside_the_radius() {
        let params = SearchParams::Proximity {
            center: Location::new(-23.55, -46.63),
            radius_meters: 5_000.0,
        };
        let found = params.rank(vec![dressmaker_at(1, -22.9068, -43.1729)]);
        assert!(found.is_empty());
    }

    #[test]
    fn keyword_is_case_insensitive_substring() {
        let services = tags(&["Costura sob medida"]);
        assert!(matches_any(&services, &tags(&["costura"])));
        assert!(!matches_any(&tags(&["Bordado"]), &tags(&["costura"])));
    }

    #[test]
    fn keyword_mode_is_or_combined_mode_is_and() {
        let services = tags(&["Bordado", "Ajustes"]);
        let keywords = tags(&["bordado", "costura"]);
        assert!(matches_any(&services, &keywords));
        assert!(!matches_all(&services, &keywords));
        assert!(matches_all(&services, &tags(&["bord", "ajus"])));
    }

    #[test]
    fn split_keywords_drops_blanks_and_honours_escapes() {
        assert_eq!(
            split_keywords(" costura , ,bordado,"),
            tags(&["costura", "bordado"])
        );
        assert_eq!(split_keywords(r"a\,b,c"), tags(&["a,b", "c"]));
        assert!(split_keywords(" , ").is_empty());
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
