//! Network-free fallback that derives a minimal record from the URL shape.
//!
//! Profile URLs look like `.../player/{id}/{slug}/{version}/...`. When that
//! holds, the id, a readable name and the data version can be recovered
//! without any request, so this strategy always produces the same record
//! for the same URL.

use super::{FetchStrategy, FetchTarget};
use crate::error::{StrategyError, StrategyOutcome};
use crate::types::{PlayerRecord, RecordOrigin};
use async_trait::async_trait;
use chrono::Utc;
use tokio::time::Instant;

/// Components of a player profile path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerPath {
    pub player_id: u64,
    pub slug: String,
    pub version_id: u64,
}

/// Find `player/{id}/{slug}/{version}` among the URL's path segments.
///
/// Accepts absolute URLs and bare paths; query and fragment are ignored.
pub fn parse_player_path(source_url: &str) -> Option<PlayerPath> {
    let path = match url::Url::parse(source_url) {
        Ok(u) => u.path().to_string(),
        Err(_) => source_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    segments.windows(4).find_map(|w| {
        if !w[0].eq_ignore_ascii_case("player") {
            return None;
        }
        let player_id = parse_numeric(w[1])?;
        let version_id = parse_numeric(w[3])?;
        Some(PlayerPath {
            player_id,
            slug: decode_segment(w[2]),
            version_id,
        })
    })
}

/// Percent-decode a path segment. Invalid UTF-8 is replaced, not rejected.
fn decode_segment(segment: &str) -> String {
    percent_encoding::percent_decode_str(segment)
        .decode_utf8_lossy()
        .into_owned()
}

fn parse_numeric(segment: &str) -> Option<u64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Turn `erling-haaland` into `Erling Haaland`.
pub fn slug_to_name(slug: &str) -> String {
    slug.replace("%20", " ")
        .split(['-', '_', '+', ' '])
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Terminal fallback: parse the URL, never touch the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlStructuralStrategy;

impl UrlStructuralStrategy {
    pub fn record_for(source_url: &str) -> Option<PlayerRecord> {
        let path = parse_player_path(source_url)?;
        let name = slug_to_name(&path.slug);
        Some(PlayerRecord {
            source_id: path.player_id,
            name: if name.is_empty() { None } else { Some(name) },
            overall_rating: None,
            potential_rating: None,
            positions: None,
            age: None,
            club: None,
            nationality: None,
            version_id: Some(path.version_id),
            origin: RecordOrigin::UrlStructural,
            observed_at: Utc::now(),
        })
    }
}

#[async_trait]
impl FetchStrategy for UrlStructuralStrategy {
    fn name(&self) -> &'static str {
        "url_structural"
    }

    async fn attempt(&self, target: &FetchTarget<'_>, _deadline: Instant) -> StrategyOutcome {
        Self::record_for(target.source_url)
            .ok_or_else(|| StrategyError::MalformedSourceUrl(target.source_url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_url() {
        let path = parse_player_path("https://site.example/player/239085/erling-haaland/250001/")
            .unwrap();
        assert_eq!(
            path,
            PlayerPath {
                player_id: 239085,
                slug: "erling-haaland".to_string(),
                version_id: 250001,
            }
        );
    }

    #[test]
    fn test_parse_with_prefix_suffix_and_query() {
        let path = parse_player_path(
            "https://site.example/en/player/192985/kevin-de-bruyne/250001/live?attr=classic#top",
        )
        .unwrap();
        assert_eq!(path.player_id, 192985);
        assert_eq!(path.version_id, 250001);

        let bare = parse_player_path("/player/1/a/2").unwrap();
        assert_eq!(bare.player_id, 1);

        let encoded =
            parse_player_path("https://site.example/player/3/%C3%A9der-milit%C3%A3o/4/").unwrap();
        assert_eq!(encoded.slug, "éder-militão");
    }

    #[test]
    fn test_slug_keeps_query_reserved_characters() {
        let path = parse_player_path("/player/7/a%3Db&&c=/8").unwrap();
        assert_eq!(path.slug, "a=b&&c=");
        assert_eq!(decode_segment("joão+felix"), "joão+felix");
        assert_eq!(decode_segment("%FF-x"), "\u{FFFD}-x");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for url in [
            "https://site.example/",
            "https://site.example/player/abc/erling-haaland/250001/",
            "https://site.example/player/239085/erling-haaland/",
            "https://site.example/player/239085/erling-haaland/v25/",
            "https://site.example/team/10/manchester-city/250001/",
            "not a url at all",
            "",
        ] {
            assert!(parse_player_path(url).is_none(), "{url}");
        }
    }

    #[test]
    fn test_slug_to_name() {
        assert_eq!(slug_to_name("erling-haaland"), "Erling Haaland");
        assert_eq!(slug_to_name("kevin_de-bruyne"), "Kevin De Bruyne");
        assert_eq!(slug_to_name("vinicius%20junior"), "Vinicius Junior");
        assert_eq!(slug_to_name("--rodri--"), "Rodri");
        assert_eq!(slug_to_name("éder-militão"), "Éder Militão");
    }

    #[test]
    fn test_attempt_builds_structural_record() {
        let target = FetchTarget {
            source_url: "https://site.example/player/239085/erling-haaland/250001/",
            external_id: 239085,
        };
        let record =
            tokio_test::block_on(UrlStructuralStrategy.attempt(&target, Instant::now())).unwrap();
        assert_eq!(record.source_id, 239085);
        assert_eq!(record.name.as_deref(), Some("Erling Haaland"));
        assert_eq!(record.version_id, Some(250001));
        assert_eq!(record.origin, RecordOrigin::UrlStructural);
        assert!(record.overall_rating.is_none());
    }

    #[test]
    fn test_attempt_reports_malformed_url() {
        let target = FetchTarget {
            source_url: "https://site.example/players",
            external_id: 1,
        };
        let err = tokio_test::block_on(UrlStructuralStrategy.attempt(&target, Instant::now()))
            .unwrap_err();
        assert!(matches!(err, StrategyError::MalformedSourceUrl(_)));
    }
}
