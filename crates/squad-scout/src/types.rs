//! Core data types for acquired player profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a record was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOrigin {
    /// Parsed from live markup returned by a network strategy.
    LiveParse,
    /// Synthesized from the shape of the source URL.
    UrlStructural,
}

/// A player profile as acquired from the external source.
///
/// Records are never mutated after construction; the cache and callers each
/// hold their own clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub source_id: u64,
    pub name: Option<String>,
    pub overall_rating: Option<u32>,
    pub potential_rating: Option<u32>,
    pub positions: Option<Vec<String>>,
    pub age: Option<u32>,
    pub club: Option<String>,
    pub nationality: Option<String>,
    /// Source-site data version the profile belongs to.
    pub version_id: Option<u64>,
    pub origin: RecordOrigin,
    pub observed_at: DateTime<Utc>,
}

impl PlayerRecord {
    /// Build a live-parsed record from extracted fields.
    pub fn from_fields(
        source_id: u64,
        fields: PlayerFields,
        version_id: Option<u64>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source_id,
            name: fields.name,
            overall_rating: fields.overall_rating,
            potential_rating: fields.potential_rating,
            positions: fields.positions,
            age: fields.age,
            club: fields.club,
            nationality: fields.nationality,
            version_id,
            origin: RecordOrigin::LiveParse,
            observed_at,
        }
    }
}

/// Partial record produced by the HTML extractor, before an identity and
/// origin are attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerFields {
    pub name: Option<String>,
    pub overall_rating: Option<u32>,
    pub potential_rating: Option<u32>,
    pub positions: Option<Vec<String>>,
    pub age: Option<u32>,
    pub club: Option<String>,
    pub nationality: Option<String>,
}

impl PlayerFields {
    /// A result is worth keeping only if the rating or the name came through.
    pub fn has_strong_signal(&self) -> bool {
        self.overall_rating.is_some() || self.name.is_some()
    }

    /// Number of fields that were recovered.
    pub fn filled(&self) -> usize {
        [
            self.name.is_some(),
            self.overall_rating.is_some(),
            self.potential_rating.is_some(),
            self.positions.is_some(),
            self.age.is_some(),
            self.club.is_some(),
            self.nationality.is_some(),
        ]
        .iter()
        .filter(|f| **f)
        .count()
    }
}

/// Snapshot of the cache contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    /// Cached external identifiers, ascending.
    pub keys: Vec<u64>,
}

/// Snapshot of the rate limiter's current window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindowStatus {
    pub request_count: u32,
    pub window_reset_at: DateTime<Utc>,
    pub max_requests: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_signal_requires_rating_or_name() {
        let mut fields = PlayerFields {
            nationality: Some("Norway".to_string()),
            club: Some("Manchester City".to_string()),
            ..Default::default()
        };
        assert!(!fields.has_strong_signal());

        fields.overall_rating = Some(91);
        assert!(fields.has_strong_signal());

        let named = PlayerFields {
            name: Some("Erling Haaland".to_string()),
            ..Default::default()
        };
        assert!(named.has_strong_signal());
        assert_eq!(named.filled(), 1);
    }

    #[test]
    fn test_origin_serializes_snake_case() {
        let json = serde_json::to_string(&RecordOrigin::UrlStructural).unwrap();
        assert_eq!(json, "\"url_structural\"");
        let json = serde_json::to_string(&RecordOrigin::LiveParse).unwrap();
        assert_eq!(json, "\"live_parse\"");
    }

    #[test]
    fn test_from_fields_marks_live_parse() {
        let fields = PlayerFields {
            name: Some("Kevin De Bruyne".to_string()),
            overall_rating: Some(91),
            ..Default::default()
        };
        let record = PlayerRecord::from_fields(192985, fields, None, Utc::now());
        assert_eq!(record.source_id, 192985);
        assert_eq!(record.origin, RecordOrigin::LiveParse);
        assert_eq!(record.overall_rating, Some(91));
        assert!(record.version_id.is_none());
    }
}
