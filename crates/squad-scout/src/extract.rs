//! Tolerant player-field extraction from raw profile markup.
//!
//! The set of fields, where to look for each, and how to coerce what is
//! found live in one declarative table ([`FIELD_RULES`]). Each field is
//! evaluated independently: a lookup that finds nothing, or finds text that
//! does not coerce, falls through to the next lookup for the same field and
//! never affects any other field. Whether the partial result is worth
//! keeping is decided afterwards by [`PlayerFields::has_strong_signal`].

use crate::types::PlayerFields;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// A field the extractor knows how to recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    OverallRating,
    PotentialRating,
    Positions,
    Age,
    Club,
    Nationality,
}

/// Where to look for a field's raw text.
#[derive(Debug, Clone, Copy)]
pub enum Lookup {
    /// Text of the first matching element with non-empty text.
    Text(&'static str),
    /// Attribute of the first matching element that carries it.
    Attr(&'static str, &'static str),
    /// Texts of every matching element.
    AllText(&'static str),
    /// A key on a JSON-LD `Person` object.
    JsonLd(&'static str),
}

/// How raw text becomes a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerce {
    Text,
    Integer,
    List,
}

/// One row of the extraction table.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub lookups: &'static [Lookup],
    pub coerce: Coerce,
}

/// Extraction table, one row per field. Lookups are tried in order.
pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::Name,
        lookups: &[
            Lookup::Text(r#"[data-field="name"]"#),
            Lookup::Text(".profile h1"),
            Lookup::Text("div.info h1"),
            Lookup::Text("h1.player-name"),
            Lookup::JsonLd("name"),
        ],
        coerce: Coerce::Text,
    },
    FieldRule {
        field: Field::OverallRating,
        lookups: &[
            Lookup::Text(r#"[data-field="overall"]"#),
            Lookup::Text(r#"[data-col="oa"]"#),
            Lookup::Text(".overall-rating"),
            Lookup::Text(".player-overall"),
        ],
        coerce: Coerce::Integer,
    },
    FieldRule {
        field: Field::PotentialRating,
        lookups: &[
            Lookup::Text(r#"[data-field="potential"]"#),
            Lookup::Text(r#"[data-col="pt"]"#),
            Lookup::Text(".potential-rating"),
            Lookup::Text(".player-potential"),
        ],
        coerce: Coerce::Integer,
    },
    FieldRule {
        field: Field::Positions,
        lookups: &[
            Lookup::AllText(r#"[data-field="positions"] span"#),
            Lookup::AllText(".player-positions .pos"),
            Lookup::AllText("div.info .pos"),
        ],
        coerce: Coerce::List,
    },
    FieldRule {
        field: Field::Age,
        lookups: &[
            Lookup::Text(r#"[data-field="age"]"#),
            Lookup::Text(r#"[data-col="ae"]"#),
            Lookup::Text(".player-age"),
        ],
        coerce: Coerce::Integer,
    },
    FieldRule {
        field: Field::Club,
        lookups: &[
            Lookup::Text(r#"[data-field="club"]"#),
            Lookup::Text(".player-club a"),
            Lookup::Text(".player-club"),
            Lookup::JsonLd("affiliation"),
        ],
        coerce: Coerce::Text,
    },
    FieldRule {
        field: Field::Nationality,
        lookups: &[
            Lookup::Text(r#"[data-field="nationality"]"#),
            Lookup::Attr("div.info .meta a[title]", "title"),
            Lookup::Text(".player-nationality"),
            Lookup::JsonLd("nationality"),
        ],
        coerce: Coerce::Text,
    },
];

const JSONLD_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

enum CompiledLookup {
    Text(Selector),
    Attr(Selector, &'static str),
    AllText(Selector),
    JsonLd(&'static str),
}

struct CompiledRule {
    field: Field,
    lookups: Vec<CompiledLookup>,
    coerce: Coerce,
}

/// Field extractor with its selector table compiled once.
pub struct HtmlExtractor {
    rules: Vec<CompiledRule>,
    jsonld: Option<Selector>,
}

impl HtmlExtractor {
    /// Compile the default [`FIELD_RULES`] table.
    pub fn new() -> Self {
        Self::with_rules(FIELD_RULES)
    }

    /// Compile a custom table. Selectors that fail to parse are skipped.
    pub fn with_rules(rules: &[FieldRule]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| CompiledRule {
                field: rule.field,
                lookups: rule.lookups.iter().filter_map(compile_lookup).collect(),
                coerce: rule.coerce,
            })
            .collect();

        Self {
            rules,
            jsonld: Selector::parse(JSONLD_SELECTOR).ok(),
        }
    }

    /// Extract a partial record, or `None` when neither rating nor name
    /// could be recovered.
    pub fn extract(&self, markup: &str) -> Option<PlayerFields> {
        let fields = self.extract_fields(markup);
        if fields.has_strong_signal() {
            Some(fields)
        } else {
            tracing::debug!(
                "discarding extraction with {} weak fields and no rating or name",
                fields.filled()
            );
            None
        }
    }

    /// Run every rule and return whatever was found, without the
    /// strong-signal check.
    pub fn extract_fields(&self, markup: &str) -> PlayerFields {
        let document = Html::parse_document(markup);
        let persons = match &self.jsonld {
            Some(sel) => jsonld_persons(&document, sel),
            None => Vec::new(),
        };

        let mut fields = PlayerFields::default();
        for rule in &self.rules {
            let value = rule
                .lookups
                .iter()
                .find_map(|lookup| coerce(rule.coerce, lookup_raw(&document, &persons, lookup)));
            if let Some(value) = value {
                apply(&mut fields, rule.field, value);
            }
        }
        fields
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn compile_lookup(lookup: &Lookup) -> Option<CompiledLookup> {
    let parse = |css: &str| match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::warn!("skipping unparsable selector {css:?}: {e:?}");
            None
        }
    };

    match *lookup {
        Lookup::Text(css) => parse(css).map(CompiledLookup::Text),
        Lookup::Attr(css, attr) => parse(css).map(|sel| CompiledLookup::Attr(sel, attr)),
        Lookup::AllText(css) => parse(css).map(CompiledLookup::AllText),
        Lookup::JsonLd(key) => Some(CompiledLookup::JsonLd(key)),
    }
}

/// Coerced value of a single field.
enum FieldValue {
    Text(String),
    Integer(u32),
    List(Vec<String>),
}

fn apply(fields: &mut PlayerFields, field: Field, value: FieldValue) {
    match (field, value) {
        (Field::Name, FieldValue::Text(s)) => fields.name = Some(s),
        (Field::Club, FieldValue::Text(s)) => fields.club = Some(s),
        (Field::Nationality, FieldValue::Text(s)) => fields.nationality = Some(s),
        (Field::OverallRating, FieldValue::Integer(n)) => fields.overall_rating = Some(n),
        (Field::PotentialRating, FieldValue::Integer(n)) => fields.potential_rating = Some(n),
        (Field::Age, FieldValue::Integer(n)) => fields.age = Some(n),
        (Field::Positions, FieldValue::List(v)) => fields.positions = Some(v),
        (field, _) => tracing::debug!("rule for {field:?} has a mismatched coercion"),
    }
}

fn coerce(kind: Coerce, raw: Vec<String>) -> Option<FieldValue> {
    match kind {
        Coerce::Text => raw.into_iter().next().map(FieldValue::Text),
        Coerce::Integer => raw
            .first()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .map(FieldValue::Integer),
        Coerce::List => {
            let mut out: Vec<String> = Vec::new();
            for item in raw {
                if !out.contains(&item) {
                    out.push(item);
                }
            }
            if out.is_empty() {
                None
            } else {
                Some(FieldValue::List(out))
            }
        }
    }
}

/// Raw, whitespace-normalized, non-empty strings for one lookup.
fn lookup_raw(document: &Html, persons: &[Value], lookup: &CompiledLookup) -> Vec<String> {
    match lookup {
        CompiledLookup::Text(sel) => document
            .select(sel)
            .map(element_text)
            .find(|t| !t.is_empty())
            .into_iter()
            .collect(),
        CompiledLookup::Attr(sel, attr) => document
            .select(sel)
            .filter_map(|el| el.value().attr(attr))
            .map(normalize)
            .find(|t| !t.is_empty())
            .into_iter()
            .collect(),
        CompiledLookup::AllText(sel) => document
            .select(sel)
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect(),
        CompiledLookup::JsonLd(key) => persons
            .iter()
            .filter_map(|p| p.get(*key))
            .find_map(jsonld_text)
            .into_iter()
            .collect(),
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    normalize(&el.text().collect::<Vec<_>>().join(" "))
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// JSON-LD `Person` objects, including those nested in `@graph`.
fn jsonld_persons(document: &Html, sel: &Selector) -> Vec<Value> {
    let mut persons = Vec::new();
    for element in document.select(sel) {
        let text = element.inner_html();
        let Ok(value) = serde_json::from_str::<Value>(text.trim()) else {
            continue;
        };
        let graph = value.get("@graph").and_then(|g| g.as_array()).cloned();
        let items = match (graph, value) {
            (Some(graph), _) => graph,
            (None, Value::Array(arr)) => arr,
            (None, other) => vec![other],
        };
        persons.extend(
            items
                .into_iter()
                .filter(|v| v.get("@type").and_then(|t| t.as_str()) == Some("Person")),
        );
    }
    persons
}

fn jsonld_text(v: &Value) -> Option<String> {
    let s = match v {
        Value::String(s) => normalize(s),
        Value::Number(n) => n.to_string(),
        Value::Object(_) => v.get("name").and_then(|n| n.as_str()).map(normalize)?,
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"
        <html><body>
        <div class="profile">
          <h1>  Erling   Haaland </h1>
          <div class="player-positions"><span class="pos">ST</span><span class="pos">ST</span></div>
          <span data-field="overall">91</span>
          <span data-field="potential"> 94 </span>
          <span data-field="age">24</span>
          <div class="player-club"><a href="/team/10">Manchester City</a></div>
          <div data-field="nationality">Norway</div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_extract_full_profile() {
        let fields = HtmlExtractor::new().extract(PROFILE).unwrap();
        assert_eq!(fields.name.as_deref(), Some("Erling Haaland"));
        assert_eq!(fields.overall_rating, Some(91));
        assert_eq!(fields.potential_rating, Some(94));
        assert_eq!(fields.age, Some(24));
        assert_eq!(fields.positions, Some(vec!["ST".to_string()]));
        assert_eq!(fields.club.as_deref(), Some("Manchester City"));
        assert_eq!(fields.nationality.as_deref(), Some("Norway"));
    }

    #[test]
    fn test_weak_signal_rejected() {
        let html = r#"<html><body><div data-field="nationality">Norway</div></body></html>"#;
        let extractor = HtmlExtractor::new();
        assert!(extractor.extract(html).is_none());

        // The field itself was still recovered
        let fields = extractor.extract_fields(html);
        assert_eq!(fields.nationality.as_deref(), Some("Norway"));
    }

    #[test]
    fn test_non_numeric_rating_left_absent() {
        let html = r#"
            <h1 class="player-name">Phil Foden</h1>
            <span data-field="overall">N/A</span>
            <span data-field="age">twenty</span>
        "#;
        let fields = HtmlExtractor::new().extract(html).unwrap();
        assert_eq!(fields.name.as_deref(), Some("Phil Foden"));
        assert!(fields.overall_rating.is_none());
        assert!(fields.age.is_none());
    }

    #[test]
    fn test_falls_through_to_later_lookup() {
        let html = r#"
            <span data-field="overall">--</span>
            <span class="overall-rating">88</span>
        "#;
        let fields = HtmlExtractor::new().extract(html).unwrap();
        assert_eq!(fields.overall_rating, Some(88));
        assert!(fields.name.is_none());
    }

    #[test]
    fn test_rating_alone_is_strong() {
        let html = r#"<div data-col="oa"><em>85</em></div>"#;
        let fields = HtmlExtractor::new().extract(html);
        assert_eq!(fields.and_then(|f| f.overall_rating), Some(85));
    }

    #[test]
    fn test_jsonld_person_fallback() {
        let html = r#"
            <html><head>
            <script type="application/ld+json">
            { "@graph": [
                { "@type": "WebSite", "name": "Not a player" },
                { "@type": "Person", "name": "Bukayo Saka",
                  "nationality": { "@type": "Country", "name": "England" },
                  "affiliation": "Arsenal" }
            ] }
            </script>
            </head><body></body></html>
        "#;
        let fields = HtmlExtractor::new().extract(html).unwrap();
        assert_eq!(fields.name.as_deref(), Some("Bukayo Saka"));
        assert_eq!(fields.nationality.as_deref(), Some("England"));
        assert_eq!(fields.club.as_deref(), Some("Arsenal"));
    }

    #[test]
    fn test_malformed_markup_never_panics() {
        let inputs = [
            "",
            "<<<>>>",
            "<div data-field=\"overall\">77",
            "<script type=\"application/ld+json\">{ broken</script>",
            "\u{0}\u{feff}<h1 class=\"player-name\">",
        ];
        let extractor = HtmlExtractor::new();
        for input in inputs {
            let _ = extractor.extract(input);
        }
        let partial = extractor.extract("<div data-field=\"overall\">77");
        assert_eq!(partial.and_then(|f| f.overall_rating), Some(77));
    }

    #[test]
    fn test_bad_selector_skipped() {
        const RULES: &[FieldRule] = &[FieldRule {
            field: Field::Name,
            lookups: &[Lookup::Text("[[["), Lookup::Text("h2")],
            coerce: Coerce::Text,
        }];
        let fields = HtmlExtractor::with_rules(RULES).extract("<h2>Declan Rice</h2>");
        assert_eq!(fields.and_then(|f| f.name).as_deref(), Some("Declan Rice"));
    }
}
