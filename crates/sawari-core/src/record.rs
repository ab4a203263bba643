//! Record model: kind-tagged catalog records and their dedup keys.
//!
//! The extractor emits generic JSON objects; each [`RecordKind`] carries the
//! field predicate that claims matching objects for its store, the CSV
//! column set, and the natural-key fields used for deduplication.

use serde_json::{Map, Value};

/// A structured record as emitted by the extractor: one JSON object.
pub type RawRecord = Map<String, Value>;

/// Composite natural key identifying uniqueness within one record kind.
/// Built from normalized field values, so `Punch  Adventure` and
/// `PUNCH ADVENTURE` collapse to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Uppercases and collapses internal whitespace. Keys from different sources
/// disagree on casing and spacing; raw values are persisted untouched and
/// only compared through this.
pub fn normalize_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// The eight catalog record kinds, one per persisted dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Model,
    Variant,
    Specification,
    Feature,
    Rating,
    ProsCons,
    Colour,
    Faq,
}

/// Routing order matters: Model's predicate is field-presence based and
/// would also claim rating rows, so narrower kinds are tried first.
pub const ALL_KINDS: [RecordKind; 8] = [
    RecordKind::Rating,
    RecordKind::Variant,
    RecordKind::Specification,
    RecordKind::Feature,
    RecordKind::ProsCons,
    RecordKind::Colour,
    RecordKind::Faq,
    RecordKind::Model,
];

impl RecordKind {
    /// Dataset file stem; `Models.json` / `Models.csv` etc.
    pub fn file_stem(self) -> &'static str {
        match self {
            RecordKind::Model => "Models",
            RecordKind::Variant => "Variants",
            RecordKind::Specification => "Specifications",
            RecordKind::Feature => "Features",
            RecordKind::Rating => "Ratings",
            RecordKind::ProsCons => "ProsCons",
            RecordKind::Colour => "ModelColors",
            RecordKind::Faq => "Faqs",
        }
    }

    /// CSV column set for the append-mode store.
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            RecordKind::Model => &[
                "brandName",
                "modelName",
                "modelDescription",
                "modelTagline",
                "modelIsHiglighted",
                "bodyType",
            ],
            RecordKind::Variant => &[
                "modelName",
                "makeYear",
                "variantName",
                "variantPrice",
                "variantFuelType",
                "variantSeatingCapacity",
                "variantType",
                "variantIsPopular",
                "variantMileage",
            ],
            RecordKind::Specification => &[
                "modelName",
                "makeYear",
                "variantName",
                "specificationCategoryName",
                "specificationName",
                "specificationValue",
            ],
            RecordKind::Feature => &[
                "modelName",
                "makeYear",
                "variantName",
                "featureCategoryName",
                "featureName",
                "featureValue",
                "featureIsHighlighted",
            ],
            RecordKind::Rating => &["modelName", "ratingCategoryName", "rating"],
            RecordKind::ProsCons => &["modelName", "prosConsType", "prosConsContent"],
            RecordKind::Colour => &["modelName", "colourName", "hexCode"],
            RecordKind::Faq => &["modelName", "faqQuestion", "faqAnswer"],
        }
    }

    /// Fields forming the dedup key for this kind.
    pub fn key_fields(self) -> &'static [&'static str] {
        match self {
            RecordKind::Model => &["brandName", "modelName"],
            RecordKind::Variant => &["modelName", "variantName"],
            RecordKind::Specification => &[
                "modelName",
                "variantName",
                "specificationCategoryName",
                "specificationName",
            ],
            RecordKind::Feature => &[
                "modelName",
                "variantName",
                "featureCategoryName",
                "featureName",
            ],
            RecordKind::Rating => &["modelName", "ratingCategoryName"],
            RecordKind::ProsCons => &["modelName", "prosConsType", "prosConsContent"],
            RecordKind::Colour => &["modelName", "colourName"],
            RecordKind::Faq => &["modelName", "faqQuestion"],
        }
    }

    /// Does this generic record belong to this kind? Mirrors the field
    /// checks the extraction side has always used to tag its output.
    pub fn matches(self, record: &RawRecord) -> bool {
        let has = |f: &str| record.contains_key(f);
        match self {
            RecordKind::Model => {
                has("modelName") && has("bodyType") && !has("ratingCategoryName")
            }
            RecordKind::Variant => has("variantName") && !has("specificationName") && !has("featureName"),
            RecordKind::Specification => has("specificationCategoryName") && has("specificationName"),
            RecordKind::Feature => has("featureCategoryName") && has("featureName"),
            RecordKind::Rating => has("ratingCategoryName"),
            RecordKind::ProsCons => has("prosConsType"),
            RecordKind::Colour => has("colourName"),
            RecordKind::Faq => has("faqQuestion"),
        }
    }

    /// First kind in routing order whose predicate claims the record.
    pub fn route(record: &RawRecord) -> Option<RecordKind> {
        ALL_KINDS.into_iter().find(|k| k.matches(record))
    }

    /// Dedup key from the record's natural-key fields. Missing fields
    /// contribute an empty component, as in the original key format.
    pub fn dedup_key(self, record: &RawRecord) -> DedupKey {
        let parts: Vec<String> = self
            .key_fields()
            .iter()
            .map(|f| normalize_key(&field_str(record, f).unwrap_or_default()))
            .collect();
        DedupKey(parts.join("_"))
    }
}

/// String view of a field; numbers and bools are rendered, null/missing is None.
pub fn field_str(record: &RawRecord, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
