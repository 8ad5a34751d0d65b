//! Extraction results returned for an analyzed document

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Location of an extraction on a page, in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// One-based page number
    pub page: u32,
    /// Left edge
    pub left: f64,
    /// Top edge
    pub top: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
}

/// A single extracted value, e.g. `amountToPay = "12.99:EUR"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Extracted value
    pub value: String,
    /// Entity kind, e.g. `amount`
    #[serde(default)]
    pub entity: String,
    /// Where the value was found
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    /// Key into [`ExtractionsContainer::candidates`]
    #[serde(rename = "candidates", default, skip_serializing_if = "Option::is_none")]
    pub candidates_key: Option<String>,
    /// Set when the value was changed locally
    #[serde(skip)]
    pub is_dirty: bool,
}

impl Extraction {
    /// Extraction without a location
    pub fn new(value: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            entity: entity.into(),
            bounding_box: None,
            candidates_key: None,
            is_dirty: false,
        }
    }

    /// Replace the value and mark the extraction as user-corrected
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.is_dirty = true;
    }
}

/// Repeated group of extractions, e.g. the rows of `lineItems`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompoundExtraction {
    /// One map of named extractions per row
    pub rows: Vec<BTreeMap<String, Extraction>>,
}

impl CompoundExtraction {
    /// Compound extraction from rows
    pub fn new(rows: Vec<BTreeMap<String, Extraction>>) -> Self {
        Self { rows }
    }
}

/// Reason a customer may give when returning goods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnReason {
    /// Reason id
    pub id: String,
    /// Localized labels keyed as `description_<lang>`
    #[serde(flatten)]
    pub descriptions: BTreeMap<String, String>,
}

impl ReturnReason {
    /// Label for a language code such as `"de"`
    pub fn description(&self, language: &str) -> Option<&str> {
        self.descriptions.get(&format!("description_{language}")).map(String::as_str)
    }
}

/// All extractions of one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionsContainer {
    /// Named single-value extractions
    #[serde(rename = "extractions", default)]
    pub specific_extractions: BTreeMap<String, Extraction>,
    /// Named multi-row extractions such as line items
    #[serde(default)]
    pub compound_extractions: BTreeMap<String, CompoundExtraction>,
    /// Alternative values per entity
    #[serde(default)]
    pub candidates: BTreeMap<String, Vec<Extraction>>,
    /// Return reasons offered for the document
    #[serde(default)]
    pub return_reasons: Vec<ReturnReason>,
}

impl ExtractionsContainer {
    /// Specific extraction by name
    pub fn get(&self, name: &str) -> Option<&Extraction> {
        self.specific_extractions.get(name)
    }

    /// Alternative values the backend proposed for an extraction
    pub fn candidates_for(&self, name: &str) -> &[Extraction] {
        self.get(name)
            .and_then(|extraction| extraction.candidates_key.as_deref())
            .and_then(|key| self.candidates.get(key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether nothing was extracted
    pub fn is_empty(&self) -> bool {
        self.specific_extractions.is_empty() && self.compound_extractions.is_empty()
    }
}
