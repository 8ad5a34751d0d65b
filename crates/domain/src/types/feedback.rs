//! User corrections sent back for an analyzed document

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use super::extraction::{CompoundExtraction, Extraction, ExtractionsContainer};

/// Corrected extractions for one document
///
/// Serialized in the plain `{"feedback": ...}` form when no compound
/// extractions are included, otherwise in the
/// `{"extractions": ..., "compoundExtractions": ...}` form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionFeedback {
    /// Corrected specific extractions
    pub extractions: BTreeMap<String, Extraction>,
    /// Corrected compound extractions
    pub compound_extractions: BTreeMap<String, CompoundExtraction>,
}

impl ExtractionFeedback {
    /// Feedback for specific extractions only
    pub fn new(extractions: BTreeMap<String, Extraction>) -> Self {
        Self { extractions, compound_extractions: BTreeMap::new() }
    }

    /// Add compound extractions to the feedback
    pub fn with_compound_extractions(
        mut self,
        compound_extractions: BTreeMap<String, CompoundExtraction>,
    ) -> Self {
        self.compound_extractions = compound_extractions;
        self
    }

    /// Feedback confirming or correcting every extraction of a result
    pub fn from_container(container: &ExtractionsContainer) -> Self {
        Self {
            extractions: container.specific_extractions.clone(),
            compound_extractions: container.compound_extractions.clone(),
        }
    }

    /// Whether there is nothing to send
    pub fn is_empty(&self) -> bool {
        self.extractions.is_empty() && self.compound_extractions.is_empty()
    }

    /// Whether the request body uses the `{extractions, compoundExtractions}` form
    pub fn uses_compound_form(&self) -> bool {
        !self.compound_extractions.is_empty()
    }

    /// JSON body for the feedback endpoint
    pub fn to_request_body(&self) -> Value {
        let extractions = extraction_map(&self.extractions);

        if !self.uses_compound_form() {
            return json!({ "feedback": extractions });
        }

        let compound: Map<String, Value> = self
            .compound_extractions
            .iter()
            .map(|(name, compound)| {
                let rows: Vec<Value> = compound.rows.iter().map(extraction_map).collect();
                (name.clone(), Value::Array(rows))
            })
            .collect();

        json!({ "extractions": extractions, "compoundExtractions": compound })
    }
}

fn extraction_map(extractions: &BTreeMap<String, Extraction>) -> Value {
    let map: Map<String, Value> = extractions
        .iter()
        .map(|(name, extraction)| {
            (name.clone(), json!({ "value": extraction.value, "entity": extraction.entity }))
        })
        .collect();
    Value::Object(map)
}
