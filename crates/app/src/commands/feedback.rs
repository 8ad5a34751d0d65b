//! `capture feedback`

use capture_domain::{CaptureError, ExtractionFeedback, ExtractionsContainer, Result};
use serde::Serialize;
use tracing::debug;

use crate::cli::FeedbackArgs;
use crate::context::AppContext;
use crate::utils::{callback_channel, execute_logged};

/// Result of the feedback command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReport {
    /// Document the feedback was sent for
    pub document_id: String,
    /// Names of the extractions whose value changed
    pub corrected: Vec<String>,
    /// Number of extractions sent, corrected or confirmed
    pub sent: usize,
}

/// Send the document's extractions back with the given corrections applied
///
/// Extractions that are not corrected are sent unchanged, which confirms
/// them.
///
/// # Errors
/// Returns [`CaptureError::Validation`] when no correction is given or a
/// correction names an unknown extraction.
pub async fn feedback(ctx: &AppContext, args: &FeedbackArgs) -> Result<FeedbackReport> {
    execute_logged("feedback", || async {
        if args.corrections.is_empty() {
            return Err(CaptureError::Validation(
                "nothing to send, pass at least one --set NAME=VALUE".into(),
            ));
        }

        let session = ctx.sessions().get_session().await?;
        let mut extractions = ctx.documents.get_extractions(&session, &args.document_id).await?;
        let corrected = apply_corrections(&mut extractions, &args.corrections)?;
        debug!(document_id = %args.document_id, corrected = corrected.len(), "corrections applied");

        let feedback = ExtractionFeedback::from_container(&extractions);
        let sent = feedback.extractions.len();

        let (callback, receiver) = callback_channel::<()>();
        ctx.network.send_feedback(args.document_id.clone(), feedback, callback);
        receiver.await?;

        Ok(FeedbackReport { document_id: args.document_id.clone(), corrected, sent })
    })
    .await
}

/// Overwrite extraction values, returning the names that actually changed
fn apply_corrections(
    extractions: &mut ExtractionsContainer,
    corrections: &[(String, String)],
) -> Result<Vec<String>> {
    let mut corrected = Vec::new();
    for (name, value) in corrections {
        let extraction = extractions.specific_extractions.get_mut(name).ok_or_else(|| {
            CaptureError::Validation(format!("document has no extraction named {name}"))
        })?;
        if extraction.value != *value {
            extraction.set_value(value.clone());
            corrected.push(name.clone());
        }
    }
    Ok(corrected)
}

#[cfg(test)]
mod tests {
    use capture_domain::Extraction;

    use super::*;

    fn container() -> ExtractionsContainer {
        let mut container = ExtractionsContainer::default();
        container
            .specific_extractions
            .insert("amountToPay".into(), Extraction::new("12.99:EUR", "amount"));
        container
            .specific_extractions
            .insert("paymentRecipient".into(), Extraction::new("Acme GmbH", "companyname"));
        container
    }

    #[test]
    fn test_apply_corrections_marks_changed_values() {
        let mut extractions = container();
        let corrected = apply_corrections(
            &mut extractions,
            &[
                ("amountToPay".to_string(), "13.50:EUR".to_string()),
                ("paymentRecipient".to_string(), "Acme GmbH".to_string()),
            ],
        )
        .unwrap();

        assert_eq!(corrected, vec!["amountToPay".to_string()]);
        let amount = extractions.get("amountToPay").unwrap();
        assert_eq!(amount.value, "13.50:EUR");
        assert!(amount.is_dirty);
        assert!(!extractions.get("paymentRecipient").unwrap().is_dirty);
    }

    #[test]
    fn test_apply_corrections_rejects_unknown_name() {
        let mut extractions = container();
        let err = apply_corrections(&mut extractions, &[("iban".to_string(), "DE00".to_string())])
            .unwrap_err();
        assert!(matches!(err, CaptureError::Validation(ref msg) if msg.contains("iban")));
    }
}
