//! Payment request resolution models

use serde::{Deserialize, Serialize};

/// Payment details the user confirmed for a payment request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvePaymentInput {
    /// Payee name
    pub recipient: String,
    /// Payee IBAN
    pub iban: String,
    /// Payee BIC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    /// Amount in `<value>:<currency>` form, e.g. `"12.99:EUR"`
    pub amount: String,
    /// Payment reference
    pub purpose: String,
}

/// Payment recorded for a payment request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// ISO 8601 timestamp set by the backend
    pub paid_at: String,
    /// Payee name
    pub recipient: String,
    /// Payee IBAN
    pub iban: String,
    /// Payee BIC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    /// Amount in `<value>:<currency>` form
    pub amount: String,
    /// Payment reference
    pub purpose: String,
}
