//! Registration record types.

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Canonical store key for a wallet address: trimmed, lowercase hex.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

/// Store key for a parsed address.
pub fn address_key(address: &Address) -> String {
    normalize_address(&address.to_string())
}

/// One user's registration, keyed by wallet address.
///
/// Written whole on every upsert; there are no field-level patches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    pub wallet_address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub portfolio_link: String,
    #[serde(flatten)]
    pub survey_answers: SurveyAnswers,
    #[serde(default)]
    pub deposit_paid: bool,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub deposit_tx_hash: Option<String>,
}

impl RegistrationRecord {
    /// Record written after a confirmed deposit.
    pub fn deposited(address: &Address, form: RegistrationForm, tx_hash: &TxHash) -> Self {
        Self {
            wallet_address: address_key(address),
            name: form.name,
            portfolio_link: form.portfolio_link,
            survey_answers: form.survey_answers,
            deposit_paid: true,
            deposit_tx_hash: Some(tx_hash.to_string()),
        }
    }

    /// Minimal stand-in for a depositor the store has never seen.
    pub fn placeholder(address: &Address) -> Self {
        Self {
            wallet_address: address_key(address),
            name: String::new(),
            portfolio_link: String::new(),
            survey_answers: SurveyAnswers::default(),
            deposit_paid: true,
            deposit_tx_hash: None,
        }
    }

    /// Normalized store key.
    pub fn key(&self) -> String {
        normalize_address(&self.wallet_address)
    }
}

/// What a user fills in before paying the deposit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub name: String,
    #[serde(default)]
    pub portfolio_link: String,
    #[serde(flatten)]
    pub survey_answers: SurveyAnswers,
}

/// Survey part of the registration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyAnswers {
    #[serde(default)]
    pub has_used_substrate_polkadot: bool,
    #[serde(default)]
    pub technologies_used: TechnologiesUsed,
    /// 1 (never heard of them) ..= 5 (use them daily).
    #[serde(default = "default_familiarity")]
    pub precompiles_familiarity: u8,
    /// Answers this version does not model, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for SurveyAnswers {
    fn default() -> Self {
        Self {
            has_used_substrate_polkadot: false,
            technologies_used: TechnologiesUsed::default(),
            precompiles_familiarity: default_familiarity(),
            extra: BTreeMap::new(),
        }
    }
}

fn default_familiarity() -> u8 {
    1
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnologiesUsed {
    pub ink: bool,
    pub evm_solidity: bool,
    #[serde(rename = "polkaVM")]
    pub polka_vm: bool,
    pub xcm: bool,
    pub polkadot_js_api: bool,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
