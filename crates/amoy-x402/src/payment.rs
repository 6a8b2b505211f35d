use alloy::primitives::{Address, FixedBytes};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Token metadata the server supplies for EIP-712 domain separation.
///
/// Both fields are optional on the wire: offers for other chains carry
/// different keys here. They are required only once an offer is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentExtra {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PaymentExtra {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
        }
    }
}

/// A single entry in the `accepts` array of a 402 response.
///
/// Chain-specific fields stay as the server sent them so that offers for
/// other networks still parse; they are validated after selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    pub scheme: String,
    pub network: String,
    /// Integer token amount, kept exactly as the server sent it.
    #[serde(default)]
    pub max_amount_required: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub pay_to: String,
    #[serde(default)]
    pub max_timeout_seconds: u64,
    #[serde(default)]
    pub asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<PaymentExtra>,
}

/// The 402 response body returned by the resource server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequiredBody {
    pub x402_version: u32,
    #[serde(default)]
    pub error: String,
    pub accepts: Vec<PaymentRequirements>,
}

/// EIP-3009 `TransferWithAuthorization` message in its JSON form.
///
/// Integer fields travel as decimal strings so no wallet or server ever
/// routes them through floating point. `to` and `value` are the offer's
/// `payTo` and `maxAmountRequired`, copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferAuthorization {
    pub from: Address,
    pub to: String,
    pub value: String,
    #[serde(with = "decimal_u64")]
    pub valid_after: u64,
    #[serde(with = "decimal_u64")]
    pub valid_before: u64,
    pub nonce: FixedBytes<32>,
}

/// One `{name, type}` entry of an EIP-712 type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TypedField {
    fn new(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

/// The `eth_signTypedData_v4` document handed to a signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataRequest {
    pub types: BTreeMap<String, Vec<TypedField>>,
    pub primary_type: String,
    pub domain: TypedDataDomain,
    pub message: TransferAuthorization,
}

/// Type definitions for the EIP-712 domain and `TransferWithAuthorization`.
pub fn transfer_with_authorization_types() -> BTreeMap<String, Vec<TypedField>> {
    let mut types = BTreeMap::new();
    types.insert(
        "EIP712Domain".to_string(),
        vec![
            TypedField::new("name", "string"),
            TypedField::new("version", "string"),
            TypedField::new("chainId", "uint256"),
            TypedField::new("verifyingContract", "address"),
        ],
    );
    types.insert(
        crate::PRIMARY_TYPE.to_string(),
        vec![
            TypedField::new("from", "address"),
            TypedField::new("to", "address"),
            TypedField::new("value", "uint256"),
            TypedField::new("validAfter", "uint256"),
            TypedField::new("validBefore", "uint256"),
            TypedField::new("nonce", "bytes32"),
        ],
    );
    types
}

mod decimal_u64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
