use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Backend-assigned product identifier. Opaque to the client apart from
/// being used in request paths and bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ProductId)
    }
}

/// A product as last reported by the backend. Never edited locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub price: f64,
    #[serde(deserialize_with = "non_negative_quantity")]
    pub available_quantity: u32,
    #[serde(default)]
    pub picture_url: Option<String>,
}

impl Product {
    pub fn is_purchasable(&self) -> bool {
        self.available_quantity > 0
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_negative_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    if raw < 0 {
        tracing::warn!(quantity = raw, "Backend reported negative stock, clamping to 0");
    }
    Ok(raw.clamp(0, u32::MAX as i64) as u32)
}
