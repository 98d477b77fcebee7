use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::ProductId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(pub i64);

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payment status as reported by the backend. Anything outside the three
/// known values is kept verbatim in `Unrecognized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Unrecognized(String),
}

/// Presentation class for a payment status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Positive,
    Cautionary,
    Negative,
    Neutral,
}

impl PaymentStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "PENDING" => PaymentStatus::Pending,
            "SUCCESS" => PaymentStatus::Success,
            "FAILED" => PaymentStatus::Failed,
            other => PaymentStatus::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            PaymentStatus::Success => StatusTone::Positive,
            PaymentStatus::Pending => StatusTone::Cautionary,
            PaymentStatus::Failed => StatusTone::Negative,
            PaymentStatus::Unrecognized(_) => StatusTone::Neutral,
        }
    }
}

/// Map any raw status string to its presentation class.
pub fn status_tone(raw: &str) -> StatusTone {
    PaymentStatus::parse(raw).tone()
}

impl Serialize for PaymentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(PaymentStatus::parse(raw.as_deref().unwrap_or_default()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    /// May point at a product that no longer exists.
    pub product_id: ProductId,
    pub amount: f64,
    #[serde(default = "default_quantity", deserialize_with = "quantity_or_one")]
    pub quantity: u32,
    #[serde(default = "unrecognized_status")]
    pub status: PaymentStatus,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, rename = "stripeSessionId", alias = "sessionId")]
    pub session_id: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

fn unrecognized_status() -> PaymentStatus {
    PaymentStatus::Unrecognized(String::new())
}

fn quantity_or_one<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(match raw {
        Some(q) if q > 0 => q.min(u32::MAX as i64) as u32,
        _ => default_quantity(),
    })
}

/// RFC 3339 first, then a zone-less local date-time read as UTC. Anything
/// else becomes `None` instead of failing the whole snapshot.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let Ok(instant) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }
    match raw.parse::<NaiveDateTime>() {
        Ok(local) => Ok(Some(local.and_utc())),
        Err(e) => {
            tracing::warn!(timestamp = %raw, error = %e, "Unparseable payment timestamp");
            Ok(None)
        }
    }
}
