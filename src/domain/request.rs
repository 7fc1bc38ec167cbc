//! Admission requests and their outcomes.

use std::fmt;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::client::{Client, Tier};
use super::ids::ClientId;

/// A single incoming request to be admitted or rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub client_id: ClientId,
    /// Offset from the start of the run.
    #[serde(with = "secs_f64")]
    pub timestamp: Duration,
    pub tier: Tier,
    /// The client's predefined willingness to pay for this request.
    pub max_price: Decimal,
}

impl Request {
    /// A request carrying the client's own tier and willingness to pay.
    pub fn from_client(client: &Client, timestamp: Duration) -> Self {
        Self {
            client_id: client.id().clone(),
            timestamp,
            tier: client.tier(),
            max_price: client.max_willingness_to_pay(),
        }
    }
}

/// Admission decision taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestDecision {
    /// Admitted at an effective price of zero.
    AcceptedFree,
    /// Admitted and charged the effective price.
    AcceptedCharged,
    /// Effective price exceeds the client's willingness to pay.
    RejectedPrice,
    /// Premium request with no hard-SLA headroom left.
    RejectedHardSla,
}

impl RequestDecision {
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::AcceptedFree | Self::AcceptedCharged)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AcceptedFree => "accepted_free",
            Self::AcceptedCharged => "accepted_charged",
            Self::RejectedPrice => "rejected_price",
            Self::RejectedHardSla => "rejected_hard_sla",
        }
    }
}

impl fmt::Display for RequestDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestOutcome {
    pub request: Request,
    pub decision: RequestDecision,
    /// Congestion price in force when the request arrived, before the floor.
    pub dual_price: f64,
    /// Amount charged; zero when rejected or when charging is disabled.
    pub charge: Decimal,
    /// Time spent deciding.
    pub decision_time: Duration,
}

mod secs_f64 {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
