use serde::{Deserialize, Serialize};
use std::fmt;

/// How a computed amount is presented.
///
/// Subscription users pay a flat fee, so their amounts are API-rate
/// equivalents rather than money spent. The number itself never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostLabel {
    Spend,
    ApiEquivalent,
}

impl CostLabel {
    pub fn for_subscription(subscription_user: bool) -> Self {
        if subscription_user {
            CostLabel::ApiEquivalent
        } else {
            CostLabel::Spend
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CostLabel::Spend => "Spend",
            CostLabel::ApiEquivalent => "Est. API equivalent",
        }
    }
}

impl fmt::Display for CostLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledCost {
    pub usd: f64,
    pub label: CostLabel,
}

impl LabeledCost {
    pub fn new(usd: f64, subscription_user: bool) -> Self {
        Self {
            usd,
            label: CostLabel::for_subscription(subscription_user),
        }
    }
}

impl fmt::Display for LabeledCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ${:.2}", self.label, self.usd)
    }
}
