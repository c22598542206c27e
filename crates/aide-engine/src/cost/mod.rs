mod label;
mod pricing;

pub use label::{CostLabel, LabeledCost};
pub use pricing::{CostEstimate, CostWarning, ModelRates, PricingTable, TOKENS_PER_RATE_UNIT};
