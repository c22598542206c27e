use aide_types::TokenUsage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rates are quoted in USD per this many tokens.
pub const TOKENS_PER_RATE_UNIT: f64 = 1_000_000.0;

/// Per-category prices for one model, in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelRates {
    pub input: f64,
    pub output: f64,
    pub cache_write: f64,
    pub cache_read: f64,
}

impl ModelRates {
    pub const fn new(input: f64, output: f64, cache_write: f64, cache_read: f64) -> Self {
        Self {
            input,
            output,
            cache_write,
            cache_read,
        }
    }

    /// Cost of one usage vector at these rates. Not rounded.
    pub fn cost(&self, usage: &TokenUsage) -> f64 {
        per_unit(usage.input_tokens) * self.input
            + per_unit(usage.output_tokens) * self.output
            + per_unit(usage.cache_write_tokens) * self.cache_write
            + per_unit(usage.cache_read_tokens) * self.cache_read
    }

    /// What the cache reads of `usage` would have cost as fresh input, minus what they did cost.
    pub fn cache_savings(&self, usage: &TokenUsage) -> f64 {
        per_unit(usage.cache_read_tokens) * (self.input - self.cache_read)
    }
}

fn per_unit(tokens: u64) -> f64 {
    tokens as f64 / TOKENS_PER_RATE_UNIT
}

/// Sonnet-class rates, used for unknown models.
const DEFAULT_RATES: ModelRates = ModelRates::new(3.00, 15.00, 3.75, 0.30);

/// Built-in Claude pricing keyed by model-id prefix.
///
/// Dated ids (`claude-sonnet-4-5-20250929`) resolve through longest-prefix matching.
const CLAUDE_RATES: &[(&str, ModelRates)] = &[
    ("claude-opus-4-5", ModelRates::new(5.00, 25.00, 6.25, 0.50)),
    ("claude-opus-4-1", ModelRates::new(15.00, 75.00, 18.75, 1.50)),
    ("claude-opus-4", ModelRates::new(15.00, 75.00, 18.75, 1.50)),
    ("claude-sonnet-4-5", ModelRates::new(3.00, 15.00, 3.75, 0.30)),
    ("claude-sonnet-4", ModelRates::new(3.00, 15.00, 3.75, 0.30)),
    ("claude-3-7-sonnet", ModelRates::new(3.00, 15.00, 3.75, 0.30)),
    ("claude-3-5-sonnet", ModelRates::new(3.00, 15.00, 3.75, 0.30)),
    ("claude-haiku-4-5", ModelRates::new(1.00, 5.00, 1.25, 0.10)),
    ("claude-3-5-haiku", ModelRates::new(0.80, 4.00, 1.00, 0.08)),
];

/// Non-fatal anomaly raised while pricing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostWarning {
    /// No table entry matched; the default rates were applied.
    UnknownModel { model: String },
}

/// Amount for one usage vector plus any warning raised while pricing it.
#[derive(Debug, Clone, PartialEq)]
pub struct CostEstimate {
    pub usd: f64,
    pub warning: Option<CostWarning>,
}

/// Model-id → rates lookup with a default for unmatched models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    pub default: ModelRates,
    #[serde(default)]
    pub models: BTreeMap<String, ModelRates>,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::default_claude()
    }
}

impl PricingTable {
    /// Table with only a default rate; every model is unknown.
    pub fn flat(default: ModelRates) -> Self {
        Self {
            default,
            models: BTreeMap::new(),
        }
    }

    pub fn default_claude() -> Self {
        Self {
            default: DEFAULT_RATES,
            models: CLAUDE_RATES
                .iter()
                .map(|(prefix, rates)| (prefix.to_string(), *rates))
                .collect(),
        }
    }

    /// Add or replace a prefix entry.
    pub fn insert(&mut self, prefix: impl Into<String>, rates: ModelRates) {
        self.models.insert(prefix.into(), rates);
    }

    /// Exact match, then longest prefix. `None` when nothing matches.
    pub fn lookup(&self, model: &str) -> Option<&ModelRates> {
        if let Some(rates) = self.models.get(model) {
            return Some(rates);
        }

        self.models
            .iter()
            .filter(|(prefix, _)| model.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, rates)| rates)
    }

    /// Rates for `model`, falling back to the default with a warning.
    pub fn resolve(&self, model: Option<&str>) -> (&ModelRates, Option<CostWarning>) {
        match model.and_then(|m| self.lookup(m)) {
            Some(rates) => (rates, None),
            None => (
                &self.default,
                Some(CostWarning::UnknownModel {
                    model: model.unwrap_or("").to_string(),
                }),
            ),
        }
    }

    /// Price one API call at its own model's rate.
    ///
    /// An unknown model only warns when there is usage to price.
    pub fn estimate(&self, usage: &TokenUsage, model: Option<&str>) -> CostEstimate {
        let (rates, warning) = self.resolve(model);
        CostEstimate {
            usd: rates.cost(usage),
            warning: if usage.is_zero() { None } else { warning },
        }
    }
}
