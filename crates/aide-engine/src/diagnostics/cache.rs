use aide_types::{Message, Role};
use serde::{Deserialize, Serialize};

use crate::cost::PricingTable;

/// Share of input-side tokens served from cache.
///
/// `None` when nothing was sent at all; an absent rate is not a zero rate.
pub fn cache_hit_rate(input_tokens: u64, cache_read_tokens: u64) -> Option<f64> {
    let denominator = input_tokens + cache_read_tokens;
    (denominator > 0).then(|| cache_read_tokens as f64 / denominator as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CallCacheRate {
    pub turn_index: u64,
    pub hit_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEfficiency {
    pub per_call: Vec<CallCacheRate>,
    /// Token-weighted rate over the whole session.
    pub hit_rate: Option<f64>,
    pub input_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_write_tokens: u64,
    /// Estimated USD saved by cache reads versus fresh input.
    pub savings_usd: f64,
}

pub fn analyze_cache(messages: &[Message], pricing: &PricingTable) -> CacheEfficiency {
    let mut per_call = Vec::new();
    let mut input_tokens = 0;
    let mut cache_read_tokens = 0;
    let mut cache_write_tokens = 0;
    let mut savings_usd = 0.0;

    for message in messages
        .iter()
        .filter(|m| m.role == Role::Assistant && m.is_api_call)
    {
        let usage = &message.usage;
        per_call.push(CallCacheRate {
            turn_index: message.turn_index,
            hit_rate: cache_hit_rate(usage.input_tokens, usage.cache_read_tokens),
        });
        input_tokens += usage.input_tokens;
        cache_read_tokens += usage.cache_read_tokens;
        cache_write_tokens += usage.cache_write_tokens;

        let (rates, _) = pricing.resolve(message.model.as_deref());
        savings_usd += rates.cache_savings(usage);
    }

    CacheEfficiency {
        per_call,
        hit_rate: cache_hit_rate(input_tokens, cache_read_tokens),
        input_tokens,
        cache_read_tokens,
        cache_write_tokens,
        savings_usd,
    }
}
