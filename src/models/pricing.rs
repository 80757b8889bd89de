//! Static per-model price table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Usage;

/// Price of one model, in USD per million tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ModelRates {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelRates {
    pub const fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    pub fn input_per_token(&self) -> f64 {
        self.input_per_million / 1_000_000.0
    }

    pub fn output_per_token(&self) -> f64 {
        self.output_per_million / 1_000_000.0
    }

    /// Cost of `usage` at these rates.
    pub fn cost(&self, usage: &Usage) -> f64 {
        usage.prompt_tokens as f64 * self.input_per_token()
            + usage.completion_tokens as f64 * self.output_per_token()
    }
}

/// Used for any model without an entry. Deliberately on the expensive side.
pub const DEFAULT_RATES: ModelRates = ModelRates::new(10.0, 30.0);

const BUILTIN_RATES: &[(&str, ModelRates)] = &[
    ("gpt-4o", ModelRates::new(2.5, 10.0)),
    ("gpt-4o-mini", ModelRates::new(0.15, 0.6)),
    ("gpt-4-turbo", ModelRates::new(10.0, 30.0)),
    ("gpt-4", ModelRates::new(30.0, 60.0)),
    ("gpt-4.1", ModelRates::new(2.0, 8.0)),
    ("gpt-4.1-mini", ModelRates::new(0.4, 1.6)),
    ("gpt-3.5-turbo", ModelRates::new(0.5, 1.5)),
    ("o1", ModelRates::new(15.0, 60.0)),
    ("o3-mini", ModelRates::new(1.1, 4.4)),
    ("claude-3-opus", ModelRates::new(15.0, 75.0)),
    ("claude-3-sonnet", ModelRates::new(3.0, 15.0)),
    ("claude-3-haiku", ModelRates::new(0.25, 1.25)),
    ("claude-3-5-sonnet", ModelRates::new(3.0, 15.0)),
    ("claude-3-5-haiku", ModelRates::new(0.8, 4.0)),
    ("claude-sonnet-4", ModelRates::new(3.0, 15.0)),
    ("claude-opus-4", ModelRates::new(15.0, 75.0)),
];

/// Immutable mapping from model identifier to rates.
///
/// Lookup is exact id first, then the longest entry that prefixes the id
/// (so `claude-3-5-sonnet-20241022` prices as `claude-3-5-sonnet`), then the
/// default pair.
#[derive(Debug, Clone)]
pub struct PriceTable {
    rates: HashMap<String, ModelRates>,
    default_rates: ModelRates,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PriceTable {
    /// An empty table; every model prices at `default_rates`.
    pub fn empty(default_rates: ModelRates) -> Self {
        Self {
            rates: HashMap::new(),
            default_rates,
        }
    }

    /// Table with the built-in entries for both model families.
    pub fn builtin() -> Self {
        let rates = BUILTIN_RATES
            .iter()
            .map(|(model, rates)| (model.to_string(), *rates))
            .collect();
        Self {
            rates,
            default_rates: DEFAULT_RATES,
        }
    }

    /// Add or replace entries, returning the new table.
    pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (S, ModelRates)>,
        S: Into<String>,
    {
        for (model, rates) in overrides {
            self.rates.insert(model.into(), rates);
        }
        self
    }

    pub fn with_default(mut self, default_rates: ModelRates) -> Self {
        self.default_rates = default_rates;
        self
    }

    /// Rates for `model`.
    pub fn rates_for(&self, model: &str) -> ModelRates {
        if let Some(rates) = self.rates.get(model) {
            return *rates;
        }
        self.rates
            .iter()
            .filter(|(prefix, _)| model.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, rates)| *rates)
            .unwrap_or(self.default_rates)
    }

    /// Cost of `usage` for `model`.
    pub fn cost(&self, model: &str, usage: &Usage) -> f64 {
        self.rates_for(model).cost(usage)
    }
}
