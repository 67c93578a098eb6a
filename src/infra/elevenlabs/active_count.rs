//! Decoder for the active-calls response.
//!
//! The endpoint has answered in several shapes over time. Shapes are tried in
//! a fixed order and the first match wins:
//!
//! 1. a bare number
//! 2. an object with `active_count` / `activeCount`
//! 3. an object with a `batch_calls` list (aggregated per [`CountStrategy`])
//! 4. an object with an `items` list
//! 5. a bare list
//!
//! Anything else counts as zero.

use serde_json::{Map, Value};

use crate::config::CountStrategy;

/// Sentinel status of an active entry in item lists.
const ACTIVE_ITEM_STATUS: &str = "active";

/// Recognised response shape, borrowed from the decoded body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveCallsShape<'a> {
    /// Body is the count itself.
    Count(u64),
    /// Object exposing an explicit active-count field.
    ActiveCountField(u64),
    /// Object with a list of batch records.
    BatchList(&'a [Value]),
    /// Object with a list of call items.
    ItemList(&'a [Value]),
    /// Top-level list of call items.
    BareList(&'a [Value]),
    /// None of the above.
    Unrecognized,
}

impl<'a> ActiveCallsShape<'a> {
    /// Classify a decoded body.
    #[must_use]
    pub fn classify(body: &'a Value) -> Self {
        if let Some(count) = number_count(body) {
            return Self::Count(count);
        }
        if let Value::Object(map) = body {
            if let Some(count) =
                aliased(map, "active_count", "activeCount").and_then(number_count)
            {
                return Self::ActiveCountField(count);
            }
            if let Some(batches) =
                aliased(map, "batch_calls", "batchCalls").and_then(Value::as_array)
            {
                return Self::BatchList(batches);
            }
            if let Some(items) = map.get("items").and_then(Value::as_array) {
                return Self::ItemList(items);
            }
        }
        if let Value::Array(items) = body {
            return Self::BareList(items);
        }
        Self::Unrecognized
    }
}

/// Turns an active-calls body into a count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCallsDecoder {
    active_statuses: Vec<String>,
    strategy: CountStrategy,
}

impl Default for ActiveCallsDecoder {
    fn default() -> Self {
        Self::new(["in_progress"], CountStrategy::default())
    }
}

impl ActiveCallsDecoder {
    /// Decoder counting batches whose status is in `active_statuses`.
    /// Statuses are matched case-insensitively.
    pub fn new<I, T>(active_statuses: I, strategy: CountStrategy) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            active_statuses: active_statuses
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            strategy,
        }
    }

    /// Active count for a decoded body.
    #[must_use]
    pub fn count(&self, body: &Value) -> u64 {
        match ActiveCallsShape::classify(body) {
            ActiveCallsShape::Count(n) | ActiveCallsShape::ActiveCountField(n) => n,
            ActiveCallsShape::BatchList(batches) => self.count_batches(batches),
            ActiveCallsShape::ItemList(items) | ActiveCallsShape::BareList(items) => {
                items.iter().filter(|item| is_active_item(item)).count() as u64
            }
            ActiveCallsShape::Unrecognized => 0,
        }
    }

    fn count_batches(&self, batches: &[Value]) -> u64 {
        let active = batches.iter().filter(|batch| self.is_active_batch(batch));
        match self.strategy {
            CountStrategy::Dispatched => active
                .map(|batch| {
                    batch
                        .get("total_calls_dispatched")
                        .and_then(lenient_count)
                        .unwrap_or(0)
                })
                .fold(0u64, u64::saturating_add),
            CountStrategy::Batches => active.count() as u64,
        }
    }

    fn is_active_batch(&self, batch: &Value) -> bool {
        let status = batch
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase();
        self.active_statuses.iter().any(|s| *s == status)
    }
}

fn aliased<'a>(map: &'a Map<String, Value>, snake: &str, camel: &str) -> Option<&'a Value> {
    map.get(snake)
        .filter(|v| !v.is_null())
        .or_else(|| map.get(camel))
}

/// `status` wins when it is a non-empty string, otherwise `state`.
fn is_active_item(item: &Value) -> bool {
    let status = item
        .get("status")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| item.get("state").and_then(Value::as_str));
    status == Some(ACTIVE_ITEM_STATUS)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_count(value: f64) -> Option<u64> {
    if !value.is_finite() {
        return None;
    }
    Some(if value <= 0.0 { 0 } else { value as u64 })
}

/// Count from a JSON number; negatives clamp to zero.
fn number_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(float_count)),
        _ => None,
    }
}

/// Count from a JSON number or numeric string.
fn lenient_count(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(float_count),
        other => number_count(other),
    }
}
