use chrono::{DateTime, Utc};
use serde::Serialize;

/// Pay-as-you-go spend once the plan allowance is exhausted, in major currency units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverageSnapshot {
    pub limit: f64,
    pub used: f64,
    pub currency: String,
    pub percent: u32,
    pub out_of_credits: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepaidSnapshot {
    pub balance: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageWindow {
    pub utilization: f64,
    pub resets_at: Option<DateTime<Utc>>,
}

/// Rolling-window utilization as reported by the remote usage endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub five_hour: UsageWindow,
    pub seven_day: UsageWindow,
    pub seven_day_opus: UsageWindow,
    pub seven_day_sonnet: UsageWindow,
}
