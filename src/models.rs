use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::stage::Stage;

/// Channel keys checked in order; the first non-empty string wins
pub const CHANNEL_KEYS: [&str; 3] = ["📱 Channel", "🛒 Channel", "🧭 Channel"];
pub const SENTIMENT_KEY: &str = "🧠 Sentiment";
pub const UNKNOWN_CHANNEL: &str = "Unknown";
pub const DEFAULT_LABEL: &str = "Event";

/// Request body for POST /journey-insights
#[derive(Debug, Deserialize)]
pub struct InsightsRequest {
    pub events: Vec<Event>,
}

/// Response body for POST /journey-insights
#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub base: JourneyInsights,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// One customer-interaction event as produced upstream
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub time: String,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default, rename = "uiData")]
    pub ui_data: Option<UiData>,
    #[serde(default)]
    pub data: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UiData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "subTitle")]
    pub sub_title: Option<String>,
    #[serde(default, rename = "filterTags")]
    pub filter_tags: Option<Vec<String>>,
}

impl Event {
    pub fn title(&self) -> Option<&str> {
        self.ui_data.as_ref()?.title.as_deref()
    }

    pub fn sub_title(&self) -> Option<&str> {
        self.ui_data.as_ref()?.sub_title.as_deref()
    }

    pub fn filter_tags(&self) -> &[String] {
        self.ui_data
            .as_ref()
            .and_then(|ui| ui.filter_tags.as_deref())
            .unwrap_or(&[])
    }

    fn data_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.as_ref()?.get(key)
    }

    /// Identifier, falling back to the raw time string
    pub fn resolved_id(&self) -> serde_json::Value {
        match &self.id {
            Some(id) if !id.is_null() => id.clone(),
            _ => serde_json::Value::String(self.time.clone()),
        }
    }

    pub fn label(&self) -> String {
        self.title().unwrap_or(DEFAULT_LABEL).to_string()
    }

    pub fn channel(&self) -> String {
        CHANNEL_KEYS
            .iter()
            .filter_map(|key| self.data_value(key).and_then(|v| v.as_str()))
            .find(|channel| !channel.is_empty())
            .unwrap_or(UNKNOWN_CHANNEL)
            .to_string()
    }

    pub fn sentiment(&self) -> Option<serde_json::Value> {
        self.data_value(SENTIMENT_KEY).filter(|v| !v.is_null()).cloned()
    }
}

/// One enriched event in the chronological journey
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub id: serde_json::Value,
    pub label: String,
    pub subtitle: Option<String>,
    pub channel: String,
    pub time: String,
    pub category: Stage,
    pub sentiment: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_interactions: usize,
    pub channels_used: Vec<String>,
    pub first_contact: String,
    pub last_contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: Stage,
    pub label: Stage,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub from: Stage,
    pub to: Stage,
    pub count: usize,
    pub avg_minutes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Full derived view for one batch of events
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyInsights {
    pub summary: Summary,
    pub steps: Vec<Step>,
    pub graph: Graph,
}
