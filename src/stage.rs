use serde::Serialize;
use std::fmt;

use crate::models::Event;

/// Coarse interaction stage an event is grouped under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    Payment,
    WhatsApp,
    Auth,
    Issue,
    Booking,
    Other,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Payment => "Payment",
            Stage::WhatsApp => "WhatsApp",
            Stage::Auth => "Auth",
            Stage::Issue => "Issue",
            Stage::Booking => "Booking",
            Stage::Other => "Other",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an event from its title and filter tags.
/// Rules are checked in order and the first match wins.
pub fn classify_stage(event: &Event) -> Stage {
    let title = event.title().unwrap_or_default().to_lowercase();
    let tags: Vec<String> = event.filter_tags().iter().map(|t| t.to_lowercase()).collect();
    let has_tag = |tag: &str| tags.iter().any(|t| t == tag);

    if title.contains("payment") || has_tag("payments") {
        Stage::Payment
    } else if title.contains("whatsapp") || has_tag("whatsapp") {
        Stage::WhatsApp
    } else if title.contains("otp auth") || has_tag("otp") {
        Stage::Auth
    } else if title.contains("delivery") || has_tag("issue") {
        Stage::Issue
    } else if title.contains("booking") || title.contains("appointment") {
        Stage::Booking
    } else {
        Stage::Other
    }
}
