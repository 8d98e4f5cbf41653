//! Widgets and the dashboard configuration that holds them.
//!
//! A widget is mostly opaque to the backend: only `id`, `allowInteraction`
//! and `data` carry meaning here. Every other field (type, position, size,
//! per-type settings) is kept verbatim in [`Widget::extra`] so that saving
//! and reloading a dashboard never loses anything the front end wrote.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Background used when a configuration does not carry one.
pub const DEFAULT_BACKGROUND: &str = "bg-slate-900";

/// A single UI unit on a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    /// Unique within one dashboard.
    pub id: String,
    /// Whether students may write `data` through the live session.
    #[serde(default)]
    pub allow_interaction: bool,
    /// Widget content. Students mutate this on interactive widgets. An
    /// explicit `null` is kept and written back as `null`.
    #[serde(default)]
    pub data: Value,
    /// Type-specific fields passed through uninterpreted.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Widget {
    /// Build a bare widget with no pass-through fields.
    pub fn new(id: impl Into<String>, allow_interaction: bool, data: Value) -> Self {
        Self {
            id: id.into(),
            allow_interaction,
            data,
            extra: Map::new(),
        }
    }
}

/// The widgets and background of one dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub widgets: Vec<Widget>,
    /// `None` on an incoming push means "leave the background alone".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
}

impl DashboardConfig {
    /// The background to use when this config seeds a new session.
    pub fn background_or_default(&self) -> String {
        self.bg
            .clone()
            .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string())
    }

    pub fn find_widget(&self, widget_id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == widget_id)
    }
}
