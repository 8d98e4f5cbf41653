//! Live session state and the rules that mutate it.
//!
//! [`SessionState`] is the JSON blob stored in a session row. The teacher
//! owns its structure (widgets, background, pause flag, screenshot rounds);
//! students may only vote in polls, write `data` on interactive widgets, and
//! append screenshots.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::Timestamp;
use crate::widget::{DashboardConfig, Widget};

/// Submitter recorded for screenshots sent without a verified identity.
pub const ANONYMOUS_STUDENT: &str = "anonymous";

/// Vote counts for a two-option poll widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollTally {
    #[serde(rename = "A", default)]
    pub a: u64,
    #[serde(rename = "B", default)]
    pub b: u64,
}

/// A poll answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollOption {
    A,
    B,
}

impl FromStr for PollOption {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            other => Err(CoreError::Validation(format!(
                "Poll option must be 'A' or 'B', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for PollOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

impl PollTally {
    pub fn record(&mut self, option: PollOption) {
        match option {
            PollOption::A => self.a += 1,
            PollOption::B => self.b += 1,
        }
    }
}

/// One student capture in the current screenshot round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    pub student_email: String,
    pub data: String,
    pub timestamp: Timestamp,
}

/// State of a live session as persisted in its row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub widgets: Vec<Widget>,
    #[serde(default)]
    pub bg: String,
    #[serde(default)]
    pub polls: BTreeMap<String, PollTally>,
    #[serde(default)]
    pub student_count: i64,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub screenshot_request: Option<Timestamp>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
}

impl SessionState {
    /// Seed a fresh session from the teacher's dashboard.
    pub fn from_config(config: DashboardConfig) -> Self {
        let bg = config.background_or_default();
        Self {
            widgets: config.widgets,
            bg,
            polls: BTreeMap::new(),
            student_count: 0,
            paused: false,
            screenshot_request: None,
            screenshots: Vec::new(),
        }
    }

    pub fn decode(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw)
            .map_err(|e| CoreError::Internal(format!("Corrupt session state: {e}")))
    }

    pub fn encode(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(|e| CoreError::Internal(e.to_string()))
    }

    fn find_widget(&self, widget_id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == widget_id)
    }

    /// Apply a teacher's structural push.
    ///
    /// Incoming interactive widgets that already exist keep their stored
    /// `data`; everything else is taken from the push. The merged list
    /// replaces the stored one, so widgets missing from the push are dropped.
    /// The background changes only when the push carries one.
    pub fn apply_structural_push(&mut self, incoming: DashboardConfig) {
        let merged: Vec<Widget> = incoming
            .widgets
            .into_iter()
            .map(|mut widget| {
                if widget.allow_interaction {
                    if let Some(stored) = self.find_widget(&widget.id) {
                        widget.data = stored.data.clone();
                    }
                }
                widget
            })
            .collect();

        self.widgets = merged;
        if let Some(bg) = incoming.bg {
            self.bg = bg;
        }
    }

    /// Overwrite `data` on an interactive widget on behalf of a student.
    pub fn update_widget_data(&mut self, widget_id: &str, data: Value) -> Result<(), CoreError> {
        if self.paused {
            return Err(CoreError::SessionPaused);
        }

        let widget = self
            .widgets
            .iter_mut()
            .find(|w| w.id == widget_id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "Widget",
                key: widget_id.to_string(),
            })?;

        if !widget.allow_interaction {
            return Err(CoreError::Forbidden(format!(
                "Widget '{widget_id}' does not allow interaction"
            )));
        }

        widget.data = data;
        Ok(())
    }

    /// Count one vote. Votes are accepted while paused.
    pub fn record_poll_vote(&mut self, widget_id: &str, option: PollOption) -> PollTally {
        let tally = self.polls.entry(widget_id.to_string()).or_default();
        tally.record(option);
        *tally
    }

    /// Start a new capture round, dropping screenshots from the last one.
    pub fn begin_screenshot_round(&mut self, now: Timestamp) {
        self.screenshot_request = Some(now);
        self.screenshots.clear();
    }

    /// Append a capture. Repeat submissions by the same student are kept.
    pub fn add_screenshot(&mut self, student_email: String, data: String, now: Timestamp) {
        self.screenshots.push(Screenshot {
            student_email,
            data,
            timestamp: now,
        });
    }

    pub fn clear_screenshots(&mut self) {
        self.screenshots.clear();
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::widget::DEFAULT_BACKGROUND;

    fn state_with(widgets: Vec<Widget>) -> SessionState {
        SessionState::from_config(DashboardConfig {
            widgets,
            bg: Some("#111".into()),
        })
    }

    #[test]
    fn fresh_state_defaults() {
        let state = SessionState::from_config(DashboardConfig::default());
        assert_eq!(state.bg, DEFAULT_BACKGROUND);
        assert!(state.polls.is_empty());
        assert_eq!(state.student_count, 0);
        assert!(!state.paused);
        assert!(state.screenshot_request.is_none());
    }

    #[test]
    fn push_keeps_student_data_on_interactive_widgets() {
        let mut state = state_with(vec![Widget::new("w1", true, json!({"count": 3}))]);

        state.apply_structural_push(DashboardConfig {
            widgets: vec![Widget::new("w1", true, json!({"count": 0}))],
            bg: None,
        });

        assert_eq!(state.widgets[0].data, json!({"count": 3}));
    }

    #[test]
    fn push_replaces_data_on_non_interactive_widgets() {
        let mut state = state_with(vec![Widget::new("w2", false, json!({"text": "old"}))]);

        state.apply_structural_push(DashboardConfig {
            widgets: vec![Widget::new("w2", false, json!({"text": "new"}))],
            bg: None,
        });

        assert_eq!(state.widgets[0].data, json!({"text": "new"}));
    }

    #[test]
    fn push_takes_incoming_data_for_new_interactive_widgets() {
        let mut state = state_with(vec![]);

        state.apply_structural_push(DashboardConfig {
            widgets: vec![Widget::new("w9", true, json!({"seed": 1}))],
            bg: None,
        });

        assert_eq!(state.widgets[0].data, json!({"seed": 1}));
    }

    #[test]
    fn push_drops_absent_widgets_and_updates_bg_only_when_given() {
        let mut state = state_with(vec![
            Widget::new("a", false, Value::Null),
            Widget::new("b", false, Value::Null),
        ]);

        state.apply_structural_push(DashboardConfig {
            widgets: vec![Widget::new("b", false, Value::Null)],
            bg: None,
        });
        assert_eq!(state.widgets.len(), 1);
        assert_eq!(state.widgets[0].id, "b");
        assert_eq!(state.bg, "#111");

        state.apply_structural_push(DashboardConfig {
            widgets: vec![],
            bg: Some("#222".into()),
        });
        assert_eq!(state.bg, "#222");
    }

    #[test]
    fn widget_update_rules() {
        let mut state = state_with(vec![
            Widget::new("open", true, json!(1)),
            Widget::new("locked", false, json!(1)),
        ]);

        state.update_widget_data("open", json!(2)).unwrap();
        assert_eq!(state.widgets[0].data, json!(2));

        assert_matches!(
            state.update_widget_data("locked", json!(2)),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            state.update_widget_data("ghost", json!(2)),
            Err(CoreError::NotFound { entity: "Widget", .. })
        );
    }

    #[test]
    fn paused_session_rejects_widget_update() {
        let mut state = state_with(vec![Widget::new("open", true, json!(1))]);
        state.paused = true;

        assert_matches!(
            state.update_widget_data("open", json!(2)),
            Err(CoreError::SessionPaused)
        );
        assert_eq!(state.widgets[0].data, json!(1));
    }

    #[test]
    fn poll_votes_accumulate_per_widget() {
        let mut state = state_with(vec![]);
        state.paused = true;

        state.record_poll_vote("w1", PollOption::A);
        let tally = state.record_poll_vote("w1", PollOption::A);
        assert_eq!(tally, PollTally { a: 2, b: 0 });

        let tally = state.record_poll_vote("w1", PollOption::B);
        assert_eq!(tally, PollTally { a: 2, b: 1 });

        let other = state.record_poll_vote("w2", PollOption::B);
        assert_eq!(other, PollTally { a: 0, b: 1 });
    }

    #[test]
    fn poll_option_parsing() {
        assert_eq!("A".parse::<PollOption>().unwrap(), PollOption::A);
        assert_eq!("B".parse::<PollOption>().unwrap(), PollOption::B);
        assert_matches!("a".parse::<PollOption>(), Err(CoreError::Validation(_)));
        assert_matches!("C".parse::<PollOption>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn screenshot_rounds() {
        let mut state = state_with(vec![]);
        let now = Utc::now();

        state.add_screenshot("s@x.org".into(), "img1".into(), now);
        state.add_screenshot("s@x.org".into(), "img2".into(), now);
        assert_eq!(state.screenshots.len(), 2);

        state.begin_screenshot_round(now);
        assert_eq!(state.screenshot_request, Some(now));
        assert!(state.screenshots.is_empty());

        state.add_screenshot("t@x.org".into(), "img3".into(), now);
        state.clear_screenshots();
        assert!(state.screenshots.is_empty());
        assert_eq!(state.screenshot_request, Some(now));
    }

    #[test]
    fn state_json_uses_wire_field_names() {
        let mut state = state_with(vec![]);
        state.record_poll_vote("p", PollOption::A);
        let value: Value = serde_json::from_str(&state.encode().unwrap()).unwrap();

        assert_eq!(value["studentCount"], 0);
        assert_eq!(value["polls"]["p"], json!({"A": 1, "B": 0}));
        assert!(value["screenshotRequest"].is_null());
    }

    #[test]
    fn decode_tolerates_missing_optional_fields() {
        let state = SessionState::decode(r##"{"widgets":[],"bg":"#0"}"##).unwrap();
        assert!(!state.paused);
        assert!(state.polls.is_empty());
        assert!(state.screenshots.is_empty());
    }
}
