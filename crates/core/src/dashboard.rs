//! Named dashboard sets and their stored payload format.
//!
//! Each user owns one [`DashboardSet`] persisted as a single JSON text cell.
//! New writes use the tagged [`StoredDashboardSet`] envelope. Older rows are
//! read through [`decode_dashboard_set`], which also accepts the untagged
//! name map and the bare single-dashboard config.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::widget::DashboardConfig;

/// Current payload version written by [`encode_dashboard_set`].
pub const DASHBOARD_FORMAT_VERSION: u32 = 2;

/// Name given to a legacy bare config when it is lifted into a set.
pub const LEGACY_DASHBOARD_NAME: &str = "Default";

/// Dashboard name -> configuration, one per owner.
pub type DashboardSet = BTreeMap<String, DashboardConfig>;

/// Tagged on-disk envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDashboardSet {
    pub format_version: u32,
    #[serde(default)]
    pub dashboards: DashboardSet,
}

/// Returns `true` when `value` looks like a bare `DashboardConfig` rather
/// than a name map: a top-level `widgets` array or `bg` string.
pub fn is_legacy_config(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    obj.get("widgets").is_some_and(Value::is_array) || obj.get("bg").is_some_and(Value::is_string)
}

/// Parse a stored dashboards cell into a set.
///
/// A blank cell is an empty set.
pub fn decode_dashboard_set(raw: &str) -> Result<DashboardSet, CoreError> {
    if raw.trim().is_empty() {
        return Ok(DashboardSet::new());
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| CoreError::Internal(format!("Corrupt dashboards payload: {e}")))?;

    if value.get("formatVersion").is_some() {
        let stored: StoredDashboardSet = serde_json::from_value(value)
            .map_err(|e| CoreError::Internal(format!("Corrupt dashboards payload: {e}")))?;
        return Ok(stored.dashboards);
    }

    if is_legacy_config(&value) {
        let config: DashboardConfig = serde_json::from_value(value)
            .map_err(|e| CoreError::Internal(format!("Corrupt legacy dashboard: {e}")))?;
        let mut set = DashboardSet::new();
        set.insert(LEGACY_DASHBOARD_NAME.to_string(), config);
        return Ok(set);
    }

    serde_json::from_value(value)
        .map_err(|e| CoreError::Internal(format!("Corrupt dashboards payload: {e}")))
}

/// Serialize a set into the current tagged format.
pub fn encode_dashboard_set(set: &DashboardSet) -> Result<String, CoreError> {
    let stored = StoredDashboardSet {
        format_version: DASHBOARD_FORMAT_VERSION,
        dashboards: set.clone(),
    };
    serde_json::to_string(&stored).map_err(|e| CoreError::Internal(e.to_string()))
}

/// Trim a dashboard name, rejecting empty or whitespace-only names.
pub fn validate_dashboard_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Dashboard name must not be empty".into(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Remove `name` from the set. Names are matched trimmed, as saved.
pub fn delete_dashboard(set: &mut DashboardSet, name: &str) -> Result<DashboardConfig, CoreError> {
    let name = name.trim();
    set.remove(name).ok_or_else(|| CoreError::NotFound {
        entity: "Dashboard",
        key: name.to_string(),
    })
}

/// Move the entry under `old_name` to `new_name`, keeping its config.
///
/// Both names are trimmed. The set is left untouched on any error.
pub fn rename_dashboard(
    set: &mut DashboardSet,
    old_name: &str,
    new_name: &str,
) -> Result<String, CoreError> {
    let old_name = old_name.trim();
    if !set.contains_key(old_name) {
        return Err(CoreError::NotFound {
            entity: "Dashboard",
            key: old_name.to_string(),
        });
    }
    let new_name = validate_dashboard_name(new_name)?;
    if set.contains_key(&new_name) {
        return Err(CoreError::Conflict(format!(
            "A dashboard named '{new_name}' already exists"
        )));
    }

    if let Some(config) = set.remove(old_name) {
        set.insert(new_name.clone(), config);
    }
    Ok(new_name)
}
