//! Per-user named dashboards.

use std::sync::Arc;

use chrono::Utc;
use classdash_core::dashboard::{
    decode_dashboard_set, delete_dashboard, encode_dashboard_set, rename_dashboard,
    validate_dashboard_name, DashboardSet,
};
use classdash_core::widget::DashboardConfig;
use classdash_db::repositories::DashboardRepo;
use classdash_db::store::RowStore;

use crate::error::AppResult;

/// CRUD over the caller's [`DashboardSet`], stored as one cell per user.
///
/// Every mutation rewrites the whole set.
pub struct DashboardStore {
    store: Arc<dyn RowStore>,
}

impl DashboardStore {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// The caller's set, empty if they have never saved.
    pub async fn list_all(&self, owner_email: &str) -> AppResult<DashboardSet> {
        match DashboardRepo::find_by_owner(self.store.as_ref(), owner_email).await? {
            Some(row) => Ok(decode_dashboard_set(&row.dashboard_set_json)?),
            None => Ok(DashboardSet::new()),
        }
    }

    async fn write_set(&self, owner_email: &str, set: &DashboardSet) -> AppResult<()> {
        let json = encode_dashboard_set(set)?;
        DashboardRepo::save_set(self.store.as_ref(), owner_email, json, Utc::now()).await?;
        Ok(())
    }

    /// Store `config` under `name`, replacing any existing entry.
    ///
    /// Returns the trimmed name actually used.
    pub async fn save(
        &self,
        owner_email: &str,
        name: &str,
        config: DashboardConfig,
    ) -> AppResult<String> {
        let name = validate_dashboard_name(name)?;
        let mut set = self.list_all(owner_email).await?;
        set.insert(name.clone(), config);
        self.write_set(owner_email, &set).await?;

        tracing::info!(owner = %owner_email, dashboard = %name, "Dashboard saved");
        Ok(name)
    }

    pub async fn delete(&self, owner_email: &str, name: &str) -> AppResult<()> {
        let mut set = self.list_all(owner_email).await?;
        delete_dashboard(&mut set, name)?;
        self.write_set(owner_email, &set).await?;

        tracing::info!(owner = %owner_email, dashboard = %name, "Dashboard deleted");
        Ok(())
    }

    /// Move `old_name` to `new_name`. Returns the trimmed new name.
    pub async fn rename(
        &self,
        owner_email: &str,
        old_name: &str,
        new_name: &str,
    ) -> AppResult<String> {
        let mut set = self.list_all(owner_email).await?;
        let new_name = rename_dashboard(&mut set, old_name, new_name)?;
        self.write_set(owner_email, &set).await?;

        tracing::info!(
            owner = %owner_email,
            from = %old_name,
            to = %new_name,
            "Dashboard renamed",
        );
        Ok(new_name)
    }
}
