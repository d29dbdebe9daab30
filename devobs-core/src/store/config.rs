use std::sync::{Arc, RwLock};

use tracing::info;

use crate::api::ObserverApi;
use crate::types::{GlobalConfig, UserManagementStatus};

/// Global config and user-management status, each replaced wholesale.
#[derive(Debug)]
pub struct ConfigStore {
    api: Arc<dyn ObserverApi>,
    config: RwLock<Option<GlobalConfig>>,
    user_status: RwLock<Option<UserManagementStatus>>,
}

impl ConfigStore {
    pub fn new(api: Arc<dyn ObserverApi>) -> Self {
        Self {
            api,
            config: RwLock::new(None),
            user_status: RwLock::new(None),
        }
    }

    pub fn config(&self) -> Option<GlobalConfig> {
        self.config.read().expect("config lock poisoned").clone()
    }

    pub fn user_status(&self) -> Option<UserManagementStatus> {
        self.user_status
            .read()
            .expect("user status lock poisoned")
            .clone()
    }

    pub async fn fetch(&self) -> crate::error::Result<GlobalConfig> {
        let config = self.api.get_global_config().await?;
        *self.config.write().expect("config lock poisoned") = Some(config.clone());
        Ok(config)
    }

    /// Send `config` and keep the backend's echoed version.
    pub async fn update(&self, config: &GlobalConfig) -> crate::error::Result<GlobalConfig> {
        let updated = self.api.update_global_config(config).await?;
        info!("Global config updated");
        *self.config.write().expect("config lock poisoned") = Some(updated.clone());
        Ok(updated)
    }

    pub async fn fetch_user_status(&self) -> crate::error::Result<UserManagementStatus> {
        let status = self.api.user_management_status().await?;
        *self.user_status.write().expect("user status lock poisoned") = Some(status.clone());
        Ok(status)
    }
}
