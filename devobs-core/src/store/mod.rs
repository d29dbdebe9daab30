//! Client-side caches of backend state.
//!
//! Each slice holds the last-fetched snapshot of one entity type and
//! exposes async actions that call the backend and fold the response back
//! in. [`AppStore`] owns every slice for the lifetime of one run; there is
//! no global instance.

pub mod change_reports;
pub mod config;
pub mod entity_map;
pub mod github_changes;
pub mod observations;
pub mod repositories;
pub mod websites;

use std::sync::Arc;

use crate::api::ObserverApi;
use crate::config::ChangeEndpointFamily;

pub use change_reports::{ChangeReportStore, RequestState};
pub use config::ConfigStore;
pub use entity_map::EntityMap;
pub use github_changes::GitHubChangesStore;
pub use observations::ObservationStore;
pub use repositories::RepositoryStore;
pub use websites::WebsiteStore;

#[derive(Debug)]
pub struct AppStore {
    pub repositories: RepositoryStore,
    pub websites: WebsiteStore,
    pub observations: ObservationStore,
    pub config: ConfigStore,
    pub change_reports: ChangeReportStore,
    pub github_changes: GitHubChangesStore,
}

impl AppStore {
    pub fn new(api: Arc<dyn ObserverApi>, family: ChangeEndpointFamily) -> Self {
        Self {
            repositories: RepositoryStore::new(Arc::clone(&api)),
            websites: WebsiteStore::new(Arc::clone(&api)),
            observations: ObservationStore::new(Arc::clone(&api)),
            config: ConfigStore::new(Arc::clone(&api)),
            change_reports: ChangeReportStore::new(Arc::clone(&api), family),
            github_changes: GitHubChangesStore::new(api),
        }
    }
}
