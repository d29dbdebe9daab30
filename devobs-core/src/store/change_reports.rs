//! Change reports grouped by parent repository.
//!
//! Every parent carries its own loading flag and error, so a failed fetch
//! for one repository never disturbs what is shown for another.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::api::{ChangeReportFilter, ObserverApi};
use crate::config::ChangeEndpointFamily;
use crate::error::StoreError;
use crate::types::{ChangeAnalysis, Entity};

use super::EntityMap;

/// In-flight and failure state of one parent's last request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct ParentSlot {
    reports: EntityMap<ChangeAnalysis>,
    state: RequestState,
}

#[derive(Debug)]
pub struct ChangeReportStore {
    api: Arc<dyn ObserverApi>,
    family: ChangeEndpointFamily,
    parents: RwLock<HashMap<String, ParentSlot>>,
}

impl ChangeReportStore {
    pub fn new(api: Arc<dyn ObserverApi>, family: ChangeEndpointFamily) -> Self {
        Self {
            api,
            family,
            parents: RwLock::new(HashMap::new()),
        }
    }

    pub fn family(&self) -> ChangeEndpointFamily {
        self.family
    }

    /// Reports held for `parent`, ordered by id.
    pub fn reports(&self, parent: &str) -> Vec<ChangeAnalysis> {
        self.parents
            .read()
            .expect("change report lock poisoned")
            .get(parent)
            .map(|slot| slot.reports.values())
            .unwrap_or_default()
    }

    /// Loading/error state for `parent`; default when never requested.
    pub fn request_state(&self, parent: &str) -> RequestState {
        self.parents
            .read()
            .expect("change report lock poisoned")
            .get(parent)
            .map(|slot| slot.state.clone())
            .unwrap_or_default()
    }

    fn with_slot<R>(&self, parent: &str, f: impl FnOnce(&mut ParentSlot) -> R) -> R {
        let mut parents = self.parents.write().expect("change report lock poisoned");
        f(parents.entry(parent.to_string()).or_default())
    }

    /// Replace the reports of `parent` with the backend's list.
    ///
    /// On failure the error text is kept in `parent`'s state and also
    /// returned; reports already held for it stay in place.
    pub async fn fetch_for(
        &self,
        parent: &str,
        filter: Option<ChangeReportFilter>,
    ) -> crate::error::Result<Vec<ChangeAnalysis>> {
        self.with_slot(parent, |slot| {
            slot.state.loading = true;
            slot.state.error = None;
        });

        let mut filter = filter.unwrap_or_default();
        filter.repo_id = Some(parent.to_string());

        match self.api.list_change_reports(self.family, &filter).await {
            Ok(reports) => {
                self.with_slot(parent, |slot| {
                    slot.reports.replace_all(reports.iter().cloned());
                    slot.state.loading = false;
                });
                Ok(reports)
            }
            Err(err) => {
                warn!(parent, error = %err, "Fetching change reports failed");
                self.with_slot(parent, |slot| {
                    slot.state.loading = false;
                    slot.state.error = Some(err.to_string());
                });
                Err(err)
            }
        }
    }

    /// Request a new report for `parent` covering the last `days_back` days.
    pub async fn create(
        &self,
        parent: &str,
        days_back: u32,
    ) -> crate::error::Result<Option<ChangeAnalysis>> {
        let created = self
            .api
            .create_change_report(self.family, parent, days_back)
            .await?;
        if let Some(report) = &created {
            info!(parent, id = report.id(), days_back, "Change report requested");
            self.with_slot(parent, |slot| slot.reports.merge([report.clone()]));
        }
        Ok(created)
    }

    /// Fetch one report and merge it under `parent`.
    pub async fn fetch_one(
        &self,
        parent: &str,
        id: &str,
    ) -> crate::error::Result<Option<ChangeAnalysis>> {
        let report = self.api.get_change_report(self.family, id).await?;
        if let Some(r) = &report {
            self.with_slot(parent, |slot| slot.reports.merge([r.clone()]));
        }
        Ok(report)
    }

    /// Delete a report; it leaves the slice only once the backend confirms.
    pub async fn delete(&self, parent: &str, id: &str) -> crate::error::Result<()> {
        let deleted = self.api.delete_change_report(self.family, id).await?;
        if !deleted {
            return Err(StoreError::Rejected {
                action: "delete change report",
                message: format!("backend refused to delete {id}"),
            }
            .into());
        }
        info!(parent, id, "Change report deleted");
        self.with_slot(parent, |slot| {
            slot.reports.remove(id);
        });
        Ok(())
    }
}
