use std::sync::Arc;

use tracing::{debug, info};

use crate::api::ObserverApi;
use crate::error::DevObsError;
use crate::types::Website;
use crate::validate::validate_website_url;

use super::EntityMap;

/// Website slice: id → [`Website`].
#[derive(Debug)]
pub struct WebsiteStore {
    api: Arc<dyn ObserverApi>,
    websites: EntityMap<Website>,
}

impl WebsiteStore {
    pub fn new(api: Arc<dyn ObserverApi>) -> Self {
        Self {
            api,
            websites: EntityMap::new(),
        }
    }

    pub fn all(&self) -> Vec<Website> {
        self.websites.values()
    }

    pub fn get(&self, id: &str) -> Option<Website> {
        self.websites.get(id)
    }

    pub async fn fetch_all(&self) -> crate::error::Result<Vec<Website>> {
        let sites = self.api.list_websites().await?;
        debug!(count = sites.len(), "Fetched websites");
        self.websites.replace_all(sites.iter().cloned());
        Ok(sites)
    }

    pub async fn fetch_by_id(&self, id: &str) -> crate::error::Result<Option<Website>> {
        let site = self.api.get_website(id).await?;
        if let Some(s) = &site {
            self.websites.merge([s.clone()]);
        }
        Ok(site)
    }

    pub async fn add(&self, url: &str) -> crate::error::Result<Option<Website>> {
        let existing = self.websites.values();
        if let Some(err) = validate_website_url(url, &existing) {
            return Err(DevObsError::Validation(err));
        }

        let created = self.api.add_website(url).await?;
        if let Some(site) = created {
            info!(id = %site.id, url, "Website added");
            self.websites.merge([site.clone()]);
            return Ok(Some(site));
        }

        let sites = self.fetch_all().await?;
        Ok(sites.into_iter().find(|s| s.url == url))
    }

    pub async fn delete(&self, id: &str) -> crate::error::Result<Vec<Website>> {
        let remaining = self.api.delete_website(id).await?;
        info!(id, remaining = remaining.len(), "Website deleted");
        self.websites.replace_all(remaining.iter().cloned());
        Ok(remaining)
    }

    pub async fn rescan(&self, id: &str) -> crate::error::Result<()> {
        self.api.rescan_website(id).await?;
        info!(id, "Website rescan scheduled");
        Ok(())
    }
}
