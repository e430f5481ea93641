//! Funnel persistence.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use cstudio_models::{Funnel, FunnelUpdate};
use cstudio_supabase::{FunnelRepository, SupabaseResult};

/// Storage for funnel rows.
#[async_trait]
pub trait FunnelStore: Send + Sync {
    async fn create(&self, funnel: &Funnel) -> SupabaseResult<Funnel>;

    async fn get(&self, funnel_id: &str) -> SupabaseResult<Option<Funnel>>;

    /// Most recently edited first.
    async fn list(&self, limit: u32) -> SupabaseResult<Vec<Funnel>>;

    /// Apply an update; `None` when the funnel does not exist.
    async fn update(&self, funnel_id: &str, update: &FunnelUpdate) -> SupabaseResult<Option<Funnel>>;

    async fn delete(&self, funnel_id: &str) -> SupabaseResult<bool>;

    /// Another funnel already using `subdomain`, if any.
    async fn find_by_subdomain(&self, subdomain: &str, excluding: &str) -> SupabaseResult<Option<Funnel>>;
}

#[async_trait]
impl FunnelStore for FunnelRepository {
    async fn create(&self, funnel: &Funnel) -> SupabaseResult<Funnel> {
        FunnelRepository::create(self, funnel).await
    }

    async fn get(&self, funnel_id: &str) -> SupabaseResult<Option<Funnel>> {
        FunnelRepository::get(self, funnel_id).await
    }

    async fn list(&self, limit: u32) -> SupabaseResult<Vec<Funnel>> {
        FunnelRepository::list(self, limit).await
    }

    async fn update(&self, funnel_id: &str, update: &FunnelUpdate) -> SupabaseResult<Option<Funnel>> {
        FunnelRepository::update(self, funnel_id, update).await
    }

    async fn delete(&self, funnel_id: &str) -> SupabaseResult<bool> {
        FunnelRepository::delete(self, funnel_id).await
    }

    async fn find_by_subdomain(&self, subdomain: &str, excluding: &str) -> SupabaseResult<Option<Funnel>> {
        FunnelRepository::find_by_subdomain(self, subdomain, excluding).await
    }
}

/// In-process funnel table; rows are lost on restart.
#[derive(Default)]
pub struct MemoryFunnelStore {
    rows: RwLock<HashMap<String, Funnel>>,
}

impl MemoryFunnelStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FunnelStore for MemoryFunnelStore {
    async fn create(&self, funnel: &Funnel) -> SupabaseResult<Funnel> {
        self.rows
            .write()
            .await
            .insert(funnel.funnel_id.clone(), funnel.clone());
        Ok(funnel.clone())
    }

    async fn get(&self, funnel_id: &str) -> SupabaseResult<Option<Funnel>> {
        Ok(self.rows.read().await.get(funnel_id).cloned())
    }

    async fn list(&self, limit: u32) -> SupabaseResult<Vec<Funnel>> {
        let mut funnels: Vec<Funnel> = self.rows.read().await.values().cloned().collect();
        funnels.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        funnels.truncate(limit as usize);
        Ok(funnels)
    }

    async fn update(&self, funnel_id: &str, update: &FunnelUpdate) -> SupabaseResult<Option<Funnel>> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(funnel_id).map(|funnel| {
            update.apply_to(funnel);
            funnel.clone()
        }))
    }

    async fn delete(&self, funnel_id: &str) -> SupabaseResult<bool> {
        Ok(self.rows.write().await.remove(funnel_id).is_some())
    }

    async fn find_by_subdomain(&self, subdomain: &str, excluding: &str) -> SupabaseResult<Option<Funnel>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|f| f.funnel_id != excluding && f.subdomain.as_deref() == Some(subdomain))
            .cloned())
    }
}
