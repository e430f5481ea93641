//! Typed repositories for job and funnel tables.

use std::marker::PhantomData;

use tracing::info;

use cstudio_models::{Funnel, FunnelUpdate, Job, JobId, JobKind, JobPatch, ThreadJob, VideoJob};

use crate::client::{Query, SupabaseClient};
use crate::error::SupabaseResult;

/// Table a job kind is stored in.
///
/// Both tables key on `id uuid primary key` and carry the flattened params
/// plus `status text`, `progress int`, `result jsonb`, `error text`,
/// `user_id uuid null`, `created_at`, `updated_at`, `completed_at` and
/// `failed_at` (`timestamptz`). The full DDL lives in `migrations/`.
pub trait JobTable: JobKind {
    const TABLE: &'static str;
}

impl JobTable for VideoJob {
    const TABLE: &'static str = "videos";
}

impl JobTable for ThreadJob {
    const TABLE: &'static str = "threads";
}

/// Repository for job rows of one kind.
pub struct JobRepository<K: JobTable> {
    client: SupabaseClient,
    _kind: PhantomData<K>,
}

impl<K: JobTable> Clone for JobRepository<K> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: JobTable> JobRepository<K> {
    /// Create a new job repository.
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    /// Insert a new job row.
    pub async fn create(&self, job: &Job<K>) -> SupabaseResult<()> {
        let _: serde_json::Value = self.client.insert(K::TABLE, job).await?;
        info!("Created {} job record: {}", K::KIND, job.id);
        Ok(())
    }

    /// Get a job by ID.
    pub async fn get(&self, id: &JobId) -> SupabaseResult<Option<Job<K>>> {
        // PostgREST rejects non-uuid keys with 22P02; no such row can exist
        if !id.is_uuid() {
            return Ok(None);
        }
        self.client.select_one(K::TABLE, "id", id.as_str()).await
    }

    /// Apply a partial update to a job row.
    pub async fn update(&self, id: &JobId, patch: &JobPatch<K>) -> SupabaseResult<()> {
        let _: Vec<serde_json::Value> = self
            .client
            .update(K::TABLE, "id", id.as_str(), patch)
            .await?;
        Ok(())
    }

    /// Most recent jobs first, optionally restricted to one owner.
    pub async fn list(&self, owner: Option<&str>, limit: u32) -> SupabaseResult<Vec<Job<K>>> {
        let mut query = Query::new().order_desc("created_at").limit(limit);
        if let Some(owner) = owner {
            query = query.eq("user_id", owner);
        }
        self.client.select(K::TABLE, &query).await
    }

    /// Delete a job row. Returns `false` if it did not exist.
    pub async fn delete(&self, id: &JobId) -> SupabaseResult<bool> {
        if !id.is_uuid() {
            return Ok(false);
        }
        self.client.delete(K::TABLE, "id", id.as_str()).await
    }

    /// Connectivity check.
    pub async fn ping(&self) -> SupabaseResult<()> {
        self.client.ping().await
    }
}

/// Repository for landing page funnels.
#[derive(Clone)]
pub struct FunnelRepository {
    client: SupabaseClient,
}

impl FunnelRepository {
    const TABLE: &'static str = "funnels";

    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, funnel: &Funnel) -> SupabaseResult<Funnel> {
        let stored: Funnel = self.client.insert(Self::TABLE, funnel).await?;
        info!("Created funnel record: {}", stored.funnel_id);
        Ok(stored)
    }

    pub async fn get(&self, funnel_id: &str) -> SupabaseResult<Option<Funnel>> {
        self.client
            .select_one(Self::TABLE, "funnel_id", funnel_id)
            .await
    }

    /// Recently edited funnels first.
    pub async fn list(&self, limit: u32) -> SupabaseResult<Vec<Funnel>> {
        let query = Query::new().order_desc("updated_at").limit(limit);
        self.client.select(Self::TABLE, &query).await
    }

    /// Apply an update; `None` when no row matched.
    pub async fn update(&self, funnel_id: &str, update: &FunnelUpdate) -> SupabaseResult<Option<Funnel>> {
        let rows: Vec<Funnel> = self
            .client
            .update(Self::TABLE, "funnel_id", funnel_id, update)
            .await?;
        Ok(rows.into_iter().next())
    }

    pub async fn delete(&self, funnel_id: &str) -> SupabaseResult<bool> {
        self.client.delete(Self::TABLE, "funnel_id", funnel_id).await
    }

    /// Another funnel already using `subdomain`, if any.
    pub async fn find_by_subdomain(
        &self,
        subdomain: &str,
        excluding: &str,
    ) -> SupabaseResult<Option<Funnel>> {
        let query = Query::new()
            .eq("subdomain", subdomain)
            .neq("funnel_id", excluding)
            .limit(1);
        let rows: Vec<Funnel> = self.client.select(Self::TABLE, &query).await?;
        Ok(rows.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SupabaseConfig;
    use cstudio_models::{SlideDuration, SlideshowParams, VideoTheme};
    use serde_json::json;
    use wiremock::matchers::{any, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn video_params() -> SlideshowParams {
        SlideshowParams {
            title: "T".into(),
            text: String::new(),
            images: vec![],
            theme: VideoTheme::Minimal,
            duration: SlideDuration::new(30).unwrap(),
        }
    }

    fn repo(server: &MockServer) -> JobRepository<VideoJob> {
        let client = SupabaseClient::new(SupabaseConfig::new(server.uri(), "anon")).unwrap();
        JobRepository::new(client)
    }

    #[tokio::test]
    async fn test_create_posts_flattened_row() {
        let server = MockServer::start().await;
        let job = Job::<VideoJob>::new(video_params(), Some("user-1".into()));

        Mock::given(method("POST"))
            .and(path("/rest/v1/videos"))
            .and(body_partial_json(json!({
                "id": job.id.as_str(),
                "title": "T",
                "theme": "minimal",
                "duration": 30,
                "status": "pending",
                "user_id": "user-1"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{"id": job.id.as_str()}])))
            .expect(1)
            .mount(&server)
            .await;

        repo(&server).create(&job).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_parses_row() {
        let server = MockServer::start().await;
        let mut job = Job::<VideoJob>::new(video_params(), None);
        job.start(10).unwrap();
        job.complete(cstudio_models::RenderOutput::for_job(&job.id)).unwrap();
        let row = serde_json::to_value(&job).unwrap();

        Mock::given(method("GET"))
            .and(path("/rest/v1/videos"))
            .and(query_param("id", format!("eq.{}", job.id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
            .mount(&server)
            .await;

        let fetched = repo(&server).get(&job.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, cstudio_models::JobStatus::Completed);
        assert_eq!(
            fetched.public_path(),
            Some(format!("/videos/{}.mp4", job.id).as_str())
        );
    }

    #[tokio::test]
    async fn test_list_filters_by_owner_and_orders() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/videos"))
            .and(query_param("user_id", "eq.user-9"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("limit", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let rows = repo(&server).list(Some("user-9"), 50).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_id_is_missing_without_a_request() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "22P02",
                "message": "invalid input syntax for type uuid: \"missing\""
            })))
            .expect(0)
            .mount(&server)
            .await;

        let repo = repo(&server);
        let id = JobId::from_string("missing");
        assert!(repo.get(&id).await.unwrap().is_none());
        assert!(!repo.delete(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_reports_whether_a_row_matched() {
        let server = MockServer::start().await;
        let id = JobId::new();
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/videos"))
            .and(query_param("id", format!("eq.{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        assert!(!repo(&server).delete(&id).await.unwrap());
    }
}
