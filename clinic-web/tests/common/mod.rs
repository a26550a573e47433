use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use clinic_web::AppState;
use clinic_web::config::{
    AuthSettings, DatabaseSettings, ServerSettings, Settings, SiteSettings, StorageBackend,
    StorageSettings,
};
use clinic_web::error::AppError;
use clinic_web::models::{Collection, PriceCategory, PriceItem, Service, ServiceCategory};
use clinic_web::services::auth_client::{Session, SessionHandoff, SessionProvider};
use clinic_web::services::database::CatalogStore;
use clinic_web::services::storage::{ObjectStore, StoredObject};
use clinic_web::startup::build_router;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        auth: AuthSettings {
            url: "http://localhost:9999".to_string(),
        },
        database: DatabaseSettings {
            url: "postgres://localhost:5432/unused".to_string(),
            max_connections: 2,
            min_connections: 1,
            run_migrations: false,
        },
        storage: StorageSettings {
            backend: StorageBackend::Local,
            local_path: "target/test-uploads".to_string(),
            public_base_url: "/static/uploads".to_string(),
            bucket_url: None,
            bucket: None,
            api_key: None,
        },
        site: SiteSettings {
            booking_embed_url: "https://booking.example.com/test".to_string(),
        },
    }
}

/// Scripted session provider: hands out a fixed verdict and counts refreshes.
#[derive(Default)]
pub struct FakeSessions {
    pub session: Option<Session>,
    pub set_cookie: Option<String>,
    pub fail_refresh: bool,
    refresh_calls: AtomicUsize,
}

impl FakeSessions {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated() -> Self {
        Self {
            session: Some(Session {
                user_id: "user-1".to_string(),
                email: Some("vet@willowbrook.example".to_string()),
            }),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_refresh: true,
            ..Self::default()
        }
    }

    pub fn with_refreshed_cookie(mut self, cookie: &str) -> Self {
        self.set_cookie = Some(cookie.to_string());
        self
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn handoff(&self) -> SessionHandoff {
        SessionHandoff {
            session: self.session.clone(),
            set_cookie: self.set_cookie.clone(),
        }
    }
}

#[async_trait]
impl SessionProvider for FakeSessions {
    async fn refresh(&self, _cookie: Option<&str>) -> Result<SessionHandoff, AppError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_refresh {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "provider offline"
            )));
        }
        Ok(self.handoff())
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<SessionHandoff, AppError> {
        Ok(self.handoff())
    }

    async fn sign_out(&self, _cookie: Option<&str>) -> Result<(), AppError> {
        Ok(())
    }

    async fn exchange_code(&self, _code: &str) -> Result<SessionHandoff, AppError> {
        Ok(self.handoff())
    }
}

/// In-memory catalog store that records rank writes and can be told to fail
/// updates for specific ids.
#[derive(Default)]
pub struct FakeCatalog {
    ranks: Mutex<HashMap<(Collection, String), i32>>,
    failing_ids: HashSet<String>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(ids: &[&str]) -> Self {
        Self {
            failing_ids: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn rank_of(&self, collection: Collection, id: &str) -> Option<i32> {
        self.ranks
            .lock()
            .unwrap()
            .get(&(collection, id.to_string()))
            .copied()
    }

    pub fn write_count(&self) -> usize {
        self.ranks.lock().unwrap().len()
    }
}

#[async_trait]
impl CatalogStore for FakeCatalog {
    async fn set_rank(&self, collection: Collection, id: &str, rank: i32) -> Result<(), AppError> {
        if self.failing_ids.contains(id) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "update failed for {}",
                id
            )));
        }
        self.ranks
            .lock()
            .unwrap()
            .insert((collection, id.to_string()), rank);
        Ok(())
    }

    async fn list_price_categories(&self) -> Result<Vec<PriceCategory>, AppError> {
        Ok(Vec::new())
    }

    async fn list_price_items(&self) -> Result<Vec<PriceItem>, AppError> {
        Ok(Vec::new())
    }

    async fn list_service_categories(&self) -> Result<Vec<ServiceCategory>, AppError> {
        Ok(Vec::new())
    }

    async fn list_services(&self) -> Result<Vec<Service>, AppError> {
        Ok(Vec::new())
    }
}

/// In-memory object store.
#[derive(Default)]
pub struct FakeObjects {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl FakeObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl ObjectStore for FakeObjects {
    async fn upload(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<(), AppError> {
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, AppError> {
        let mut objects: Vec<StoredObject> = self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, data)| StoredObject {
                key: key.clone(),
                size: data.len() as i64,
            })
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.willowbrook.example/{}", key)
    }
}

pub fn test_app_with(
    sessions: Arc<FakeSessions>,
    catalog: Arc<FakeCatalog>,
    images: Arc<FakeObjects>,
) -> Router {
    build_router(AppState::new(test_settings(), sessions, catalog, images))
}

pub fn test_app(sessions: Arc<FakeSessions>, catalog: Arc<FakeCatalog>) -> Router {
    test_app_with(sessions, catalog, Arc::new(FakeObjects::new()))
}

pub fn put_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
