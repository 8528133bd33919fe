// In-memory adapters for unit and router tests.
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use async_trait::async_trait;
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::application::ports::image_store::{
    ImageObject, ImageStore, PROFILE_IMAGES_PREFIX, StorageBackendStatus, StorageError,
};
use crate::application::ports::token_blacklist::TokenBlacklist;
use crate::application::ports::user_repository::UserRepository;
use crate::bootstrap::config::Config;
use crate::domain::users::profile_image::ImageBackend;
use crate::domain::users::user::{ProfileDetails, ProfilePatch, UserInfoPatch, UserRecord};

pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

pub fn test_config(storage_root: &std::path::Path, upload_tmp_dir: &std::path::Path) -> Config {
    Config {
        api_port: 8080,
        frontend_url: None,
        database_url: "postgres://unused".into(),
        database_max_connections: 1,
        jwt_secret_pem: "test-secret-test-secret".into(),
        jwt_expires_secs: 3600,
        storage_root: storage_root.to_string_lossy().to_string(),
        upload_tmp_dir: upload_tmp_dir.to_string_lossy().to_string(),
        upload_max_bytes: 1024 * 1024,
        public_base_url: None,
        trust_proxy_headers: false,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        s3_access_key: None,
        s3_secret_key: None,
        s3_use_path_style: false,
        s3_public_host: "storage.test".into(),
        remote_upload_timeout_secs: 1,
        is_production: false,
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserRecord>>,
    fail_updates: AtomicBool,
    profile_updates: AtomicUsize,
}

impl InMemoryUserRepository {
    pub fn with_user(email: &str, user_name: &str, password: &str) -> Self {
        let repo = Self::default();
        repo.insert(email, user_name, &hash_password(password));
        repo
    }

    pub fn insert(&self, email: &str, user_name: &str, password_hash: &str) -> UserRecord {
        let now = chrono::Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            user_name: user_name.to_string(),
            password_hash: Some(password_hash.to_string()),
            profile: ProfileDetails::default(),
            profile_image: None,
            created_at: now,
            updated_at: now,
        };
        self.users
            .lock()
            .unwrap()
            .insert(email.to_string(), record.clone());
        record
    }

    pub fn set_profile_image(&self, email: &str, url: &str) {
        if let Some(user) = self.users.lock().unwrap().get_mut(email) {
            user.profile_image = Some(url.to_string());
        }
    }

    pub fn profile_image(&self, email: &str) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .get(email)
            .and_then(|u| u.profile_image.clone())
    }

    pub fn user(&self, email: &str) -> Option<UserRecord> {
        self.users.lock().unwrap().get(email).cloned()
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn profile_update_count(&self) -> usize {
        self.profile_updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(
        &self,
        email: &str,
        user_name: &str,
        password_hash: &str,
    ) -> anyhow::Result<UserRecord> {
        if self.users.lock().unwrap().contains_key(email) {
            anyhow::bail!("email already registered");
        }
        Ok(self.insert(email, user_name, password_hash))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
        Ok(self.user(email))
    }

    async fn update_profile(
        &self,
        email: &str,
        patch: &ProfilePatch,
    ) -> anyhow::Result<Option<UserRecord>> {
        self.profile_updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            anyhow::bail!("connection reset");
        }
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.get_mut(email) else {
            return Ok(None);
        };
        let p = &mut user.profile;
        if let Some(v) = &patch.gender {
            p.gender = Some(v.clone());
        }
        if let Some(v) = patch.height {
            p.height = Some(v);
        }
        if let Some(v) = patch.weight {
            p.weight = Some(v);
        }
        if let Some(v) = patch.age {
            p.age = Some(v);
        }
        if let Some(v) = &patch.goal {
            p.goal = Some(v.clone());
        }
        if let Some(v) = &patch.activity_level {
            p.activity_level = Some(v.clone());
        }
        if let Some(v) = patch.bmi {
            p.bmi = Some(v);
        }
        if let Some(v) = &patch.user_name {
            user.user_name = v.clone();
        }
        if let Some(v) = &patch.profile_image {
            user.profile_image = Some(v.clone());
        }
        user.updated_at = chrono::Utc::now();
        Ok(Some(user.clone()))
    }

    async fn update_user_info(
        &self,
        email: &str,
        patch: &UserInfoPatch,
    ) -> anyhow::Result<Option<UserRecord>> {
        if self.fail_updates.load(Ordering::SeqCst) {
            anyhow::bail!("connection reset");
        }
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.get_mut(email) else {
            return Ok(None);
        };
        if let Some(v) = &patch.user_name {
            user.user_name = v.clone();
        }
        if let Some(v) = &patch.password_hash {
            user.password_hash = Some(v.clone());
        }
        Ok(Some(user.clone()))
    }
}

#[derive(Default)]
pub struct InMemoryTokenBlacklist {
    tokens: Mutex<HashSet<String>>,
}

impl InMemoryTokenBlacklist {
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.lock().unwrap().contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryTokenBlacklist {
    async fn is_blacklisted(&self, token: &str) -> anyhow::Result<bool> {
        Ok(self.contains(token))
    }

    async fn blacklist(&self, token: &str) -> anyhow::Result<()> {
        self.tokens.lock().unwrap().insert(token.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PutBehavior {
    Succeed,
    Fail,
    Hang,
}

pub struct FakeImageStore {
    backend: ImageBackend,
    status: StorageBackendStatus,
    behavior: PutBehavior,
    puts: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
}

impl FakeImageStore {
    fn new(backend: ImageBackend, status: StorageBackendStatus, behavior: PutBehavior) -> Self {
        Self {
            backend,
            status,
            behavior,
            puts: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
        }
    }

    pub fn remote(behavior: PutBehavior) -> Self {
        Self::new(ImageBackend::Remote, StorageBackendStatus::Configured, behavior)
    }

    pub fn unavailable_remote(reason: &str) -> Self {
        Self::new(
            ImageBackend::Remote,
            StorageBackendStatus::Unavailable {
                reason: reason.to_string(),
            },
            PutBehavior::Fail,
        )
    }

    pub fn local(behavior: PutBehavior) -> Self {
        Self::new(ImageBackend::Local, StorageBackendStatus::Configured, behavior)
    }

    pub fn put_keys(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }

    pub fn removed_keys(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for FakeImageStore {
    fn backend(&self) -> ImageBackend {
        self.backend
    }

    fn status(&self) -> StorageBackendStatus {
        self.status.clone()
    }

    async fn put(&self, object: &ImageObject<'_>) -> Result<String, StorageError> {
        self.puts.lock().unwrap().push(object.key.to_string());
        match self.behavior {
            PutBehavior::Succeed => Ok(match self.backend {
                ImageBackend::Remote => format!(
                    "https://storage.test/bucket/{}/{}",
                    PROFILE_IMAGES_PREFIX, object.key
                ),
                ImageBackend::Local => format!(
                    "{}/uploads/{}/{}",
                    object.origin, PROFILE_IMAGES_PREFIX, object.key
                ),
            }),
            PutBehavior::Fail => Err(StorageError::Write {
                backend: self.backend,
                key: object.key.to_string(),
                source: anyhow::anyhow!("simulated outage"),
            }),
            PutBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(StorageError::Write {
                    backend: self.backend,
                    key: object.key.to_string(),
                    source: anyhow::anyhow!("hung"),
                })
            }
        }
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.removed.lock().unwrap().push(key.to_string());
        Ok(())
    }
}
