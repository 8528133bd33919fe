use std::sync::Arc;

use crate::application::ports::token_blacklist::TokenBlacklist;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::uploads::storage_fallback::StorageFallback;
use crate::application::services::uploads::temp_file_gate::TempFileGate;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

pub struct AppServices {
    user_repo: Arc<dyn UserRepository>,
    token_blacklist: Arc<dyn TokenBlacklist>,
    image_storage: Arc<StorageFallback>,
    upload_gate: Arc<TempFileGate>,
}

impl AppServices {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        token_blacklist: Arc<dyn TokenBlacklist>,
        image_storage: Arc<StorageFallback>,
        upload_gate: Arc<TempFileGate>,
    ) -> Self {
        Self {
            user_repo,
            token_blacklist,
            image_storage,
            upload_gate,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn token_blacklist(&self) -> Arc<dyn TokenBlacklist> {
        self.services.token_blacklist.clone()
    }

    pub fn image_storage(&self) -> Arc<StorageFallback> {
        self.services.image_storage.clone()
    }

    pub fn upload_gate(&self) -> Arc<TempFileGate> {
        self.services.upload_gate.clone()
    }
}
