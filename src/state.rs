use crate::api::ApiClient;
use crate::client::RequestClient;
use crate::config::ClientConfig;
use crate::session::SessionStore;
use crate::ui::Surface;
use std::{path::PathBuf, sync::Arc};

/// Everything a page handler needs, handed over at construction.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub session: SessionStore,
    pub surface: Arc<dyn Surface>,
    pub download_dir: PathBuf,
}

impl AppState {
    pub fn new(
        api: ApiClient,
        session: SessionStore,
        surface: Arc<dyn Surface>,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            api,
            session,
            surface,
            download_dir,
        }
    }

    pub async fn from_config(config: &ClientConfig, surface: Arc<dyn Surface>) -> Self {
        let requests = RequestClient::new(config.base_url.clone(), config.timeout);
        let session = SessionStore::open(config.session_path.clone()).await;
        Self::new(
            ApiClient::new(requests),
            session,
            surface,
            config.download_dir.clone(),
        )
    }

    pub fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }
}
