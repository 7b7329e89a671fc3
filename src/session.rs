use crate::errors::ClientResult;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, sync::Mutex};
use tracing::{error, info};

/// Contents of the durable key-value file. Only `usuario` is ever written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<String>,
}

/// Logged-in identity, persisted across runs.
///
/// The stored name is trusted as-is; it is never re-checked with the server.
#[derive(Clone)]
pub struct SessionStore {
    path: PathBuf,
    data: Arc<Mutex<SessionData>>,
}

impl SessionStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = load_session(&path).await;
        Self {
            path,
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub async fn current_user(&self) -> Option<String> {
        self.data.lock().await.usuario.clone()
    }

    pub async fn sign_in(&self, usuario: &str) -> ClientResult<()> {
        let mut data = self.data.lock().await;
        data.usuario = Some(usuario.to_string());
        persist_session(&self.path, &data).await?;
        info!("session stored for {usuario}");
        Ok(())
    }

    pub async fn sign_out(&self) -> ClientResult<Option<String>> {
        let mut data = self.data.lock().await;
        let previous = data.usuario.take();
        persist_session(&self.path, &data).await?;
        Ok(previous)
    }
}

pub async fn load_session(path: &Path) -> SessionData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse session file: {err}");
                SessionData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => SessionData::default(),
        Err(err) => {
            error!("failed to read session file: {err}");
            SessionData::default()
        }
    }
}

async fn persist_session(path: &Path, data: &SessionData) -> ClientResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let payload = serde_json::to_vec_pretty(data).map_err(std::io::Error::other)?;
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn unique_temp_path(label: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("nefrobd_{label}_{}_{}", std::process::id(), nanos));
    path
}
