use crate::errors::ClientResult;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Writes a downloaded file into `dir`, creating the directory if needed.
pub async fn save_download(dir: &Path, file_name: &str, bytes: &[u8]) -> ClientResult<PathBuf> {
    fs::create_dir_all(dir).await?;
    let path = dir.join(safe_file_name(file_name));
    fs::write(&path, bytes).await?;
    info!("saved {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

/// Keeps a name from escaping the download directory.
pub fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            other => other,
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "download".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::unique_temp_path;

    #[test]
    fn separators_are_replaced() {
        assert_eq!(safe_file_name("ponto_../../etc.csv"), "ponto_.._.._etc.csv");
        assert_eq!(safe_file_name("../x"), "_x");
        assert_eq!(safe_file_name(".."), "download");
    }

    #[tokio::test]
    async fn saves_into_directory() {
        let dir = unique_temp_path("downloads");
        let path = save_download(&dir, "ponto_alice.csv", b"Data\n").await.unwrap();
        assert_eq!(path, dir.join("ponto_alice.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"Data\n");
    }
}
