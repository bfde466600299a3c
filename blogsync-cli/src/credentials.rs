//! Locating the write.as access token.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("no access token found in {} or $WA_TOKEN", .0.display())]
    Missing(PathBuf),
}

#[derive(Debug, Deserialize)]
struct UserFile {
    #[serde(default)]
    access_token: String,
}

/// Path of the user file written by the writeas CLI.
pub fn user_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".writeas")
        .join("user.json")
}

/// Token from `user_file`, falling back to `env_token` (from `$WA_TOKEN`).
pub fn load_token(user_file: &Path, env_token: Option<&str>) -> Result<String, CredentialsError> {
    if let Some(token) = read_user_file(user_file) {
        return Ok(token);
    }
    match env_token {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(CredentialsError::Missing(user_file.to_path_buf())),
    }
}

fn read_user_file(path: &Path) -> Option<String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::debug!("error opening {}, trying $WA_TOKEN instead: {}", path.display(), err);
            return None;
        }
    };
    let user: UserFile = match serde_json::from_str(&contents) {
        Ok(user) => user,
        Err(err) => {
            tracing::debug!("error decoding {}, trying $WA_TOKEN instead: {}", path.display(), err);
            return None;
        }
    };
    if user.access_token.is_empty() {
        tracing::debug!("no token found in {}, trying $WA_TOKEN instead", path.display());
        return None;
    }
    Some(user.access_token)
}
