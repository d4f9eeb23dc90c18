use std::env;

use async_trait::async_trait;
use serde::Deserialize;
use sha1::{Digest, Sha1};

use crate::{error::Error, Result};

pub const COVERS_FOLDER: &str = "rap2rue/covers";
pub const AUDIOS_FOLDER: &str = "rap2rue/audios";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceType {
    Image,
    /// Cloudinary files audio under the video resource type.
    Video,
}

#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub folder: &'static str,
    pub resource_type: ResourceType,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Managed media host; returns the public URL of the stored file.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, upload: MediaUpload) -> Result<String>;
}

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinaryConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            cloud_name: env::var("CLOUDINARY_CLOUD_NAME")?,
            api_key: env::var("CLOUDINARY_API_KEY")?,
            api_secret: env::var("CLOUDINARY_API_SECRET")?,
        })
    }
}

#[derive(Deserialize, Debug)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<UploadError>,
}

#[derive(Deserialize, Debug)]
struct UploadError {
    message: String,
}

pub struct CloudinaryClient {
    config: CloudinaryConfig,
    http: reqwest::Client,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

/// Signature of a signed upload: SHA-1 of the sorted parameters followed by
/// the API secret.
fn sign(folder: &str, timestamp: i64, api_secret: &str) -> String {
    let payload = format!("folder={folder}&timestamp={timestamp}{api_secret}");
    hex::encode(Sha1::digest(payload.as_bytes()))
}

fn media_error(message: impl Into<String>) -> Error {
    Error::MediaProvider {
        message: message.into(),
    }
}

#[async_trait]
impl MediaStore for CloudinaryClient {
    async fn upload(&self, upload: MediaUpload) -> Result<String> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = sign(upload.folder, timestamp, &self.config.api_secret);

        let mut file = reqwest::multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type {
            file = file
                .mime_str(&content_type)
                .map_err(|e| media_error(format!("Type de fichier invalide: {e}")))?;
        }

        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", upload.folder)
            .text("signature", signature);

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/{}/upload",
            self.config.cloud_name,
            upload.resource_type.as_ref()
        );

        let response: UploadResponse = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| media_error(format!("Erreur upload: {e}")))?
            .json()
            .await
            .map_err(|e| media_error(format!("Réponse Cloudinary illisible: {e}")))?;

        match (response.secure_url, response.error) {
            (Some(url), _) => Ok(url),
            (None, Some(error)) => Err(media_error(error.message)),
            (None, None) => Err(media_error("Erreur upload.")),
        }
    }
}
