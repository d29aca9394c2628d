//! Avatar storage on Cloudinary.

use std::future::Future;

use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::domain::types::{AvatarUrl, Username};
use crate::models::config::CloudinaryConfig;
use crate::services::{ServiceError, ServiceResult};

/// Cloudinary folder holding every avatar.
pub const AVATAR_FOLDER: &str = "RestApp";
/// Side of the square the avatar is cropped to.
pub const AVATAR_SIZE: u32 = 250;

/// Stores avatar images and returns their public URL.
pub trait AvatarUploader {
    fn upload_avatar(
        &self,
        image: Vec<u8>,
        username: &Username,
    ) -> impl Future<Output = ServiceResult<AvatarUrl>>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    version: u64,
}

/// Uploads through the signed Cloudinary upload API. Each user has one avatar
/// at `RestApp/{username}` that is overwritten on every upload.
#[derive(Clone)]
pub struct CloudinaryUploader {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryUploader {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn upload_endpoint(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        )
    }
}

pub fn avatar_public_id(username: &Username) -> String {
    format!("{AVATAR_FOLDER}/{username}")
}

/// Delivery URL of the stored image, fill-cropped to a square.
pub fn avatar_url(cloud_name: &str, public_id: &str, version: u64) -> String {
    format!(
        "https://res.cloudinary.com/{cloud_name}/image/upload/c_fill,h_{AVATAR_SIZE},w_{AVATAR_SIZE}/v{version}/{public_id}"
    )
}

/// Signs upload parameters: `key=value` pairs sorted by key, joined with `&`,
/// followed by the API secret, hashed with SHA-256.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    hex::encode(Sha256::digest(format!("{to_sign}{api_secret}").as_bytes()))
}

impl AvatarUploader for CloudinaryUploader {
    async fn upload_avatar(&self, image: Vec<u8>, username: &Username) -> ServiceResult<AvatarUrl> {
        let public_id = avatar_public_id(username);
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[
                ("overwrite", "true"),
                ("public_id", &public_id),
                ("timestamp", &timestamp),
            ],
            &self.config.api_secret,
        );

        let form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("overwrite", "true")
            .text("public_id", public_id.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .part("file", Part::bytes(image).file_name(username.to_string()));

        let response = self
            .client
            .post(self.upload_endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                log::error!("Avatar upload request failed: {e}");
                ServiceError::Upload(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Cloudinary rejected avatar of {username}: {status} {body}");
            return Err(ServiceError::Upload(format!("storage answered {status}")));
        }

        let uploaded: UploadResponse = response.json().await.map_err(|e| {
            log::error!("Unexpected Cloudinary response: {e}");
            ServiceError::Upload(e.to_string())
        })?;

        Ok(AvatarUrl::new(avatar_url(
            &self.config.cloud_name,
            &uploaded.public_id,
            uploaded.version,
        ))?)
    }
}
