//! In-memory holding area for payment proof images.
//!
//! The image stays on the storefront until the order is confirmed; only then
//! is it uploaded to the backend. Entries expire after the configured TTL, and
//! the cache is weighed in image bytes so the total held stays under
//! `ProofConfig::cache_bytes`.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use moka::future::Cache;
use thiserror::Error;
use uuid::Uuid;

use franco_sport_core::ProofAttachment;

use crate::config::ProofConfig;
use crate::error::AppError;

/// Reasons an uploaded proof is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    #[error("payment proof file is empty")]
    Empty,
    #[error("payment proof must be an image, got {0}")]
    NotAnImage(String),
    #[error("payment proof is {size} bytes, the limit is {max}")]
    TooLarge { size: usize, max: usize },
}

impl From<ProofError> for AppError {
    fn from(err: ProofError) -> Self {
        match err {
            ProofError::TooLarge { .. } => Self::PayloadTooLarge(err.to_string()),
            ProofError::Empty | ProofError::NotAnImage(_) => Self::BadRequest(err.to_string()),
        }
    }
}

/// Image bytes held for a pending checkout.
#[derive(Debug)]
pub struct StoredProof {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl StoredProof {
    /// Inline `data:` URL for previewing the image.
    #[must_use]
    pub fn preview_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }
}

/// Proof images keyed by attachment id.
#[derive(Clone)]
pub struct ProofVault {
    cache: Cache<Uuid, Arc<StoredProof>>,
    max_bytes: usize,
}

impl ProofVault {
    #[must_use]
    pub fn new(config: ProofConfig) -> Self {
        let cache = Cache::builder()
            .weigher(|_id: &Uuid, proof: &Arc<StoredProof>| {
                u32::try_from(proof.bytes.len()).unwrap_or(u32::MAX)
            })
            .max_capacity(config.cache_bytes)
            .time_to_live(config.ttl)
            .build();

        Self {
            cache,
            max_bytes: config.max_bytes,
        }
    }

    /// Validate and hold an image, returning the attachment that refers to it.
    ///
    /// # Errors
    ///
    /// Returns `ProofError` if the file is empty, not an image, or too large.
    pub async fn accept(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ProofAttachment, ProofError> {
        if bytes.is_empty() {
            return Err(ProofError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(ProofError::TooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            });
        }
        let content_type = content_type.trim().to_ascii_lowercase();
        if !content_type.starts_with("image/") {
            return Err(ProofError::NotAnImage(content_type));
        }

        let file_name = match file_name.trim() {
            "" => "payment-proof".to_string(),
            name => name.to_string(),
        };
        let attachment = ProofAttachment {
            id: Uuid::new_v4(),
            file_name: file_name.clone(),
            content_type: content_type.clone(),
            size_bytes: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            attached_at: Utc::now(),
        };

        self.cache
            .insert(
                attachment.id,
                Arc::new(StoredProof {
                    file_name,
                    content_type,
                    bytes,
                }),
            )
            .await;

        Ok(attachment)
    }

    /// Bytes for an attachment, if they have not expired.
    pub async fn get(&self, id: Uuid) -> Option<Arc<StoredProof>> {
        self.cache.get(&id).await
    }

    /// Preview URL for an attachment, if its bytes are still held.
    pub async fn preview_url(&self, id: Uuid) -> Option<String> {
        self.get(id).await.map(|proof| proof.preview_url())
    }

    /// Drop the bytes for an attachment.
    pub async fn discard(&self, id: Uuid) {
        self.cache.invalidate(&id).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn vault(max_bytes: usize) -> ProofVault {
        ProofVault::new(ProofConfig {
            max_bytes,
            ttl: Duration::from_secs(60),
            cache_bytes: 1024 * 1024,
        })
    }

    #[tokio::test]
    async fn test_accept_and_preview() {
        let vault = vault(1024);
        let attachment = vault
            .accept("transfer.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(attachment.size_bytes, 3);
        assert_eq!(attachment.file_name, "transfer.png");
        assert_eq!(
            vault.preview_url(attachment.id).await.unwrap(),
            "data:image/png;base64,AQID"
        );
    }

    #[tokio::test]
    async fn test_rejects_bad_uploads() {
        let vault = vault(4);

        assert_eq!(
            vault.accept("a.png", "image/png", Vec::new()).await,
            Err(ProofError::Empty)
        );
        assert_eq!(
            vault.accept("a.pdf", "application/pdf", vec![1]).await,
            Err(ProofError::NotAnImage("application/pdf".to_string()))
        );
        assert_eq!(
            vault.accept("a.png", "image/png", vec![0; 5]).await,
            Err(ProofError::TooLarge { size: 5, max: 4 })
        );
    }

    #[tokio::test]
    async fn test_discard_clears_preview() {
        let vault = vault(1024);
        let attachment = vault.accept("", "IMAGE/JPEG", vec![9]).await.unwrap();
        assert_eq!(attachment.file_name, "payment-proof");
        assert_eq!(attachment.content_type, "image/jpeg");

        vault.discard(attachment.id).await;
        assert!(vault.get(attachment.id).await.is_none());
        assert!(vault.preview_url(attachment.id).await.is_none());
    }

    #[tokio::test]
    async fn test_evicts_past_byte_budget() {
        let vault = ProofVault::new(ProofConfig {
            max_bytes: 1024,
            ttl: Duration::from_secs(60),
            cache_bytes: 2048,
        });

        let mut ids = Vec::new();
        for _ in 0..6 {
            let attachment = vault
                .accept("transfer.png", "image/png", vec![7; 1000])
                .await
                .unwrap();
            ids.push(attachment.id);
        }
        vault.cache.run_pending_tasks().await;

        assert!(vault.cache.weighted_size() <= 2048);
        let mut held = 0;
        for id in ids {
            if vault.get(id).await.is_some() {
                held += 1;
            }
        }
        assert!(held <= 2, "{held} proofs still held");
    }
}
