//! Content-level deduplication
//!
//! Bodies are fingerprinted with SHA-256 truncated to 128 bits. The first URL
//! to produce a fingerprint becomes its canonical URL; later URLs with the
//! same body are duplicates and are never expanded.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Number of digest bytes kept in a fingerprint
const FINGERPRINT_BYTES: usize = 16;

/// Computes the hex-encoded 128-bit content fingerprint
pub fn fingerprint(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

/// Result of checking a body against the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupVerdict {
    /// First time this content was seen
    Unique { hash: String },

    /// Same content was already seen at `canonical`
    Duplicate { hash: String, canonical: String },
}

impl DedupVerdict {
    pub fn hash(&self) -> &str {
        match self {
            Self::Unique { hash } | Self::Duplicate { hash, .. } => hash,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    pub fn canonical(&self) -> Option<&str> {
        match self {
            Self::Unique { .. } => None,
            Self::Duplicate { canonical, .. } => Some(canonical),
        }
    }
}

/// Maps content fingerprints to the first URL that produced them
#[derive(Debug, Default)]
pub struct ContentDedupIndex {
    seen: Mutex<HashMap<String, String>>,
}

impl ContentDedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprints `content` and records `url` as canonical if it is new
    pub async fn check(&self, url: &str, content: &[u8]) -> DedupVerdict {
        let hash = fingerprint(content);
        let mut seen = self.seen.lock().await;

        match seen.get(&hash) {
            Some(canonical) => DedupVerdict::Duplicate {
                canonical: canonical.clone(),
                hash,
            },
            None => {
                seen.insert(hash.clone(), url.to_string());
                DedupVerdict::Unique { hash }
            }
        }
    }

    /// Returns true if `content` was already seen under another URL
    pub async fn is_duplicate(&self, url: &str, content: &[u8]) -> bool {
        self.check(url, content).await.is_duplicate()
    }

    /// Returns the canonical URL recorded for a fingerprint
    pub async fn canonical_for(&self, hash: &str) -> Option<String> {
        self.seen.lock().await.get(hash).cloned()
    }

    /// Number of distinct fingerprints seen
    pub async fn len(&self) -> usize {
        self.seen.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
