//! Locally displayable preview references
//!
//! A preview is a `blob:` style URL that a display layer resolves back to the
//! image through the registry. The registration lives exactly as long as the
//! `Preview` value: dropping it releases the URL.

use super::ImageFile;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const PREVIEW_SCHEME: &str = "blob:agri-assist/";

/// Registry of live preview URLs
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    entries: Arc<Mutex<HashMap<String, ImageFile>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a preview for `file`
    pub fn create(&self, file: &ImageFile) -> Preview {
        let url = format!("{PREVIEW_SCHEME}{}", uuid::Uuid::new_v4());
        self.lock().insert(url.clone(), file.clone());
        tracing::trace!(url = %url, name = %file.name, "Preview created");
        Preview {
            url,
            registry: self.clone(),
        }
    }

    /// Look up the image behind a live preview URL
    #[allow(dead_code)] // Display layers resolve previews through this
    pub fn resolve(&self, url: &str) -> Option<ImageFile> {
        self.lock().get(url).cloned()
    }

    /// Number of previews not yet released
    #[allow(dead_code)] // Used in tests
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, url: &str) {
        if self.lock().remove(url).is_some() {
            tracing::trace!(url = %url, "Preview released");
        } else {
            tracing::warn!(url = %url, "Preview released twice");
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ImageFile>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for PreviewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}

/// Owned preview registration, released on drop
pub struct Preview {
    url: String,
    registry: PreviewRegistry,
}

impl Preview {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for Preview {
    fn drop(&mut self) {
        self.registry.release(&self.url);
    }
}

impl fmt::Debug for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Preview").field(&self.url).finish()
    }
}
