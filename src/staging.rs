//! Pending image attachments for the next outbound message

use crate::attachment::{ImageFile, PreviewRegistry, UploadedImage};

/// Maximum number of images attached to a single message
pub const MAX_STAGED_IMAGES: usize = 5;

/// Outcome of a `stage` call
#[derive(Debug, Default)]
pub struct StageReport {
    /// Images appended to the buffer, in input order
    pub added: Vec<UploadedImage>,
    /// Candidates skipped because they are not images
    pub skipped_non_images: usize,
    /// Images dropped because the buffer was full
    pub dropped_over_capacity: usize,
}

impl StageReport {
    pub fn hit_capacity(&self) -> bool {
        self.dropped_over_capacity > 0
    }
}

/// Bounded buffer of staged images
#[derive(Debug)]
pub struct ImageStaging {
    images: Vec<UploadedImage>,
    previews: PreviewRegistry,
}

impl ImageStaging {
    pub fn new(previews: PreviewRegistry) -> Self {
        Self {
            images: Vec::new(),
            previews,
        }
    }

    /// Stage image files, up to the remaining capacity
    pub fn stage(&mut self, files: impl IntoIterator<Item = ImageFile>) -> StageReport {
        let mut report = StageReport::default();
        let remaining = MAX_STAGED_IMAGES.saturating_sub(self.images.len());

        for file in files {
            if !file.is_image() {
                report.skipped_non_images += 1;
                continue;
            }
            if report.added.len() >= remaining {
                report.dropped_over_capacity += 1;
                continue;
            }
            report.added.push(UploadedImage::new(file, &self.previews));
        }

        self.images.extend(report.added.iter().cloned());

        if report.hit_capacity() {
            tracing::info!(
                dropped = report.dropped_over_capacity,
                max = MAX_STAGED_IMAGES,
                "Image limit reached, extra images not attached"
            );
        }
        report
    }

    /// Remove a staged image and release its preview. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> Option<UploadedImage> {
        let index = self.images.iter().position(|img| img.id == id)?;
        Some(self.images.remove(index))
    }

    /// Discard all staged images
    pub fn clear(&mut self) {
        self.images.clear();
    }

    pub fn images(&self) -> &[UploadedImage] {
        &self.images
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    #[allow(dead_code)] // Used in tests
    pub fn is_full(&self) -> bool {
        self.images.len() >= MAX_STAGED_IMAGES
    }
}
