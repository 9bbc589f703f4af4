use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::model::{ProcessingOutcome, SketchImage};
use storage::sketch_store::SketchStore;
use tokio::sync::Mutex;

use crate::error::{ProcessingError, SketchServiceError};
use crate::processor::ImageProcessor;

/// Result of one accepted upload.
#[derive(Debug)]
pub struct SketchSubmission {
    pub path: PathBuf,
    pub bytes: usize,
    /// How the prediction script fared; the upload counts as accepted either way.
    pub processing: Result<ProcessingOutcome, ProcessingError>,
}

/// Saves uploaded sketches and runs the prediction script on them.
pub struct SketchService {
    store: Arc<dyn SketchStore>,
    processor: Arc<dyn ImageProcessor>,
    // All uploads share one file; hold this across save + process so each
    // run sees the image it was started for.
    gate: Mutex<()>,
}

impl SketchService {
    #[must_use]
    pub fn new(store: Arc<dyn SketchStore>, processor: Arc<dyn ImageProcessor>) -> Self {
        Self {
            store,
            processor,
            gate: Mutex::new(()),
        }
    }

    /// Decode a base64 upload and submit it.
    ///
    /// # Errors
    ///
    /// Returns `SketchServiceError::Image` for undecodable payloads and
    /// `SketchServiceError::Storage` if the image cannot be written.
    pub async fn submit_base64(&self, payload: &str) -> Result<SketchSubmission, SketchServiceError> {
        let image = SketchImage::from_base64(payload)?;
        self.submit(image).await
    }

    /// Replace the stored sketch and process it.
    ///
    /// # Errors
    ///
    /// Returns `SketchServiceError::Storage` if the image cannot be written.
    /// Processor failures are reported in `SketchSubmission::processing`.
    pub async fn submit(&self, image: SketchImage) -> Result<SketchSubmission, SketchServiceError> {
        let _guard = self.gate.lock().await;

        let path = self.store.save(&image).await?;
        let processing = self.processor.process(&path).await;
        match &processing {
            Ok(outcome) if !outcome.success() => tracing::warn!(
                path = %path.display(),
                exit_code = ?outcome.exit_code(),
                "prediction script reported failure"
            ),
            Ok(_) => {}
            Err(err) => tracing::error!(
                path = %path.display(),
                error = %err,
                "prediction script could not be run"
            ),
        }

        Ok(SketchSubmission {
            path,
            bytes: image.len(),
            processing,
        })
    }
}
