//! Preview session state
//!
//! Each file selection starts a new generation. Results produced for an
//! older generation are refused, so a slow normalization or network call for
//! a replaced selection can never overwrite the current preview.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use hatomask_core::{AppError, FaceDetectionResult, PhotoUploadResponse};

use crate::image::NormalizedImage;
use crate::overlay::{ContainerBox, OverlayLayout, RenderRect};

/// Shared, monotonically increasing selection counter.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter(Arc<AtomicU64>);

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation and return its token.
    pub fn advance(&self) -> SelectionToken {
        let generation = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        SelectionToken {
            generation,
            counter: self.clone(),
        }
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Identifies one file selection. Cheap to clone into async work.
#[derive(Debug, Clone)]
pub struct SelectionToken {
    generation: u64,
    counter: GenerationCounter,
}

impl SelectionToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.counter.current() == self.generation
    }

    pub fn ensure_current(&self) -> Result<(), AppError> {
        let current = self.counter.current();
        if current != self.generation {
            tracing::debug!(
                stale = self.generation,
                current,
                "Discarding result for superseded selection"
            );
            return Err(AppError::Superseded {
                stale: self.generation,
                current,
            });
        }
        Ok(())
    }
}

/// Displayable preview resource. Released exactly once, when dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    generation: u64,
    image: NormalizedImage,
    live: Arc<AtomicUsize>,
}

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn image(&self) -> &NormalizedImage {
        &self.image
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(handle = self.id, generation = self.generation, "Released preview handle");
    }
}

/// State of the photo currently being previewed.
#[derive(Debug, Default)]
pub struct PreviewSession {
    generation: GenerationCounter,
    live_handles: Arc<AtomicUsize>,
    next_handle_id: u64,
    preview: Option<PreviewHandle>,
    upload: Option<PhotoUploadResponse>,
    detection: Option<FaceDetectionResult>,
    container: Option<ContainerBox>,
}

impl PreviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.current()
    }

    pub fn is_current(&self, token: &SelectionToken) -> bool {
        token.generation() == self.generation.current()
    }

    /// Begin a new selection: supersede in-flight work and release the
    /// previous preview.
    pub fn begin_selection(&mut self) -> SelectionToken {
        self.clear();
        let token = self.generation.advance();
        tracing::debug!(generation = token.generation(), "New photo selection");
        token
    }

    /// Drop the preview, upload and detection state.
    pub fn clear(&mut self) {
        self.preview = None;
        self.upload = None;
        self.detection = None;
    }

    /// Install the normalized image as the current preview.
    pub fn commit_preview(
        &mut self,
        token: &SelectionToken,
        image: NormalizedImage,
    ) -> Result<&PreviewHandle, AppError> {
        token.ensure_current()?;

        self.next_handle_id += 1;
        self.live_handles.fetch_add(1, Ordering::SeqCst);
        let handle = PreviewHandle {
            id: self.next_handle_id,
            generation: token.generation(),
            image,
            live: Arc::clone(&self.live_handles),
        };
        tracing::debug!(
            handle = handle.id,
            width = handle.image.dimensions.width,
            height = handle.image.dimensions.height,
            "Preview ready"
        );

        self.upload = None;
        self.detection = None;
        Ok(&*self.preview.insert(handle))
    }

    pub fn commit_upload(
        &mut self,
        token: &SelectionToken,
        response: PhotoUploadResponse,
    ) -> Result<(), AppError> {
        token.ensure_current()?;
        self.upload = Some(response);
        Ok(())
    }

    /// Store a detection result and return its overlay if the layout is known.
    pub fn commit_detection(
        &mut self,
        token: &SelectionToken,
        result: FaceDetectionResult,
    ) -> Result<Option<OverlayLayout>, AppError> {
        token.ensure_current()?;
        self.detection = Some(result);
        Ok(self.overlay())
    }

    /// Record a new container size and return the recomputed render rect.
    pub fn resize(&mut self, container: ContainerBox) -> Option<RenderRect> {
        self.container = Some(container);
        self.render_rect()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    pub fn upload(&self) -> Option<&PhotoUploadResponse> {
        self.upload.as_ref()
    }

    pub fn detection(&self) -> Option<&FaceDetectionResult> {
        self.detection.as_ref()
    }

    /// Render rect of the current preview; `None` until both the container
    /// and the image size are known.
    pub fn render_rect(&self) -> Option<RenderRect> {
        let container = self.container?;
        let preview = self.preview.as_ref()?;
        RenderRect::for_image(container, preview.image.dimensions)
    }

    pub fn overlay(&self) -> Option<OverlayLayout> {
        let rect = self.render_rect()?;
        let detection = self.detection.as_ref()?;
        Some(OverlayLayout::from_detection(rect, detection))
    }

    /// Number of preview handles not yet released.
    pub fn live_preview_handles(&self) -> usize {
        self.live_handles.load(Ordering::SeqCst)
    }
}
