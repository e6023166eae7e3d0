//! Page rasterizer trait.

use async_trait::async_trait;

use crate::error::RasterizeError;
use crate::types::image::PageImage;

/// Renders a single document page to an image.
///
/// Rendering itself lives outside this crate; implementations wrap whatever
/// renderer the host application uses.
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    /// Render `page_number` (1-based) at `scale`.
    ///
    /// Pages past the end of the document must fail with
    /// [`RasterizeError::PageOutOfRange`] rather than panic.
    async fn render(
        &self,
        document: &[u8],
        page_number: u32,
        scale: f32,
    ) -> Result<PageImage, RasterizeError>;
}
