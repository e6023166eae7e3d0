//! Render the first pages of a document for the vision path.

use futures::future::join_all;
use tracing::{info, warn};

use crate::traits::rasterizer::PageRasterizer;
use crate::types::image::PageImage;

/// Render pages `1..=max_pages` concurrently.
///
/// Pages that fail to render (including pages past the end of the document)
/// are dropped. The rest come back in page order.
pub async fn render_pages(
    rasterizer: &dyn PageRasterizer,
    document: &[u8],
    max_pages: u32,
    scale: f32,
) -> Vec<PageImage> {
    let futures = (1..=max_pages).map(|page_number| async move {
        match rasterizer.render(document, page_number, scale).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(page = page_number, error = %e, "Failed to render page, skipping");
                None
            }
        }
    });

    let rendered: Vec<PageImage> = join_all(futures).await.into_iter().flatten().collect();

    info!(
        requested = max_pages,
        rendered = rendered.len(),
        "Page rendering complete"
    );

    rendered
}
