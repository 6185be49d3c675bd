//! Read-side queries.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Canvas;
use crate::error::SketchResult;
use crate::store::CanvasRepository;

/// Load a canvas with its full task log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrieveCanvas {
    /// Canvas to load.
    pub id: Uuid,
}

/// Handles [`RetrieveCanvas`]. Reads take no canvas lock.
#[derive(Clone)]
pub struct RetrieveCanvasHandler {
    repository: Arc<dyn CanvasRepository>,
}

impl RetrieveCanvasHandler {
    /// Creates a handler reading from `repository`.
    pub fn new(repository: Arc<dyn CanvasRepository>) -> Self {
        Self { repository }
    }

    /// Loads the canvas.
    ///
    /// # Errors
    ///
    /// - [`SketchError::CanvasNotFound`](crate::SketchError::CanvasNotFound)
    ///   if no canvas has this id.
    /// - [`SketchError::Store`](crate::SketchError::Store) on storage
    ///   failures.
    pub async fn handle(&self, query: RetrieveCanvas) -> SketchResult<Canvas> {
        self.repository.find_by_id(query.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::MockRepository;
    use crate::error::SketchError;

    #[tokio::test]
    async fn not_found_passes_through() {
        let mut mock = MockRepository::new();
        mock.expect_find_by_id()
            .returning(|id| Err(SketchError::CanvasNotFound { id }));

        let id = Uuid::new_v4();
        let result = RetrieveCanvasHandler::new(Arc::new(mock))
            .handle(RetrieveCanvas { id })
            .await;
        assert!(matches!(result, Err(SketchError::CanvasNotFound { id: missing }) if missing == id));
    }
}
