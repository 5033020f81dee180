use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::{GenerationError, GenerationRequest};

/// Lazy, finite, non-restartable sequence of generated text fragments.
pub type FragmentStream<'a> = BoxStream<'a, Result<String, GenerationError>>;

/// A model-backed text generator.
///
/// Implementations must stop producing fragments promptly once `cancel` fires
/// and should surface that as [`GenerationError::Cancelled`]. Dropping the
/// stream must release any in-flight work as well.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
        cancel: CancellationToken,
    ) -> FragmentStream<'a>;
}
