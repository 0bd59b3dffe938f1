use std::future::Future;

use crate::errors::Result;

/// Host texture system seam.
///
/// The runtime never owns texture storage; it only hands the host the lookup
/// keys a skin needs (see [`crate::skin::texture_key`]) so they can be warmed
/// up off the per-frame tick. Implementations report a cancelled request as
/// [`crate::errors::InkError::PreloadCancelled`].
pub trait TexturePreloader: Send + Sync {
    fn preload(&self, keys: &[String]) -> impl Future<Output = Result<()>> + Send;
}

/// Preloader for hosts that load textures lazily.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTexturePreloader;

impl TexturePreloader for NullTexturePreloader {
    async fn preload(&self, _keys: &[String]) -> Result<()> {
        Ok(())
    }
}
