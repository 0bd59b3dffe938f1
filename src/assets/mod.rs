//! Document and texture I/O seams.

pub mod io;
pub mod textures;

#[cfg(not(target_arch = "wasm32"))]
pub use io::FileDocumentReader;
pub use io::{DocumentReader, MemoryDocumentReader};
pub use textures::{NullTexturePreloader, TexturePreloader};
