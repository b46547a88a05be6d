//! Resource resolution abstractions.
//!
//! Mobile hosts ship audio in three local forms besides plain files:
//! packaged resources addressed by a numeric id (`res/raw` on Android),
//! bundled assets addressed by a relative path, and arbitrary filesystem
//! paths. A [`ResourceResolver`] opens the first two as [`AssetDescriptor`]s
//! and answers existence checks for the third.

use async_trait::async_trait;
use std::fmt;
use std::fs::File;
use std::path::Path;

use crate::{error::Result, platform::PlatformSendSync};

/// An open handle to a slice of a file.
///
/// Packaged resources are frequently stored inside a larger container (an
/// APK, an asset bundle), so the audio bytes are described by an offset and a
/// length within the opened file. Dropping the descriptor closes the handle.
pub struct AssetDescriptor {
    file: File,
    start_offset: u64,
    length: u64,
    name: String,
}

impl AssetDescriptor {
    pub fn new(file: File, start_offset: u64, length: u64, name: impl Into<String>) -> Self {
        Self {
            file,
            start_offset,
            length,
            name: name.into(),
        }
    }

    /// The underlying open file.
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Byte offset of the audio data within [`file`](Self::file).
    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    /// Length in bytes of the audio data.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Name the descriptor was opened under (resource id or asset path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Close the descriptor explicitly.
    pub fn close(self) {
        drop(self);
    }
}

impl fmt::Debug for AssetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetDescriptor")
            .field("name", &self.name)
            .field("start_offset", &self.start_offset)
            .field("length", &self.length)
            .finish()
    }
}

/// Resolves local audio locations to openable handles.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::resources::ResourceResolver;
///
/// async fn has_intro(resolver: &dyn ResourceResolver) -> bool {
///     resolver.open_asset("sounds/intro.mp3").await.is_ok()
/// }
/// ```
#[async_trait]
pub trait ResourceResolver: PlatformSendSync {
    /// Open a packaged resource by its numeric id.
    async fn open_raw(&self, id: u32) -> Result<AssetDescriptor>;

    /// Open a bundled asset by its path relative to the asset root.
    async fn open_asset(&self, path: &str) -> Result<AssetDescriptor>;

    /// Check whether a filesystem path exists.
    async fn file_exists(&self, path: &Path) -> Result<bool>;
}
