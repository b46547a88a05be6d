//! Resource resolution backed by plain directories.
//!
//! Desktop builds have no APK or app bundle, so packaged resources and
//! bundled assets are laid out on disk:
//!
//! ```text
//! <root>/raw/2131099648.mp3      RAW id 2131099648
//! <root>/assets/sounds/intro.ogg ASSETS "sounds/intro.ogg"
//! ```

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    AssetDescriptor, ResourceResolver,
};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

const APP_DIR_NAME: &str = "playback-core";

/// Tokio-based resource resolver.
///
/// - RAW ids resolve to the file in `raw_dir` whose stem equals the id
///   (extension is ignored, as with `res/raw`)
/// - ASSETS paths are relative to `assets_dir` and may not escape it
/// - filesystem paths are checked with `tokio::fs::try_exists`
#[derive(Debug, Clone)]
pub struct TokioResourceResolver {
    raw_dir: PathBuf,
    assets_dir: PathBuf,
}

impl TokioResourceResolver {
    pub fn new(raw_dir: impl Into<PathBuf>, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            assets_dir: assets_dir.into(),
        }
    }

    /// Resolver rooted at `root/raw` and `root/assets`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(root.join("raw"), root.join("assets"))
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    async fn find_raw(&self, id: u32) -> Result<PathBuf> {
        let wanted = id.to_string();
        let mut entries = fs::read_dir(&self.raw_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let matches = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map_or(false, |stem| stem == wanted);
            if matches && entry.file_type().await?.is_file() {
                return Ok(path);
            }
        }

        Err(BridgeError::NotAvailable(format!(
            "No raw resource with id {}",
            id
        )))
    }

    fn asset_path(&self, relative: &str) -> Result<PathBuf> {
        let relative = Path::new(relative);
        let escapes = relative.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });

        if relative.as_os_str().is_empty() || escapes {
            return Err(BridgeError::NotAvailable(format!(
                "Asset path {:?} is outside the asset root",
                relative
            )));
        }

        Ok(self.assets_dir.join(relative))
    }

    async fn open_descriptor(path: &Path, name: String) -> Result<AssetDescriptor> {
        let file = fs::File::open(path).await?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(BridgeError::NotAvailable(format!("{} is not a file", name)));
        }

        debug!(name = %name, length = metadata.len(), "Opened descriptor");
        Ok(AssetDescriptor::new(
            file.into_std().await,
            0,
            metadata.len(),
            name,
        ))
    }
}

impl Default for TokioResourceResolver {
    /// Rooted at the platform data directory (`~/.local/share/playback-core` on Linux).
    fn default() -> Self {
        let root = dirs::data_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".local")
                    .join("share")
            })
            .join(APP_DIR_NAME);

        Self::with_root(root)
    }
}

#[async_trait]
impl ResourceResolver for TokioResourceResolver {
    async fn open_raw(&self, id: u32) -> Result<AssetDescriptor> {
        let path = self.find_raw(id).await?;
        Self::open_descriptor(&path, id.to_string()).await
    }

    async fn open_asset(&self, path: &str) -> Result<AssetDescriptor> {
        let full_path = self.asset_path(path)?;
        match Self::open_descriptor(&full_path, path.to_string()).await {
            Err(BridgeError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Err(
                BridgeError::NotAvailable(format!("No asset at {}", path)),
            ),
            other => other,
        }
    }

    async fn file_exists(&self, path: &Path) -> Result<bool> {
        Ok(fs::try_exists(path).await?)
    }
}
