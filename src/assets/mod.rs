//! Asset storage.
//!
//! A project's costumes and sounds live somewhere: on the remote asset
//! server, inside the zip the project came in, or inside the zip produced
//! by converting a Scratch 1.x binary. [`AssetStore`] hides which one.
//! Everything downstream calls [`AssetStore::fetch_file`] and never looks
//! at the variant.
//!
//! ```text
//! ┌──────────────────┐  ┌──────────────┐  ┌─────────────────────┐
//! │ RemoteAssetServer│  │  ZipArchive  │  │ LegacyBinaryArchive │
//! │  (content hash)  │  │ (entry path) │  │ (converted zip)     │
//! └────────┬─────────┘  └──────┬───────┘  └──────────┬──────────┘
//!          └──────────── fetch_file(name) ───────────┘
//! ```

mod archive;
mod legacy;
mod remote;

pub use archive::ZipIndex;
pub use legacy::{LegacyBinaryArchive, LegacyConverter, LegacyProject, NoLegacyConverter};
pub use remote::RemoteAssetServer;

use crate::error::{ConvertError, Result};

/// Which backend an [`AssetStore`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStoreKind {
    RemoteAssetServer,
    ZipArchive,
    LegacyBinaryArchive,
}

/// Resolves asset names to bytes. One store backs one project read.
#[derive(Debug)]
pub enum AssetStore {
    RemoteAssetServer(RemoteAssetServer),
    ZipArchive(ZipIndex),
    LegacyBinaryArchive(LegacyBinaryArchive),
}

impl AssetStore {
    /// Fetch the raw bytes of an asset.
    ///
    /// Fails with [`ConvertError::AssetNotFound`] when the store has no
    /// such asset.
    pub async fn fetch_file(&self, name: &str) -> Result<Vec<u8>> {
        match self {
            AssetStore::RemoteAssetServer(server) => server.fetch(name).await,
            AssetStore::ZipArchive(index) => index.get(name).map(<[u8]>::to_vec),
            AssetStore::LegacyBinaryArchive(archive) => archive.get(name).map(<[u8]>::to_vec),
        }
    }

    /// Fetch an asset as UTF-8 text.
    pub async fn fetch_text(&self, name: &str) -> Result<String> {
        let bytes = self.fetch_file(name).await?;
        String::from_utf8(bytes).map_err(|e| ConvertError::MalformedDialect {
            dialect: "text asset",
            message: format!("{name} is not UTF-8: {e}"),
        })
    }

    pub fn kind(&self) -> AssetStoreKind {
        match self {
            AssetStore::RemoteAssetServer(_) => AssetStoreKind::RemoteAssetServer,
            AssetStore::ZipArchive(_) => AssetStoreKind::ZipArchive,
            AssetStore::LegacyBinaryArchive(_) => AssetStoreKind::LegacyBinaryArchive,
        }
    }
}
