use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::{AudioError, Loader, Waveform};

/// Uploaded audio bytes held in a uniquely named temporary file.
///
/// Every instance owns its own file, so concurrent uploads never share a
/// path. The file is removed when the value is dropped, on success and on
/// every error path.
pub struct SpooledAudio {
    file: NamedTempFile,
}

impl SpooledAudio {
    /// Writes `data` to a fresh temporary file inside `dir`.
    pub fn create_in(dir: impl AsRef<Path>, data: &[u8]) -> Result<Self, AudioError> {
        let mut file = Builder::new()
            .prefix("voiceguard-upload-")
            .tempfile_in(dir)?;
        file.write_all(data)?;
        file.flush()?;
        debug!(path = %file.path().display(), bytes = data.len(), "spooled upload");
        Ok(Self { file })
    }

    /// Writes `data` to a fresh temporary file in the system temp directory.
    pub fn create(data: &[u8]) -> Result<Self, AudioError> {
        Self::create_in(std::env::temp_dir(), data)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Decodes the spooled file with the given loader.
    pub fn load(&self, loader: &Loader) -> Result<Waveform, AudioError> {
        loader.load_file(self.file.path())
    }

    /// Removes the file now and reports any removal error.
    pub fn close(self) -> Result<(), AudioError> {
        let path: PathBuf = self.file.path().to_path_buf();
        self.file.close()?;
        debug!(path = %path.display(), "removed spooled upload");
        Ok(())
    }
}
