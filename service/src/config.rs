//! Service configuration.
//!
//! ```yaml
//! listen: ":8000"
//! model_path: models/voiceguard_model.msgpack
//! max_upload_bytes: 26214400
//! spool_dir: /var/tmp/voiceguard   # optional; omit to decode in memory
//! target_sample_rate: 16000        # optional; omit to keep the source rate
//! cors:
//!   allow_any_origin: true
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::StartupError;

/// Default listen address.
pub const DEFAULT_LISTEN: &str = ":8000";
/// Default model artifact location.
pub const DEFAULT_MODEL_PATH: &str = "models/voiceguard_model.msgpack";
/// Default upload size limit (25 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// `host:port`, or `:port` to listen on all interfaces.
    pub listen: String,

    /// Trained model artifact. Loaded once at startup.
    pub model_path: PathBuf,

    /// Largest accepted request body.
    pub max_upload_bytes: usize,

    /// Directory for per-request upload files. `None` decodes uploads
    /// directly from memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spool_dir: Option<PathBuf>,

    /// Resample uploads to this rate before extraction. The model's schema
    /// records the rate it was trained at; startup fails unless they agree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_sample_rate: Option<u32>,

    pub cors: CorsConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            spool_dir: None,
            target_sample_rate: None,
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_any_origin: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_any_origin: true,
        }
    }
}

impl ServiceConfig {
    /// Reads a YAML config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            StartupError::Config(format!("read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, StartupError> {
        serde_yaml::from_str(text).map_err(|e| StartupError::Config(e.to_string()))
    }

    /// Parses [`ServiceConfig::listen`]; `:8000` becomes `0.0.0.0:8000`.
    pub fn socket_addr(&self) -> Result<SocketAddr, StartupError> {
        parse_addr(&self.listen)
    }
}

fn parse_addr(addr: &str) -> Result<SocketAddr, StartupError> {
    let full = if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    };
    full.parse()
        .map_err(|_| StartupError::Config(format!("invalid listen address: {}", addr)))
}
