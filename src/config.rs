use serde::Deserialize;
use std::path::PathBuf;

/// Config, read from a TOML file whose path is the first CLI arg.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// <address>:<port> to serve the public API and uploaded media
    pub listen_address: String,

    /// <address>:<port> to serve metrics on
    pub metrics_address: String,

    /// By default, output JSON logs. Only if this flag is set to true, output colourful human-friendly logs
    #[serde(default)]
    pub human_logs: bool,

    /// Max JSON body size the API accepts
    #[serde(default = "max_body_size")]
    pub max_body_size: usize,

    /// password to connect to database.
    pub db_dsn: String,

    /// maximum number of connections maintained by PostgresStore
    pub db_pool_size: u32,

    /// maximum seconds waiting for a database connection
    pub db_connection_timeout: u64,

    /// Whether to mount the unauthenticated /admin scope. This should only be true in trusted
    /// environments.
    #[serde(default)]
    pub enable_admin: bool,

    /// Directory holding the web client. `/` serves its `index.html`.
    #[serde(default = "static_dir")]
    pub static_dir: PathBuf,

    #[serde(default)]
    pub media: MediaConfig,
}

/// Where attachments live and how they're exposed to clients.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MediaConfig {
    /// Directory the uploaded bytes are written to.
    pub upload_dir: PathBuf,
    /// Prefix prepended to stored filenames when rendering attachment URLs.
    pub base_url: String,
    /// Lowercase file extensions, without the dot, that may be uploaded.
    pub allowed_extensions: Vec<String>,
    /// Largest upload accepted, in bytes.
    pub max_file_size: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("static/uploads"),
            base_url: "/uploads/".to_owned(),
            allowed_extensions: ["jpg", "jpeg", "png", "gif", "bmp", "webp"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_file_size: 16 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_file(filepath: &str) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(filepath)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, anyhow::Error> {
        Ok(toml::from_str(contents)?)
    }
}

fn max_body_size() -> usize {
    65536
}

fn static_dir() -> PathBuf {
    PathBuf::from("static")
}
