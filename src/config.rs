use crate::error::{BadEnvVarSnafu, ParseServerAddressSnafu, PhotoRollResult};
use dotenvy::var;
use snafu::ResultExt;
use std::{env::VarError, net::SocketAddr, path::PathBuf, sync::Arc};

pub const DEFAULT_SERVER_IP: &str = "0.0.0.0:5010";
pub const DEFAULT_DB_FILE: &str = "sample_db.sqlite";
pub const DEFAULT_UPLOAD_DIR: &str = "files";
pub const DEFAULT_SITE_NAME: &str = "学生管理系统";

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_config: Arc<ServerConfig>,
}

impl RuntimeConfiguration {
    pub fn new() -> PhotoRollResult<Self> {
        Ok(Self::from_server_config(ServerConfig::new()?))
    }

    pub fn from_server_config(server_config: ServerConfig) -> Self {
        Self {
            server_config: Arc::new(server_config),
        }
    }

    pub fn server_config(&self) -> Arc<ServerConfig> {
        self.server_config.clone()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_ip: SocketAddr,
    pub db_file: PathBuf,
    pub upload_dir: PathBuf,
    pub site_name: String,
}

impl ServerConfig {
    pub fn new() -> PhotoRollResult<Self> {
        let server_ip = optional_env_var("PHOTOROLL_SERVER_IP")?
            .unwrap_or_else(|| DEFAULT_SERVER_IP.to_string());
        let server_ip = server_ip.parse().context(ParseServerAddressSnafu {
            original: server_ip,
        })?;

        Ok(Self {
            server_ip,
            db_file: optional_env_var("PHOTOROLL_DB_FILE")?
                .map_or_else(|| DEFAULT_DB_FILE.into(), PathBuf::from),
            upload_dir: optional_env_var("PHOTOROLL_UPLOAD_DIR")?
                .map_or_else(|| DEFAULT_UPLOAD_DIR.into(), PathBuf::from),
            site_name: optional_env_var("PHOTOROLL_SITE_NAME")?
                .unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
        })
    }

    ///everything lives under `root` - handy for tests and throwaway instances
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            server_ip: SocketAddr::from(([127, 0, 0, 1], 0)),
            db_file: root.join(DEFAULT_DB_FILE),
            upload_dir: root.join(DEFAULT_UPLOAD_DIR),
            site_name: DEFAULT_SITE_NAME.to_string(),
        }
    }
}

fn optional_env_var(name: &'static str) -> PhotoRollResult<Option<String>> {
    match var(name) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(source) => Err(source).context(BadEnvVarSnafu { name }),
    }
}
