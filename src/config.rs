use std::env;
use std::net::SocketAddr;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct BlobConfig {
    pub upload_url: String,
    pub api_key: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub relay_url: String,
    pub api_key: Option<String>,
    pub from: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    /// Remote blob service; when absent uploads go to `local_blob_dir`.
    pub blob: Option<BlobConfig>,
    pub local_blob_dir: String,
    pub public_base_url: String,
    /// Mail relay; when absent credential mails are only logged.
    pub mail: Option<MailConfig>,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://portal.db".to_string());
        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().map_err(|_| {
                AppError::BadRequest(format!("DATABASE_MAX_CONNECTIONS is not a number: {}", raw))
            })?,
            Err(_) => 5,
        };
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|e| AppError::BadRequest(format!("BIND_ADDR is invalid: {}", e)))?;

        let blob = env::var("BLOB_UPLOAD_URL").ok().map(|upload_url| BlobConfig {
            upload_url,
            api_key: env::var("BLOB_API_KEY").ok(),
        });
        let local_blob_dir = env::var("BLOB_LOCAL_DIR").unwrap_or_else(|_| "uploads".to_string());
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}/files", bind_addr));

        let mail = match env::var("MAIL_RELAY_URL") {
            Ok(relay_url) => {
                let from = env::var("MAIL_FROM")
                    .map_err(|_| AppError::BadRequest("MAIL_FROM is not set".to_string()))?;
                Some(MailConfig {
                    relay_url,
                    api_key: env::var("MAIL_API_KEY").ok(),
                    from,
                })
            }
            Err(_) => None,
        };

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            blob,
            local_blob_dir,
            public_base_url,
            mail,
        })
    }
}
