use std::env;
use std::net::SocketAddr;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub bind_addr: SocketAddr,
    pub offline: bool,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let offline = env::var("ACADEMIC_API_OFFLINE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let api_url = env::var("ACADEMIC_API_URL").ok().filter(|v| !v.trim().is_empty());
        if api_url.is_none() && !offline {
            return Err(AppError::Config("ACADEMIC_API_URL is not set".to_string()));
        }

        let api_token = env::var("ACADEMIC_API_TOKEN").ok().filter(|v| !v.trim().is_empty());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        Ok(Self {
            api_url,
            api_token,
            bind_addr,
            offline,
        })
    }
}
