use std::{env, str::FromStr};

use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub board: BoardConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub max_clients: usize,
    /// Share of connected clients whose attestation validates a pin.
    pub quorum_ratio: f64,
    pub max_pin_name_length: usize,
    pub max_chat_message_length: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            max_clients: 50,
            quorum_ratio: 0.5,
            max_pin_name_length: 64,
            max_chat_message_length: 500,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                host: env_or_default("HOST", "127.0.0.1"),
                port: env_or_parse("PORT", 8080)?,
                cors_allowed_origins: env_list("CORS_ALLOWED_ORIGINS", vec!["".into()]),
                max_concurrent_requests: env_or_parse("SERVER_MAX_CONCURRENT_REQUESTS", 100)?,
            },
            board: BoardConfig {
                max_clients: env_or_parse("BOARD_MAX_CLIENTS", 50)?,
                quorum_ratio: env_or_parse("QUORUM_RATIO", 0.5)?,
                max_pin_name_length: env_or_parse("MAX_PIN_NAME_LENGTH", 64)?,
                max_chat_message_length: env_or_parse("MAX_CHAT_MESSAGE_LENGTH", 500)?,
            },
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.board.max_clients == 0 {
            return Err(AppError::InvalidParams(
                "BOARD_MAX_CLIENTS must be positive".into(),
            ));
        }

        if !(self.board.quorum_ratio > 0.0 && self.board.quorum_ratio <= 1.0) {
            return Err(AppError::InvalidParams(
                "QUORUM_RATIO must be in (0, 1]".into(),
            ));
        }

        if self.board.max_pin_name_length == 0 || self.board.max_chat_message_length == 0 {
            return Err(AppError::InvalidParams(
                "Length limits must be positive".into(),
            ));
        }

        Ok(())
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|_| AppError::InvalidParams(format!("Invalid value for {key}"))),
        Err(_) => Ok(default),
    }
}

fn env_list(key: &str, default: Vec<String>) -> Vec<String> {
    env::var(key)
        .map(|val| {
            val.split(',')
                .map(|str_val| str_val.trim().to_string())
                .collect()
        })
        .unwrap_or(default)
}
