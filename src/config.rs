use std::env;
use std::time::Duration;

use crate::error::AppError;
use crate::location::AcquireOptions;
use crate::models::position::GeoPoint;
use crate::models::status::StatusVocabulary;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub event_buffer_size: usize,
    pub authorized_email: String,
    pub driver_secret: String,
    pub driver_position: Option<GeoPoint>,
    pub position_timeout_secs: u64,
    pub position_retries: u32,
    pub position_retry_delay_ms: u64,
    pub status_vocabulary: StatusVocabulary,
    pub allow_free_transitions: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let status_vocabulary = match env::var("STATUS_VOCABULARY")
            .unwrap_or_else(|_| "in-progress".to_string())
            .as_str()
        {
            "in-progress" => StatusVocabulary::standard(),
            "out-for-delivery" => StatusVocabulary::out_for_delivery(),
            other => {
                return Err(AppError::Internal(format!(
                    "invalid STATUS_VOCABULARY: {other}"
                )));
            }
        };

        let driver_position = match (env::var("DRIVER_LAT"), env::var("DRIVER_LNG")) {
            (Ok(lat), Ok(lng)) => {
                let position = GeoPoint {
                    lat: lat
                        .parse()
                        .map_err(|err| AppError::Internal(format!("invalid DRIVER_LAT: {err}")))?,
                    lng: lng
                        .parse()
                        .map_err(|err| AppError::Internal(format!("invalid DRIVER_LNG: {err}")))?,
                };
                position.validate()?;
                Some(position)
            }
            _ => None,
        };

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            authorized_email: env::var("AUTHORIZED_EMAIL")
                .unwrap_or_else(|_| "driver@example.com".to_string()),
            driver_secret: env::var("DRIVER_SECRET").unwrap_or_else(|_| "driver".to_string()),
            driver_position,
            position_timeout_secs: parse_or_default("POSITION_TIMEOUT_SECS", 10)?,
            position_retries: parse_or_default("POSITION_RETRIES", 0)?,
            position_retry_delay_ms: parse_or_default("POSITION_RETRY_DELAY_MS", 500)?,
            status_vocabulary,
            allow_free_transitions: parse_or_default("ALLOW_FREE_TRANSITIONS", false)?,
        })
    }

    pub fn acquire_options(&self) -> AcquireOptions {
        AcquireOptions {
            timeout: Duration::from_secs(self.position_timeout_secs),
            retries: self.position_retries,
            retry_delay: Duration::from_millis(self.position_retry_delay_ms),
        }
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
