use std::path::PathBuf;

use crate::error::StationError;

/// The default bind address.
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// The default listening port.
pub const DEFAULT_PORT: u16 = 5000;

/// The default location of the readings mirror file.
pub const DEFAULT_DATA_FILE: &str = "data/sensor-data.json";

/// The default capacity bound of the readings store.
pub const DEFAULT_MAX_RECORDS: usize = 500;

/// Server configuration, built once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub address: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub max_records: usize,
}

impl Config {
    /// Reads configuration from the environment (a `.env` file is honored
    /// when present), falling back to the defaults above. Numeric values
    /// that are present but unparseable fail startup instead of being
    /// silently defaulted.
    pub fn from_env() -> Result<Self, StationError> {
        let address =
            dotenvy::var("STATION_ADDRESS").unwrap_or_else(|_| DEFAULT_ADDRESS.to_string());
        let port = match dotenvy::var("STATION_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| StationError::InvalidConfig(format!("STATION_PORT={raw}")))?,
            Err(_) => DEFAULT_PORT,
        };
        let data_file = dotenvy::var("STATION_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_FILE));
        let max_records = match dotenvy::var("STATION_MAX_RECORDS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| StationError::InvalidConfig(format!("STATION_MAX_RECORDS={raw}")))?,
            Err(_) => DEFAULT_MAX_RECORDS,
        };

        Ok(Self {
            address,
            port,
            data_file,
            max_records,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
