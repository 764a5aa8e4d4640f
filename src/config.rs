/// Настройки очистки и сервера

use std::env::VarError;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

pub const ADDR_ENV: &str = "HOUSING_PREP_ADDR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Колонки-идентификаторы, которые не нужны модели
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,
    /// Колонка, по которой отсекаются выбросы
    #[serde(default = "default_target_column")]
    pub target_column: String,
    #[serde(default = "default_lower_quantile")]
    pub lower_quantile: f64,
    #[serde(default = "default_upper_quantile")]
    pub upper_quantile: f64,
}

fn default_drop_columns() -> Vec<String> {
    ["Unnamed: 0", "municipality_code", "locality", "postal_code"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_target_column() -> String { "price".to_string() }
fn default_lower_quantile() -> f64 { 0.01 }
fn default_upper_quantile() -> f64 { 0.99 }

impl CleanerConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, q) in [
            ("lower_quantile", self.lower_quantile),
            ("upper_quantile", self.upper_quantile),
        ] {
            if !(0.0..=1.0).contains(&q) {
                return Err(PrepError::InvalidParameter(format!(
                    "{} must be within [0, 1], got {}",
                    name, q
                )));
            }
        }

        if self.lower_quantile >= self.upper_quantile {
            return Err(PrepError::InvalidParameter(format!(
                "lower_quantile ({}) must be below upper_quantile ({})",
                self.lower_quantile, self.upper_quantile
            )));
        }

        if self.target_column.is_empty() {
            return Err(PrepError::InvalidParameter(
                "target_column must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            drop_columns: default_drop_columns(),
            target_column: default_target_column(),
            lower_quantile: default_lower_quantile(),
            upper_quantile: default_upper_quantile(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl ServerConfig {
    /// Адрес берётся из `HOUSING_PREP_ADDR`, по умолчанию 0.0.0.0:8000
    pub fn from_env() -> Result<Self> {
        Self::from_var(std::env::var(ADDR_ENV))
    }

    fn from_var(var: std::result::Result<String, VarError>) -> Result<Self> {
        match var {
            Ok(addr) => addr
                .parse()
                .map(|addr| Self { addr })
                .map_err(|e| PrepError::InvalidParameter(format!("{}={}: {}", ADDR_ENV, addr, e))),
            Err(VarError::NotPresent) => Ok(Self::default()),
            Err(VarError::NotUnicode(raw)) => Err(PrepError::InvalidParameter(format!(
                "{} is not valid unicode: {:?}",
                ADDR_ENV, raw
            ))),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }
}
