//! # Configuration
//!
//! Configuration is loaded with [`confique`], layered in priority order:
//! 1. **Environment variables**: `BOOKHUB_TAX_PERCENT`, `BOOKHUB_CURRENCY`, etc.
//! 2. **Data-directory file**: `<data_dir>/bookhub.toml`.
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `tax_percent` | `18` | GST applied to the cart subtotal at checkout |
//! | `currency` | `INR` | Currency code handed to the payment gateway |
//! | `delivery_days` | `7` | Offset from order creation to estimated delivery |
//! | `role_policy` | `email-heuristic` | How `register` assigns roles |

use crate::error::Result;
use confique::Config;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILENAME: &str = "bookhub.toml";

/// How a role is picked for a newly registered account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RolePolicy {
    /// Admin when the email contains "admin". A demo convenience, not a
    /// security boundary.
    EmailHeuristic,
    /// Everyone registers as a user. Admins are promoted with `set_role`.
    UserOnly,
}

/// Configuration for bookhub, stored in `bookhub.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BookhubConfig {
    /// Tax (GST) as a whole percentage of the subtotal.
    #[config(env = "BOOKHUB_TAX_PERCENT", default = 18)]
    pub tax_percent: u32,

    /// ISO 4217 code for payment requests.
    #[config(env = "BOOKHUB_CURRENCY", default = "INR")]
    pub currency: String,

    /// Days between order creation and the estimated delivery date.
    #[config(env = "BOOKHUB_DELIVERY_DAYS", default = 7)]
    pub delivery_days: u32,

    #[config(env = "BOOKHUB_ROLE_POLICY", default = "email-heuristic")]
    pub role_policy: RolePolicy,
}

impl Default for BookhubConfig {
    fn default() -> Self {
        Self {
            tax_percent: 18,
            currency: "INR".to_string(),
            delivery_days: 7,
            role_policy: RolePolicy::EmailHeuristic,
        }
    }
}

impl BookhubConfig {
    /// Load from the environment and `<data_dir>/bookhub.toml`. A missing
    /// file falls back to the defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config = Self::builder()
            .env()
            .file(data_dir.join(CONFIG_FILENAME))
            .load()?;
        Ok(config)
    }

    /// Tax rate as a fraction, e.g. `0.18`.
    pub fn tax_rate(&self) -> Decimal {
        Decimal::new(i64::from(self.tax_percent), 2)
    }
}
