use serde::Deserialize;
use std::env;
use surety_core::{LedgerConfig, SuretyError, SuretyResult};
use surety_shared::units::parse_units;
use surety_shared::AccountId;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Ledger settings as written in config files; amounts are human-decimal
#[derive(Debug, Deserialize, Clone)]
pub struct LedgerSettings {
    /// Administrative identity, also the founding airline
    pub admin: String,
    /// Identity the orchestrator acts under when calling the ledger
    pub orchestrator: String,
    pub founding_airline_name: String,
    #[serde(default = "default_airline_due")]
    pub airline_due: String,
    #[serde(default = "default_one_unit")]
    pub max_insurance_amount: String,
    #[serde(default = "default_one_unit")]
    pub registration_fee: String,
    #[serde(default = "default_min_responses")]
    pub min_responses: usize,
    #[serde(default = "default_index_buckets")]
    pub index_buckets: u8,
    #[serde(default = "default_bootstrap_threshold")]
    pub bootstrap_threshold: usize,
    #[serde(default = "default_payout_percent")]
    pub payout_multiplier_percent: u32,
}

fn default_airline_due() -> String { "10".to_string() }
fn default_one_unit() -> String { "1".to_string() }
fn default_min_responses() -> usize { 3 }
fn default_index_buckets() -> u8 { 10 }
fn default_bootstrap_threshold() -> usize { 5 }
fn default_payout_percent() -> u32 { 150 }

#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorConfig {
    pub enabled: bool,
    pub oracle_count: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            oracle_count: 20,
        }
    }
}

impl LedgerSettings {
    pub fn admin_id(&self) -> AccountId {
        AccountId::new(self.admin.clone())
    }

    pub fn orchestrator_id(&self) -> AccountId {
        AccountId::new(self.orchestrator.clone())
    }

    /// Convert amounts to base units and validate the result
    pub fn to_ledger_config(&self) -> SuretyResult<LedgerConfig> {
        let amount = |field: &str, value: &str| {
            parse_units(value)
                .map_err(|e| SuretyError::InvalidConfig(format!("ledger.{}: {}", field, e)))
        };

        let config = LedgerConfig {
            airline_due: amount("airline_due", &self.airline_due)?,
            max_insurance_amount: amount("max_insurance_amount", &self.max_insurance_amount)?,
            registration_fee: amount("registration_fee", &self.registration_fee)?,
            min_responses: self.min_responses,
            index_buckets: self.index_buckets,
            bootstrap_threshold: self.bootstrap_threshold,
            payout_multiplier_percent: self.payout_multiplier_percent,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `SURETY__LEDGER__MIN_RESPONSES=5`
            .add_source(config::Environment::with_prefix("SURETY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
