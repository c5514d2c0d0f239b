use anyhow::Context;
use config::{Config, Environment, Map};
use serde::Deserialize;

const ENV_PREFIX: &str = "TRIVIA";

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub listen_addr: String,
    pub max_connections: u32,
    /// Fixed seed for the quiz question picker, mostly useful for reproducible demos
    pub quiz_seed: Option<u64>,
}

impl Settings {
    /// Reads `TRIVIA_*` variables from the process environment, after loading `.env` if present.
    pub fn load() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::build(Environment::with_prefix(ENV_PREFIX))
    }

    fn build(environment: Environment) -> anyhow::Result<Self> {
        let settings = Config::builder()
            .set_default("listen_addr", "0.0.0.0:5000")?
            .set_default("max_connections", 5)?
            .add_source(environment.try_parsing(true))
            .build()
            .context("Failed to read configuration")?;
        settings
            .try_deserialize()
            .context("Invalid configuration, is TRIVIA_DATABASE_URL set?")
    }

    pub fn from_map(vars: Map<String, String>) -> anyhow::Result<Self> {
        Self::build(Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }
}
