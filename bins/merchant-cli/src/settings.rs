use ::config::{Config, ConfigError as BuilderError, Environment, File};
use marketplace::MerchantEndpoint;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_PROFILE_PATH: &str = "config/merchant.yaml";

/// Who this merchant is and how much it buys per run.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MerchantProfile {
    pub name: String,
    pub algorithm: String,
    pub endpoint: String,
    pub quantity: u32,
}

impl Default for MerchantProfile {
    fn default() -> Self {
        Self {
            name: "TEST".to_string(),
            algorithm: "test".to_string(),
            endpoint: "5009".to_string(),
            quantity: 1000,
        }
    }
}

impl MerchantProfile {
    pub fn endpoint(&self) -> MerchantEndpoint {
        MerchantEndpoint::from(self.endpoint.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("merchant profile load failed: {0}")]
    Load(#[from] BuilderError),
    #[error("invalid merchant profile: {0}")]
    Invalid(&'static str),
}

pub fn load_profile(path: &str) -> Result<MerchantProfile, ProfileError> {
    let config = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix("MERCHANT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    finish(config)
}

fn finish(config: Config) -> Result<MerchantProfile, ProfileError> {
    let profile: MerchantProfile = config.try_deserialize()?;
    if profile.name.trim().is_empty() {
        return Err(ProfileError::Invalid("name must not be blank"));
    }
    if profile.endpoint.trim().is_empty() {
        return Err(ProfileError::Invalid("endpoint must not be blank"));
    }
    if profile.quantity == 0 {
        return Err(ProfileError::Invalid("quantity must be positive"));
    }
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::config::FileFormat;

    fn from_yaml(yaml: &str) -> Result<MerchantProfile, ProfileError> {
        let config = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?;
        finish(config)
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let profile = load_profile("does/not/exist.yaml").unwrap();
        assert_eq!(profile.name, "TEST");
        assert_eq!(profile.endpoint(), MerchantEndpoint::Port(5009));
    }

    #[test]
    fn yaml_overrides_some_fields() {
        let profile = from_yaml("name: Cheapest\nendpoint: http://merchant:5100\n").unwrap();
        assert_eq!(profile.name, "Cheapest");
        assert_eq!(profile.algorithm, "test");
        assert_eq!(
            profile.endpoint(),
            MerchantEndpoint::Url("http://merchant:5100".to_string())
        );
        assert_eq!(profile.quantity, 1000);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        assert!(matches!(
            from_yaml("quantity: 0\n"),
            Err(ProfileError::Invalid(_))
        ));
    }
}
