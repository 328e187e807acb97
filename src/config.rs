use std::env;

use serde::Deserialize;

use crate::models::PartnerAcceptPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    pub discovery: DiscoveryConfig,
    pub negotiation: NegotiationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscoveryConfig {
    /// Radius used when the caller does not supply one, in kilometers.
    pub default_radius_km: f64,
    pub min_radius_km: f64,
    pub max_radius_km: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NegotiationConfig {
    pub partner_accept_policy: PartnerAcceptPolicy,
    /// Window after which a pending negotiation may be expired by the
    /// external scheduler, in seconds.
    pub expiry_secs: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            discovery: DiscoveryConfig {
                default_radius_km: 2.0,
                min_radius_km: 0.5,
                max_radius_km: 5.0,
            },
            negotiation: NegotiationConfig {
                partner_accept_policy: PartnerAcceptPolicy::default(),
                expiry_secs: 120,
            },
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = EngineConfig::default();

        let default_radius_km = env_or("ARENA_DEFAULT_RADIUS_KM", defaults.discovery.default_radius_km)?;
        let min_radius_km = env_or("ARENA_MIN_RADIUS_KM", defaults.discovery.min_radius_km)?;
        let max_radius_km = env_or("ARENA_MAX_RADIUS_KM", defaults.discovery.max_radius_km)?;
        let expiry_secs = env_or("ARENA_EXPIRY_SECS", defaults.negotiation.expiry_secs)?;
        let partner_accept_policy = match env::var("ARENA_PARTNER_ACCEPT_POLICY") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.negotiation.partner_accept_policy,
        };

        if min_radius_km > max_radius_km {
            anyhow::bail!("ARENA_MIN_RADIUS_KM must not exceed ARENA_MAX_RADIUS_KM");
        }

        Ok(EngineConfig {
            discovery: DiscoveryConfig {
                default_radius_km,
                min_radius_km,
                max_radius_km,
            },
            negotiation: NegotiationConfig {
                partner_accept_policy,
                expiry_secs,
            },
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => Ok(raw.parse()?),
        Err(_) => Ok(default),
    }
}
