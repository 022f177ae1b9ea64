use std::net::SocketAddr;
use std::time::Duration;
use wizard_flow::BacktrackPolicy;

/// Delays used by the canned collaborators and the eligibility progress ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub extraction_delay: Duration,
    pub eligibility_tick: Duration,
    pub eligibility_settle: Duration,
    pub form_generation_delay: Duration,
    pub download_delay: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            extraction_delay: Duration::from_millis(2000),
            eligibility_tick: Duration::from_millis(600),
            eligibility_settle: Duration::from_millis(500),
            form_generation_delay: Duration::from_millis(2000),
            download_delay: Duration::from_millis(1500),
        }
    }
}

impl SimulationConfig {
    /// No waiting at all; used by tests and demos.
    pub fn instant() -> Self {
        Self {
            extraction_delay: Duration::ZERO,
            eligibility_tick: Duration::ZERO,
            eligibility_settle: Duration::ZERO,
            form_generation_delay: Duration::ZERO,
            download_delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub addr: SocketAddr,
    pub backtrack: BacktrackPolicy,
    pub simulation: SimulationConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            backtrack: BacktrackPolicy::Sticky,
            simulation: SimulationConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Reads `CLAIMBUDDY_ADDR`, `CLAIMBUDDY_BACKTRACK` and `CLAIMBUDDY_INSTANT`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup("CLAIMBUDDY_ADDR") {
            config.addr = addr
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid CLAIMBUDDY_ADDR '{}': {}", addr, e))?;
        }

        if let Some(policy) = lookup("CLAIMBUDDY_BACKTRACK") {
            config.backtrack = match policy.to_ascii_lowercase().as_str() {
                "sticky" => BacktrackPolicy::Sticky,
                "reset" => BacktrackPolicy::Reset,
                other => anyhow::bail!("invalid CLAIMBUDDY_BACKTRACK '{}'", other),
            };
        }

        if let Some(flag) = lookup("CLAIMBUDDY_INSTANT") {
            if matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes") {
                config.simulation = SimulationConfig::instant();
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.backtrack, BacktrackPolicy::Sticky);
        assert_eq!(config.simulation.extraction_delay, Duration::from_millis(2000));
    }

    #[test]
    fn variables_override_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("CLAIMBUDDY_ADDR", "127.0.0.1:8080"),
            ("CLAIMBUDDY_BACKTRACK", "Reset"),
            ("CLAIMBUDDY_INSTANT", "true"),
        ]))
        .unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.backtrack, BacktrackPolicy::Reset);
        assert_eq!(config.simulation, SimulationConfig::instant());
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(ServiceConfig::from_lookup(lookup(&[("CLAIMBUDDY_ADDR", "nowhere")])).is_err());
        assert!(ServiceConfig::from_lookup(lookup(&[("CLAIMBUDDY_BACKTRACK", "maybe")])).is_err());
    }
}
