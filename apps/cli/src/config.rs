use anyhow::Context;
use chrono::NaiveDate;
use etf_curator_core::constants::DEFAULT_BASE_CURRENCY;

#[derive(Debug)]
pub struct Config {
    pub base_currency: String,
    pub log_format: String,
    pub as_of: Option<NaiveDate>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_currency = lookup("CURATOR_BASE_CURRENCY")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string());
        let log_format = lookup("CURATOR_LOG_FORMAT").unwrap_or_else(|| "text".to_string());
        let as_of = lookup("CURATOR_AS_OF")
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .with_context(|| format!("Invalid CURATOR_AS_OF '{}'", s))
            })
            .transpose()?;
        Ok(Self {
            base_currency,
            log_format,
            as_of,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base_currency, "USD");
        assert_eq!(config.log_format, "text");
        assert!(config.as_of.is_none());
    }

    #[test]
    fn test_reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("CURATOR_BASE_CURRENCY", "EUR"),
            ("CURATOR_LOG_FORMAT", "json"),
            ("CURATOR_AS_OF", "2024-06-30"),
        ]))
        .unwrap();
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(config.log_format, "json");
        assert_eq!(config.as_of, NaiveDate::from_ymd_opt(2024, 6, 30));
    }

    #[test]
    fn test_rejects_bad_as_of() {
        assert!(Config::from_lookup(lookup_from(&[("CURATOR_AS_OF", "30/06/2024")])).is_err());
    }
}
