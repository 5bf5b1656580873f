use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

/// Upstream question-bank id ranges preferred per difficulty tier
/// (cybersecurity extraction policy). Operationally tuned, so supplied as
/// configuration rather than constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierIdRanges {
    pub easy: (i64, i64),
    pub medium: (i64, i64),
    pub hard: (i64, i64),
}

/// One score band: every score >= `min` (up to the next band) gets `label`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBand {
    pub min: i32,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub certified_api_base_url: String,
    pub public_rps: u32,
    pub generation_timeout_secs: u64,
    pub generation_poll_interval_secs: u64,
    pub cyber_id_ranges: TierIdRanges,
    pub score_bands: Vec<ScoreBand>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

const DEFAULT_CYBER_ID_RANGES: &str = "1-4,11-13,17-19";
const DEFAULT_SCORE_BANDS: &str =
    "0:Novice,3:Developing,5:Intermediate,7:Proficient,9:Advanced,10:Expert";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            certified_api_base_url: get_env("CERTIFIED_API_BASE_URL")?,
            public_rps: get_env_parse("PUBLIC_RPS")?,
            generation_timeout_secs: get_env_parse_or("GENERATION_TIMEOUT_SECS", 90)?,
            generation_poll_interval_secs: get_env_parse_or("GENERATION_POLL_INTERVAL_SECS", 3)?,
            cyber_id_ranges: parse_id_ranges(
                &env::var("CYBER_QUESTION_ID_RANGES")
                    .unwrap_or_else(|_| DEFAULT_CYBER_ID_RANGES.to_string()),
            )?,
            score_bands: parse_score_bands(
                &env::var("SCORE_BANDS").unwrap_or_else(|_| DEFAULT_SCORE_BANDS.to_string()),
            )?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

/// Parses "lo-hi,lo-hi,lo-hi" into easy/medium/hard ranges.
pub fn parse_id_ranges(raw: &str) -> Result<TierIdRanges> {
    let mut ranges = Vec::with_capacity(3);
    for part in raw.split(',') {
        let (lo, hi) = part
            .trim()
            .split_once('-')
            .ok_or_else(|| Error::Config(format!("Invalid id range segment: {}", part)))?;
        let lo: i64 = lo
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid id range bound {}: {}", lo, e)))?;
        let hi: i64 = hi
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid id range bound {}: {}", hi, e)))?;
        if lo > hi {
            return Err(Error::Config(format!("Empty id range: {}-{}", lo, hi)));
        }
        ranges.push((lo, hi));
    }
    if ranges.len() != 3 {
        return Err(Error::Config(format!(
            "Expected 3 id ranges (easy,medium,hard), got {}",
            ranges.len()
        )));
    }
    Ok(TierIdRanges {
        easy: ranges[0],
        medium: ranges[1],
        hard: ranges[2],
    })
}

/// Parses "min:Label,min:Label,..." into ascending score bands.
pub fn parse_score_bands(raw: &str) -> Result<Vec<ScoreBand>> {
    let mut bands = Vec::new();
    for part in raw.split(',') {
        let (min, label) = part
            .trim()
            .split_once(':')
            .ok_or_else(|| Error::Config(format!("Invalid score band segment: {}", part)))?;
        let min: i32 = min
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid score band threshold {}: {}", min, e)))?;
        bands.push(ScoreBand {
            min,
            label: label.trim().to_string(),
        });
    }
    if bands.is_empty() {
        return Err(Error::Config("No score bands configured".to_string()));
    }
    bands.sort_by_key(|b| b.min);
    Ok(bands)
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_id_ranges() {
        let ranges = parse_id_ranges(DEFAULT_CYBER_ID_RANGES).unwrap();
        assert_eq!(ranges.easy, (1, 4));
        assert_eq!(ranges.medium, (11, 13));
        assert_eq!(ranges.hard, (17, 19));
    }

    #[test]
    fn rejects_malformed_id_ranges() {
        assert!(parse_id_ranges("1-4,11-13").is_err());
        assert!(parse_id_ranges("4-1,11-13,17-19").is_err());
        assert!(parse_id_ranges("a-b,11-13,17-19").is_err());
    }

    #[test]
    fn parses_score_bands_sorted() {
        let bands = parse_score_bands("5:Mid,0:Low,9:High").unwrap();
        assert_eq!(bands[0].min, 0);
        assert_eq!(bands[2].label, "High");
    }

    #[test]
    fn parses_default_score_bands() {
        let bands = parse_score_bands(DEFAULT_SCORE_BANDS).unwrap();
        assert_eq!(bands.len(), 6);
        assert_eq!(bands.last().unwrap().label, "Expert");
    }
}
