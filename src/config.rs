use serde::Deserialize;

/// Decision thresholds used by the tariff engine.
///
/// Passed explicitly to each component at construction; components never
/// read ambient state. Values are immutable once loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Credit score below which a client is not considered reliable.
    pub score_cutoff: f64,
    /// Delinquency days tolerated before a merged profile loses Premium.
    pub delinquency_tolerance_days: u32,
    /// Total merged debt at or above which Premium is not offered.
    pub merged_debt_ceiling: f64,
    /// Single-report debt above which a load warning is raised.
    pub large_debt_threshold: f64,
    /// Active account count at which the reduction warning fires.
    pub account_count_cutoff: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            score_cutoff: 700.0,
            delinquency_tolerance_days: 5,
            merged_debt_ceiling: 2_000_000.0,
            large_debt_threshold: 1_000_000.0,
            account_count_cutoff: 5,
        }
    }
}

impl AnalysisConfig {
    /// Loads thresholds from the environment, falling back to the business
    /// defaults for anything unset.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            score_cutoff: parse_env("SCORE_CUTOFF", defaults.score_cutoff)?,
            delinquency_tolerance_days: parse_env(
                "DELINQUENCY_TOLERANCE_DAYS",
                defaults.delinquency_tolerance_days,
            )?,
            merged_debt_ceiling: parse_env("MERGED_DEBT_CEILING", defaults.merged_debt_ceiling)?,
            large_debt_threshold: parse_env("LARGE_DEBT_THRESHOLD", defaults.large_debt_threshold)?,
            account_count_cutoff: parse_env("ACCOUNT_COUNT_CUTOFF", defaults.account_count_cutoff)?,
        };

        if !config.score_cutoff.is_finite() || config.score_cutoff <= 0.0 {
            anyhow::bail!("SCORE_CUTOFF must be a positive number");
        }
        if !config.merged_debt_ceiling.is_finite() || config.merged_debt_ceiling <= 0.0 {
            anyhow::bail!("MERGED_DEBT_CEILING must be a positive number");
        }
        if !config.large_debt_threshold.is_finite() || config.large_debt_threshold <= 0.0 {
            anyhow::bail!("LARGE_DEBT_THRESHOLD must be a positive number");
        }
        if config.account_count_cutoff == 0 {
            anyhow::bail!("ACCOUNT_COUNT_CUTOFF must be at least 1");
        }

        tracing::info!("Analysis configuration loaded");
        tracing::debug!("Score cutoff: {}", config.score_cutoff);
        tracing::debug!(
            "Delinquency tolerance: {} days",
            config.delinquency_tolerance_days
        );
        tracing::debug!("Merged debt ceiling: {}", config.merged_debt_ceiling);
        tracing::debug!("Large debt threshold: {}", config.large_debt_threshold);
        tracing::debug!("Account count cutoff: {}", config.account_count_cutoff);

        Ok(config)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}
