//! Run configuration loaded from arguments, environment and an optional
//! JSON file.
//!
//! The target size is taken from the first of these that is present:
//! - the first positional argument
//! - `PRICER_TARGET_SIZE`
//! - the `target_size` field of the JSON file named by `PRICER_CONFIG`
//!
//! An optional second positional argument (or the file's `input` field)
//! names the feed file. Without one the feed is read from stdin.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::PricerError;

const TARGET_SIZE_VAR: &str = "PRICER_TARGET_SIZE";
const CONFIG_FILE_VAR: &str = "PRICER_CONFIG";

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub target_size: u64,
    pub input: Option<PathBuf>,
}

/// Optional settings file. Every field may be overridden from the command
/// line or environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub target_size: Option<i64>,
    pub input: Option<PathBuf>,
}

impl FileConfig {
    /// Loads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PricerError::InvalidConfiguration(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

/// Builds the configuration from positional `args` (program name already
/// stripped) and the environment.
///
/// # Errors
///
/// Returns [`PricerError::InvalidConfiguration`] if no target size is given
/// anywhere, if it is not an integer, or if it is not positive. Returns
/// [`PricerError::Json`] if the config file is not valid JSON.
pub fn fetch_config<I>(args: I) -> crate::Result<AppConfig>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let arg_target = args.next();
    let arg_input = args.next().map(PathBuf::from);

    if let Some(extra) = args.next() {
        return Err(PricerError::InvalidConfiguration(format!(
            "unexpected argument {extra:?}"
        )));
    }

    let file = match non_empty_var(CONFIG_FILE_VAR) {
        Some(path) => FileConfig::load(Path::new(&path))?,
        None => FileConfig::default(),
    };

    let target_size = match arg_target.or_else(|| non_empty_var(TARGET_SIZE_VAR)) {
        Some(raw) => parse_target_size(&raw)?,
        None => match file.target_size {
            Some(size) => positive(size)?,
            None => {
                return Err(PricerError::InvalidConfiguration(format!(
                    "target size missing: pass it as the first argument or set {TARGET_SIZE_VAR}"
                )));
            }
        },
    };

    Ok(AppConfig {
        target_size,
        input: arg_input.or(file.input),
    })
}

/// Parses a target size, rejecting anything that is not a positive integer.
pub fn parse_target_size(raw: &str) -> crate::Result<u64> {
    let value: i64 = raw.trim().parse().map_err(|_| {
        PricerError::InvalidConfiguration(format!("target size {raw:?} is not an integer"))
    })?;
    positive(value)
}

fn positive(value: i64) -> crate::Result<u64> {
    u64::try_from(value)
        .ok()
        .filter(|size| *size > 0)
        .ok_or_else(|| {
            PricerError::InvalidConfiguration(format!("target size must be positive, got {value}"))
        })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
