//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::defaults;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

/// Tables whose keys are user-defined (metric codes) and never validated.
const OPEN_TABLES: &[&str] = &["telemetry.divisors"];

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for MonitorConfig.
///
/// Any new field added to MonitorConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [device_cloud]
        "device_cloud",
        "device_cloud.base_url",
        "device_cloud.client_id",
        "device_cloud.access_token",
        "device_cloud.http_timeout_secs",
        // [telemetry]
        "telemetry",
        "telemetry.temperature_code",
        "telemetry.humidity_code",
        "telemetry.page_size",
        "telemetry.max_pages",
        "telemetry.fetch_timeout_secs",
        "telemetry.divisors",
        // [recommendation]
        "recommendation",
        "recommendation.cooldown_hours",
        "recommendation.generator_url",
        "recommendation.generator_timeout_secs",
        // [storage]
        "storage",
        "storage.data_dir",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`. Open tables are listed but not descended into.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() && !OPEN_TABLES.contains(&path.as_str()) {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new(); // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Validate value ranges on a parsed MonitorConfig.
///
/// Returns (errors, warnings). Errors are values that must prevent startup;
/// warnings are suspicious but not fatal.
pub fn validate_ranges(config: &super::MonitorConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let t = &config.telemetry;

    if t.page_size == 0 {
        errors.push("telemetry.page_size must be > 0".to_string());
    } else if t.page_size > defaults::MAX_PAGE_SIZE {
        errors.push(format!(
            "telemetry.page_size = {} exceeds the upstream limit of {}",
            t.page_size,
            defaults::MAX_PAGE_SIZE
        ));
    }

    if t.max_pages == 0 {
        errors.push("telemetry.max_pages must be > 0".to_string());
    }

    if t.fetch_timeout_secs == Some(0) {
        errors.push("telemetry.fetch_timeout_secs must be > 0 when set".to_string());
    }

    if t.temperature_code.trim().is_empty() || t.humidity_code.trim().is_empty() {
        errors.push("telemetry metric codes must not be empty".to_string());
    }

    if t.temperature_code == t.humidity_code {
        errors.push(format!(
            "telemetry.temperature_code and telemetry.humidity_code are both '{}'",
            t.temperature_code
        ));
    }

    for (code, divisor) in &t.divisors {
        if !divisor.is_finite() || *divisor <= 0.0 {
            errors.push(format!(
                "telemetry.divisors.{code} = {divisor} must be a positive number (used as divisor)"
            ));
        }
    }

    let cooldown_hours = config.recommendation.cooldown_hours;
    if cooldown_hours == 0 {
        errors.push("recommendation.cooldown_hours must be > 0".to_string());
    } else if cooldown_hours > defaults::MAX_COOLDOWN_HOURS {
        errors.push(format!(
            "recommendation.cooldown_hours = {cooldown_hours} exceeds the maximum of {}",
            defaults::MAX_COOLDOWN_HOURS
        ));
    }

    if config.recommendation.generator_timeout_secs == 0 {
        errors.push("recommendation.generator_timeout_secs must be > 0".to_string());
    }

    if config.device_cloud.http_timeout_secs == 0 {
        errors.push("device_cloud.http_timeout_secs must be > 0".to_string());
    }

    if !config.device_cloud.base_url.starts_with("http://")
        && !config.device_cloud.base_url.starts_with("https://")
    {
        errors.push(format!(
            "device_cloud.base_url = '{}' must start with http:// or https://",
            config.device_cloud.base_url
        ));
    }

    if config.device_cloud.base_url.starts_with("http://") {
        warnings.push(ValidationWarning {
            field: "device_cloud.base_url".to_string(),
            message: "device_cloud.base_url uses plain HTTP; access tokens travel unencrypted"
                .to_string(),
            suggestion: None,
        });
    }

    if !t.divisors.contains_key(&t.temperature_code) {
        warnings.push(ValidationWarning {
            field: "telemetry.divisors".to_string(),
            message: format!(
                "no divisor configured for '{}'; raw values will be used unscaled",
                t.temperature_code
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}
