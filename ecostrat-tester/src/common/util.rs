use anyhow::{Context, Result};
use ecostrat_game::GameConfig;
use std::fs;
use std::path::Path;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse decimal or `0x`-prefixed hexadecimal seeds.
pub fn parse_seeds(tokens: &[String]) -> Result<Vec<u64>> {
    tokens
        .iter()
        .map(|token| {
            let parsed = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
                None => token.replace('_', "").parse::<u64>(),
            };
            parsed.with_context(|| format!("invalid seed '{token}'"))
        })
        .collect()
}

/// Read and validate a JSON game configuration.
pub fn load_config_file(path: &Path) -> Result<GameConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    GameConfig::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(label: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "ecostrat-{label}-{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn parse_seeds_accepts_decimal_and_hex() {
        let seeds = parse_seeds(&split_csv("1337, 0xFF, 1_000")).unwrap();
        assert_eq!(seeds, vec![1337, 255, 1000]);
        let err = parse_seeds(&["abc".to_string()]).unwrap_err();
        assert!(err.to_string().contains("invalid seed 'abc'"));
    }

    #[test]
    fn load_config_file_applies_defaults_and_validation() {
        let path = temp_file("cfg", r#"{"total_rounds": 8}"#);
        let config = load_config_file(&path).unwrap();
        assert_eq!(config.total_rounds, 8);
        assert_eq!(config.roster_size, 8);

        let bad = temp_file("bad-cfg", r#"{"species_cap": 0}"#);
        let err = load_config_file(&bad).unwrap_err();
        assert!(format!("{err:#}").contains("species_cap"));
        assert!(load_config_file(Path::new("/definitely/missing.json")).is_err());
    }
}
