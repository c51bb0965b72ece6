use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Read reference data (profile or assumption table) from JSON or YAML,
/// chosen by file extension.
pub fn read_config<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    if !is_yaml(&canonical) {
        return read_json(path);
    }

    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = serde_yaml::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Resolve and validate the path, preventing directory traversal.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquidity_stress_core::portfolio::{AssumptionTable, Profile, ShockRule};
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lse-{}-{}", std::process::id(), name));
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_yaml_assumptions() {
        let path = temp_file(
            "assumptions.yaml",
            "equity_drawdown:\n  type: asset_impact\n  bucket: Equities\n  pass_through: 0.5\nredemption:\n  type: direct_liability\n",
        );
        let table: AssumptionTable = read_config(path.to_str().unwrap()).unwrap();
        assert_eq!(
            table.get("equity_drawdown"),
            Some(&ShockRule::asset_impact("Equities", dec!(0.5), dec!(0)))
        );
        assert_eq!(table.get("redemption"), Some(&ShockRule::DirectLiability));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_json_profile() {
        let path = temp_file(
            "profile.json",
            r#"[{"name": "Cash", "market_value": 100, "days_to_cash": 0, "stress_loss_pct": 0}]"#,
        );
        let profile: Profile = read_config(path.to_str().unwrap()).unwrap();
        assert_eq!(profile.len(), 1);
        assert!(profile.get("Cash").unwrap().available);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_file() {
        let err = read_config::<Profile>("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
