use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use vmt_backend::{BootstrapPolicy, TranslateOptions};

/// Load translation options from a JSON file, or use the defaults
pub fn load_options(path: Option<&Path>) -> Result<TranslateOptions> {
    let Some(path) = path else {
        return Ok(TranslateOptions::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let options: TranslateOptions = serde_json::from_str(&content)
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!("Loaded options from {}: {:?}", path.display(), options);
    Ok(options)
}

/// Command-line flags take precedence over the config file
pub fn apply_overrides(
    options: &mut TranslateOptions,
    no_comments: bool,
    bootstrap: Option<BootstrapPolicy>,
) {
    if no_comments {
        options.emit_source_comments = false;
    }
    if let Some(policy) = bootstrap {
        options.bootstrap = policy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_missing_path_gives_defaults() {
        assert_eq!(load_options(None).unwrap(), TranslateOptions::default());
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vmt.json");
        fs::write(&path, r#"{ "bootstrap": "never" }"#).unwrap();

        let options = load_options(Some(&path)).unwrap();
        assert_eq!(options.bootstrap, BootstrapPolicy::Never);
        assert!(options.emit_source_comments);
    }

    #[test]
    fn test_bad_config_names_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ bootstrap").unwrap();

        let err = load_options(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.json"));
    }

    #[test]
    fn test_flags_override_config() {
        let mut options = TranslateOptions {
            emit_source_comments: true,
            bootstrap: BootstrapPolicy::Never,
        };
        apply_overrides(&mut options, true, Some(BootstrapPolicy::Always));
        assert!(!options.emit_source_comments);
        assert_eq!(options.bootstrap, BootstrapPolicy::Always);

        apply_overrides(&mut options, false, None);
        assert!(!options.emit_source_comments);
        assert_eq!(options.bootstrap, BootstrapPolicy::Always);
    }
}
