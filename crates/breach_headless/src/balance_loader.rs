//! Balance data loading.
//!
//! Balance overrides are RON files holding a (possibly partial)
//! [`Ruleset`]; anything a file leaves out keeps its stock value.

use std::path::{Path, PathBuf};

use ron::ser::PrettyConfig;
use thiserror::Error;
use tracing::{debug, info};

use breach_core::data::Ruleset;
use breach_core::error::GameError;

/// Environment variable naming a balance file to use when none is given.
pub const BALANCE_FILE_ENV: &str = "BREACH_BALANCE_FILE";

/// Errors that can occur while loading balance data.
#[derive(Debug, Error)]
pub enum BalanceLoadError {
    /// The file could not be read.
    #[error("IO error reading '{path}': {source}")]
    Io {
        /// File that failed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file did not parse, or parsed into an unplayable ruleset.
    #[error(transparent)]
    Data(#[from] GameError),

    /// The stock ruleset could not be written as RON.
    #[error("Failed to render ruleset: {0}")]
    Render(#[from] ron::Error),
}

/// Read and parse a balance file without validating it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid RON.
pub fn parse_ruleset(path: &Path) -> Result<Ruleset, BalanceLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| BalanceLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let ruleset = Ruleset::from_ron_str(&text, &path.display().to_string())?;
    debug!(path = %path.display(), "Parsed balance file");
    Ok(ruleset)
}

/// Load and validate a balance file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not parse, or
/// describes an unplayable ruleset.
pub fn load_ruleset(path: &Path) -> Result<Ruleset, BalanceLoadError> {
    let ruleset = parse_ruleset(path)?;
    ruleset.ensure_valid()?;
    info!(path = %path.display(), "Loaded balance overrides");
    Ok(ruleset)
}

/// Load `path` if given, otherwise the file named by [`BALANCE_FILE_ENV`],
/// otherwise the stock ruleset.
///
/// # Errors
///
/// Returns an error if a named file fails to load.
pub fn load_or_standard(path: Option<&Path>) -> Result<Ruleset, BalanceLoadError> {
    match resolve_balance_path(path) {
        Some(path) => load_ruleset(&path),
        None => Ok(Ruleset::standard()),
    }
}

/// Pick the balance file to use, if any.
///
/// An explicit path always wins; otherwise [`BALANCE_FILE_ENV`] is used
/// when it names an existing file.
#[must_use]
pub fn resolve_balance_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let from_env = PathBuf::from(std::env::var_os(BALANCE_FILE_ENV)?);
    from_env.is_file().then_some(from_env)
}

/// The stock ruleset as a RON document, a starting point for overrides.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn standard_ruleset_ron() -> Result<String, BalanceLoadError> {
    let config = PrettyConfig::new().depth_limit(4);
    Ok(ron::ser::to_string_pretty(&Ruleset::standard(), config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_stock_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fast.ron");
        std::fs::write(&path, "(rules: (draw_per_turn: 2))").unwrap();

        let ruleset = load_ruleset(&path).unwrap();
        assert_eq!(ruleset.rules.draw_per_turn, 2);
        assert_eq!(ruleset.rules.actions_per_turn, 2);
        assert_eq!(ruleset.phantom_deck, Ruleset::standard().phantom_deck);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_ruleset(Path::new("/definitely/not/here.ron")).unwrap_err();
        assert!(matches!(err, BalanceLoadError::Io { .. }));
    }

    #[test]
    fn test_invalid_ruleset_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        std::fs::write(&path, "(rules: (actions_per_turn: 0))").unwrap();

        assert!(parse_ruleset(&path).is_ok());
        let err = load_ruleset(&path).unwrap_err();
        assert!(matches!(
            err,
            BalanceLoadError::Data(GameError::InvalidRuleset(_))
        ));
    }

    #[test]
    fn test_bad_syntax_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ron");
        std::fs::write(&path, "(rules: (actions_per_turn: \"two\"))").unwrap();

        let err = load_ruleset(&path).unwrap_err();
        assert!(matches!(
            err,
            BalanceLoadError::Data(GameError::DataParseError { .. })
        ));
    }

    #[test]
    fn test_stock_template_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("standard.ron");
        std::fs::write(&path, standard_ruleset_ron().unwrap()).unwrap();

        assert_eq!(load_ruleset(&path).unwrap(), Ruleset::standard());
    }

    #[test]
    fn test_explicit_path_wins() {
        let explicit = Path::new("mine.ron");
        assert_eq!(
            resolve_balance_path(Some(explicit)),
            Some(PathBuf::from("mine.ron"))
        );
    }
}
