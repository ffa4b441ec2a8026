//! Environment variable credential source.
//!
//! Pool keys are plain environment variables named `{PROVIDER}_API_{n}`
//! (e.g. `GEMINI_API_1` .. `GEMINI_API_5`). `load_dotenv` can prime the
//! environment from `.env` files before the first lookup.

use std::path::Path;

use attune_core::llm::rotation::CredentialSource;
use secrecy::SecretString;

/// Reads credentials from the process environment.
///
/// Empty or non-Unicode values count as missing, so a blank slot surfaces as
/// a configuration error instead of an authentication failure.
#[derive(Debug, Default)]
pub struct EnvCredentialSource;

impl EnvCredentialSource {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialSource for EnvCredentialSource {
    fn lookup(&self, name: &str) -> Option<SecretString> {
        match std::env::var(name) {
            Ok(val) if !val.trim().is_empty() => Some(SecretString::from(val.trim().to_string())),
            Ok(_) | Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                tracing::warn!(name, "credential is not valid unicode; ignoring");
                None
            }
        }
    }
}

/// Load `.env` from the working directory, then `{data_dir}/.env`.
///
/// Variables already set in the environment win over both files. A missing
/// file is not an error; a malformed one is logged and skipped.
pub fn load_dotenv(data_dir: &Path) {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to parse .env in working directory"),
    }

    let data_env = data_dir.join(".env");
    match dotenvy::from_path(&data_env) {
        Ok(()) => tracing::debug!(path = %data_env.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, path = %data_env.display(), "failed to parse .env"),
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_lookup_existing_and_missing() {
        // SAFETY: unique variable names; no other test touches them.
        unsafe { std::env::set_var("ATTUNE_TEST_API_1", "  key-one  ") };

        let source = EnvCredentialSource::new();
        let key = source.lookup("ATTUNE_TEST_API_1").unwrap();
        assert_eq!(key.expose_secret(), "key-one");
        assert!(source.lookup("ATTUNE_TEST_API_404").is_none());

        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("ATTUNE_TEST_API_1") };
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        // SAFETY: unique variable name.
        unsafe { std::env::set_var("ATTUNE_BLANK_API_1", "   ") };
        assert!(EnvCredentialSource::new().lookup("ATTUNE_BLANK_API_1").is_none());
        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("ATTUNE_BLANK_API_1") };
    }

    #[test]
    fn test_load_dotenv_reads_data_dir_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "ATTUNE_DOTENV_API_1=from-file\n").unwrap();

        load_dotenv(dir.path());

        let key = EnvCredentialSource::new().lookup("ATTUNE_DOTENV_API_1").unwrap();
        assert_eq!(key.expose_secret(), "from-file");
        // SAFETY: unique variable name set by the load above.
        unsafe { std::env::remove_var("ATTUNE_DOTENV_API_1") };
    }

    #[test]
    fn test_load_dotenv_missing_dir_is_quiet() {
        load_dotenv(Path::new("/nonexistent/attune-data"));
    }
}
