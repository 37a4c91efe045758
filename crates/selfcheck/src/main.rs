//! Startup self-test: load the configuration document and check it against
//! the built-in privilege registry. Exits non-zero on any mismatch.

use anyhow::{bail, Context};

use szuru_auth::{Config, PrivilegeRegistry, ReconciliationMode};

const MODE_ENV: &str = "SZURU_PRIVILEGE_MODE";

/// Parse the `SZURU_PRIVILEGE_MODE` value; unset means the default mode.
fn parse_mode(raw: Option<&str>) -> anyhow::Result<ReconciliationMode> {
    let Some(raw) = raw else {
        return Ok(ReconciliationMode::default());
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "subset" => Ok(ReconciliationMode::Subset),
        "bijection" => Ok(ReconciliationMode::Bijection),
        other => bail!("{MODE_ENV} must be 'subset' or 'bijection', got '{other}'"),
    }
}

fn main() -> anyhow::Result<()> {
    szuru_observability::init();

    let mode = parse_mode(std::env::var(MODE_ENV).ok().as_deref())?;
    let config = Config::load_from_env().context("loading configuration")?;
    let registry = PrivilegeRegistry::builtin();

    registry
        .self_check(&config.security, mode)
        .context("privilege registry self-check")?;

    tracing::info!(identifiers = registry.list_identifiers().len(), "self-check complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_mode_defaults_to_subset() {
        assert_eq!(parse_mode(None).unwrap(), ReconciliationMode::Subset);
    }

    #[test]
    fn mode_ignores_case_and_whitespace() {
        assert_eq!(parse_mode(Some("subset")).unwrap(), ReconciliationMode::Subset);
        assert_eq!(parse_mode(Some(" Bijection\n")).unwrap(), ReconciliationMode::Bijection);
        assert_eq!(parse_mode(Some("BIJECTION")).unwrap(), ReconciliationMode::Bijection);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = parse_mode(Some("strict")).unwrap_err();
        assert!(err.to_string().contains("got 'strict'"));
        assert!(parse_mode(Some("")).is_err());
    }
}
