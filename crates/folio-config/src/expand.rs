//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a config value,
/// resolving variables through `lookup`.
///
/// Values without a `${` sequence are returned unchanged, so bare `$VAR`
/// text (common in tokens) survives as-is.
pub(crate) fn expand_with(
    value: &str,
    field: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        lookup(var).map(Some).ok_or_else(|| UnsetVar {
            name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.name),
    })
}

/// Variable referenced without a default that the lookup does not know.
struct UnsetVar {
    name: String,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn expand(value: &str, vars: &[(&str, &str)]) -> Result<String, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        expand_with(value, "content.token", &|var| vars.get(var).cloned())
    }

    #[test]
    fn test_expand_set_var() {
        let result = expand("${DATASET}", &[("DATASET", "staging")]).unwrap();
        assert_eq!(result, "staging");
    }

    #[test]
    fn test_expand_default_when_unset() {
        let result = expand("${DATASET:-production}", &[]).unwrap();
        assert_eq!(result, "production");
    }

    #[test]
    fn test_expand_set_var_ignores_default() {
        let result = expand("${DATASET:-production}", &[("DATASET", "staging")]).unwrap();
        assert_eq!(result, "staging");
    }

    #[test]
    fn test_expand_inside_url() {
        let result = expand("http://${HOST}/api", &[("HOST", "localhost:3333")]).unwrap();
        assert_eq!(result, "http://localhost:3333/api");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        let err = expand("${FOLIO_MISSING}", &[]).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("FOLIO_MISSING"));
        assert!(err.to_string().contains("content.token"));
    }

    #[test]
    fn test_expand_reads_process_environment() {
        // PATH is set in every test environment and never modified here
        let path = std::env::var("PATH").unwrap();
        let result = expand_with("${PATH}", "server.host", &|var| std::env::var(var).ok()).unwrap();
        assert_eq!(result, path);
    }

    #[test]
    fn test_bare_dollar_left_alone() {
        let result = expand("sk$abc", &[]).unwrap();
        assert_eq!(result, "sk$abc");
    }
}
