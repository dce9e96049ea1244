//! Runtime configuration loaded from environment variables.

/// Advisor knobs. All fields have defaults via `from_env`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvisorConfig {
    /// Budget of folder context characters in the system message.
    pub max_context_chars: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 60_000,
        }
    }
}

impl AdvisorConfig {
    pub fn from_env() -> Self {
        Self {
            max_context_chars: parse("MAX_CONTEXT_CHARS", Self::default().max_context_chars),
        }
    }
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}
