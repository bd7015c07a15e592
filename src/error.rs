use thiserror::Error;

/// Configuration and domain-loading failures (spec §7, "Configuration" taxonomy).
///
/// These are reported to the caller and abort the run; they never originate from
/// inside the planner or a simulator, only from the CLI/paramfile/domain-JSON
/// loading boundary.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing problem selection (no --problem / paramFile problem key)")]
    MissingProblem,

    #[error("could not read file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse domain JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unrecognised problem {0:?}")]
    UnknownProblem(String),
}
