//! Configuration error types.

/// Why `config.ron` or a settings snapshot could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config.ron: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("cannot write config.ron: {0}")]
    WriteError(#[source] std::io::Error),

    #[error("config.ron is not valid RON: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    #[error("cannot serialise config: {0}")]
    SerializeError(#[source] ron::Error),

    /// A setting holds a value the generator cannot work with.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        reason: String,
    },
}
