//! Run-level errors.

use atoll_config::ConfigError;

use crate::generator::Stage;

/// Errors that abort a generation run.
///
/// Data-integrity problems (unmatched tiles, bare tiles, NaN heights) are
/// logged and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The settings snapshot failed validation.
    #[error("invalid generator settings: {0}")]
    InvalidSettings(#[from] ConfigError),

    /// Tile generation is enabled but the host supplied no tile service.
    #[error("tile generation requested without a tile service")]
    MissingTileService,

    /// The tile service is present but cannot create instances right now.
    #[error("the host cannot instantiate tiles")]
    HostCannotInstantiate,

    /// Decoration is enabled but the settings carry no flora set.
    #[error("{0} requested without a flora set")]
    MissingFloraSet(Stage),

    /// The run was superseded or cancelled before entering a stage.
    #[error("generation cancelled before {0}")]
    Cancelled(Stage),
}
