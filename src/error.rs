use std::fmt;

/// Errors raised by the raycasting core.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderError {
    /// The scene can't be rendered at all; nothing is drawn.
    Configuration(String),
    /// A cell lookup landed outside the grid.
    OutOfBounds { row: i32, col: i32 },
    /// A single ray crossed more grid lines than allowed.
    RayTimeout { steps: usize },
}

impl RenderError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "invalid configuration: {msg}"),
            Self::OutOfBounds { row, col } => write!(f, "cell ({row}, {col}) is outside the grid"),
            Self::RayTimeout { steps } => write!(f, "ray gave up after {steps} steps"),
        }
    }
}

impl std::error::Error for RenderError {}

pub type Result<T> = std::result::Result<T, RenderError>;
