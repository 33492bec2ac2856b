use thiserror::Error;

/// Failure kinds of the estimation core.
///
/// Library callers match on these; the binary converts them into an
/// [`AppError`] carrying the process exit code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TauError {
    /// Two series that must be index-aligned have different lengths.
    #[error("{left} holds {left_len} entries but {right} holds {right_len}")]
    ShapeMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    /// Fewer than two distances, so no adjacent pair can be formed.
    #[error("no adjacent distance pairs to combine ({len} distance(s) present, need at least 2)")]
    InsufficientData { len: usize },

    /// Flight time does not strictly increase across an adjacent pair.
    #[error("flight time does not increase across pair {pair} (dt = {dt} ps)")]
    DegenerateInterval { pair: usize, dt: f64 },

    /// A measurement value or uncertainty is non-finite, or an uncertainty
    /// is negative.
    #[error("{series} entry {index} is not a valid measurement (value must be finite, uncertainty finite and non-negative)")]
    InvalidMeasurement {
        series: &'static str,
        index: usize,
    },

    /// A per-pair ratio came out non-finite (vanishing denominator).
    #[error("per-pair estimate {pair} is not finite (vanishing denominator)")]
    NonFiniteEstimate { pair: usize },

    /// Pooling the per-pair estimates produced a non-finite mean or weight.
    #[error("inverse-variance combination produced a non-finite result")]
    NonFiniteCombination,

    /// The recoil velocity is unusable for deriving flight times.
    #[error("relative velocity {value} um/ps is not usable (must be finite and positive)")]
    InvalidVelocity { value: f64 },
}

impl TauError {
    /// Process exit code the binary reports for this failure.
    ///
    /// 2 = malformed input, 3 = not enough data, 4 = estimation failed.
    pub fn exit_code(&self) -> u8 {
        match self {
            TauError::ShapeMismatch { .. }
            | TauError::InvalidMeasurement { .. }
            | TauError::InvalidVelocity { .. } => 2,
            TauError::InsufficientData { .. } => 3,
            TauError::DegenerateInterval { .. }
            | TauError::NonFiniteEstimate { .. }
            | TauError::NonFiniteCombination => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<TauError> for AppError {
    fn from(err: TauError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
