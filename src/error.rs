use crate::inversion::InversionError;

/// Exit code for input/output problems (missing directory, unreadable file,
/// failed export, invalid flags).
pub const EXIT_IO: u8 = 2;
/// Exit code when there are no usable observations.
pub const EXIT_NO_OBSERVATIONS: u8 = 3;
/// Exit code for numerical failure or inconsistent indices.
pub const EXIT_NUMERICAL: u8 = 4;

/// Process-level error: a message plus the exit code `dt` terminates with.
#[derive(Debug, Clone, PartialEq, Eq)]
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

    /// Error exiting with [`EXIT_IO`].
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(EXIT_IO, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<InversionError> for AppError {
    fn from(err: InversionError) -> Self {
        let exit_code = match err {
            InversionError::EmptyObservationSet => EXIT_NO_OBSERVATIONS,
            InversionError::IndexOutOfRange { .. }
            | InversionError::DimensionMismatch { .. }
            | InversionError::IllConditionedSystem { .. } => EXIT_NUMERICAL,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Axis;

    #[test]
    fn inversion_errors_map_to_exit_codes() {
        let empty: AppError = InversionError::EmptyObservationSet.into();
        assert_eq!(empty.exit_code(), EXIT_NO_OBSERVATIONS);

        let bad_index: AppError = InversionError::IndexOutOfRange {
            observation: 0,
            axis: Axis::Event,
            index: 5,
            len: 2,
        }
        .into();
        assert_eq!(bad_index.exit_code(), EXIT_NUMERICAL);
        assert!(bad_index.to_string().contains("event index 5"));
    }

    #[test]
    fn io_errors_use_their_own_code() {
        let err = AppError::io("disk gone");
        assert_eq!(err, AppError::new(EXIT_IO, "disk gone"));
        assert_eq!(format!("{err:?}"), r#"AppError { exit_code: 2, message: "disk gone" }"#);
    }
}
