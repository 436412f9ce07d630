//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from ingestion and request errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Stop failed validation
    #[error("invalid stop: {0}")]
    InvalidStop(&'static str),

    /// Coordinates outside the valid range of decimal degrees
    #[error("invalid coordinates: ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// Trip duration must be at least one minute
    #[error("invalid trip duration: {0} minutes")]
    InvalidDuration(u32),

    /// Consecutive legs don't share a stop
    #[error("legs are not connected: {0} does not continue from {1}")]
    LegsNotConnected(String, String),

    /// First or last leg doesn't match the journey endpoints
    #[error("journey endpoint mismatch: expected {expected}, found {found}")]
    EndpointMismatch { expected: String, found: String },

    /// Journey has no legs but different endpoints
    #[error("journey between distinct stops must have at least one leg")]
    EmptyJourney,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::InvalidStop("name must not be empty");
        assert_eq!(err.to_string(), "invalid stop: name must not be empty");

        let err = DomainError::InvalidCoordinates {
            latitude: 95.0,
            longitude: 10.5,
        };
        assert_eq!(err.to_string(), "invalid coordinates: (95, 10.5)");

        let err = DomainError::InvalidDuration(0);
        assert_eq!(err.to_string(), "invalid trip duration: 0 minutes");

        let err = DomainError::LegsNotConnected("Mowbray".into(), "Observatory".into());
        assert_eq!(
            err.to_string(),
            "legs are not connected: Mowbray does not continue from Observatory"
        );

        let err = DomainError::EmptyJourney;
        assert_eq!(
            err.to_string(),
            "journey between distinct stops must have at least one leg"
        );
    }
}
