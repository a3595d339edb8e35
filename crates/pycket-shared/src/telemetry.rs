//! Telemetry setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::AppError;

/// Install a JSON `tracing` subscriber filtered by `RUST_LOG` (default `info`).
pub fn init_telemetry() -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .try_init()
        .map_err(|e| AppError::TelemetryError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_reported() {
        let _ = init_telemetry();
        assert!(matches!(init_telemetry(), Err(AppError::TelemetryError(_))));
    }
}
