//! Store metrics collection.

use metrics::histogram;
use std::time::Instant;

/// Record the duration of one store operation.
pub fn record_store_duration(operation: &str, duration_secs: f64) {
    histogram!(
        "store_operation_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

/// Times a store operation and records it on `record()`.
///
/// Usage:
/// ```ignore
/// let timer = StoreTimer::new("find_vehicle_by_plate");
/// let result = ...;
/// timer.record();
/// result
/// ```
pub struct StoreTimer {
    operation: String,
    start: Instant,
}

impl StoreTimer {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_store_duration(&self.operation, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_timer_creation() {
        let timer = StoreTimer::new("list_vehicles");
        assert_eq!(timer.operation, "list_vehicles");
    }

    #[test]
    fn test_store_timer_with_string() {
        let operation = String::from("append_track_point");
        let timer = StoreTimer::new(operation);
        assert_eq!(timer.operation, "append_track_point");
    }
}
