use std::time::Duration;

use serde::Serializer;

use crate::core::error::WorkerError;

/// Serializes a Duration as fractional seconds.
///
/// # Example
/// ```ignore
/// #[derive(Serialize)]
/// struct Report {
///     #[serde(serialize_with = "serialize_secs")]
///     elapsed: Duration,
/// }
/// ```
pub fn serialize_secs<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Serializes worker failures as their display strings.
pub fn serialize_errors<S>(errors: &[WorkerError], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(errors.iter().map(|e| e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_derive::Serialize;

    use crate::core::error::WorkerRole;

    #[derive(Serialize)]
    struct TestReport {
        #[serde(serialize_with = "serialize_secs")]
        elapsed: Duration,
        #[serde(serialize_with = "serialize_errors")]
        failures: Vec<WorkerError>,
    }

    #[test]
    fn test_serialize_secs_and_errors() {
        let report = TestReport {
            elapsed: Duration::from_millis(1500),
            failures: vec![WorkerError::Panicked {
                role: WorkerRole::Requester,
                id: 1,
                message: "boom".to_owned(),
            }],
        };
        let serialized = serde_json::to_string(&report).unwrap();
        assert_eq!(
            serialized,
            "{\"elapsed\":1.5,\"failures\":[\"requester thread 1 panicked: boom\"]}"
        );
    }

    #[test]
    fn test_serialize_no_errors() {
        let report = TestReport {
            elapsed: Duration::ZERO,
            failures: vec![],
        };
        let serialized = serde_json::to_string(&report).unwrap();
        assert_eq!(serialized, "{\"elapsed\":0.0,\"failures\":[]}");
    }
}
