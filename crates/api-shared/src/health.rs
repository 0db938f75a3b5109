use crate::payloads::HealthRes;

/// Simple health service used by the REST API.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Report that the service is up.
    ///
    /// Health does not touch the document store; a store outage shows up as 500s on the data
    /// endpoints instead.
    pub fn check_health() -> HealthRes {
        HealthRes {
            status: "ok".into(),
        }
    }
}
