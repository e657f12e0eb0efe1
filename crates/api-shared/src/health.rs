use crate::dto::{HealthRes, RootRes};

/// Service version reported by the welcome endpoint.
pub const SERVICE_VERSION: &str = "0.2.0";

/// Liveness and welcome payloads for the REST root.
pub struct HealthService;

impl HealthService {
    /// Liveness answer; the process being able to respond is the whole check.
    pub fn check_health() -> HealthRes {
        HealthRes {
            status: "ok".into(),
        }
    }

    /// Payload served at `/`.
    pub fn welcome(project_name: &str) -> RootRes {
        RootRes {
            message: format!("Welcome to {project_name}"),
            version: SERVICE_VERSION.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_reports_ok() {
        assert_eq!(HealthService::check_health().status, "ok");
    }

    #[test]
    fn welcome_names_project() {
        let res = HealthService::welcome("SkillnScale Backend");
        assert_eq!(res.message, "Welcome to SkillnScale Backend");
        assert_eq!(res.version, "0.2.0");
    }
}
