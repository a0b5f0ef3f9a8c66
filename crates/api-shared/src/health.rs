use crate::dto::HealthRes;

/// Health check shared by every API surface.
#[derive(Clone, Copy, Debug)]
pub struct HealthService;

impl HealthService {
    /// Always reports healthy; the process answering is the check.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "NurseNote is alive".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_health() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert!(!res.message.is_empty());
    }
}
