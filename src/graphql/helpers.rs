use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::dto::request::clamp_limit,
};

/// Ids are UUID strings; reject anything else before hitting storage.
pub fn parse_id(id: &str) -> AppResult<String> {
    Uuid::parse_str(id)
        .map(|uuid| uuid.to_string())
        .map_err(|_| AppError::ValidationError("Invalid UUID format".to_string()))
}

pub fn limit_arg(limit: Option<i32>) -> i64 {
    clamp_limit(limit.map(i64::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4().to_string();
        assert_eq!(parse_id(&id).unwrap(), id);
        assert!(parse_id("not-a-uuid").is_err());
    }

    #[test]
    fn test_limit_arg_defaults_and_clamps() {
        assert_eq!(limit_arg(None), 10);
        assert_eq!(limit_arg(Some(-5)), 1);
        assert_eq!(limit_arg(Some(500)), 100);
    }
}
