//! Per-route validation rule sets.

use inkpress_validation::{Rule, RuleSet};

/// Envelope message for post validation failures.
pub const POST_VALIDATION_MESSAGE: &str = "Validation error";
/// Envelope message for every other route.
pub const VALIDATION_MESSAGE: &str = "Validation failed";

const ROLES: &[&str] = &["user", "admin"];

fn email() -> Rule {
    Rule::body("email")
        .trim()
        .email()
        .normalize_email()
        .message("Please provide a valid email")
}

fn name() -> Rule {
    Rule::body("name")
        .trim()
        .length(Some(2), Some(50))
        .message("Name must be between 2 and 50 characters")
}

pub fn register() -> RuleSet {
    RuleSet::new([
        email(),
        Rule::body("password")
            .length(Some(6), None)
            .message("Password must be at least 6 characters long"),
        name(),
        Rule::body("role")
            .optional()
            .one_of(ROLES)
            .message("Role must be either user or admin"),
    ])
}

pub fn login() -> RuleSet {
    RuleSet::new([
        email(),
        Rule::body("password")
            .present()
            .message("Password is required"),
    ])
}

pub fn pagination() -> RuleSet {
    RuleSet::new([
        Rule::query("page")
            .optional()
            .int_range(Some(1), Some(i64::from(u32::MAX)))
            .message("Page must be a positive integer"),
        Rule::query("limit")
            .optional()
            .int_range(Some(1), Some(100))
            .message("Limit must be between 1 and 100"),
    ])
}

pub fn user_id() -> RuleSet {
    RuleSet::new([Rule::param("id").identifier().message("Invalid user ID")])
}

pub fn update_user() -> RuleSet {
    user_id().and(RuleSet::new([
        name().optional(),
        email().optional(),
        Rule::body("isActive")
            .optional()
            .boolean()
            .message("isActive must be a boolean"),
    ]))
}

pub fn post() -> RuleSet {
    RuleSet::new([
        Rule::body("title")
            .trim()
            .length(Some(1), Some(200))
            .message("Title must be between 1 and 200 characters"),
        Rule::body("content")
            .trim()
            .length(Some(1), Some(10_000))
            .message("Content must be between 1 and 10000 characters"),
        Rule::body("author")
            .trim()
            .length(Some(1), Some(100))
            .message("Author must be between 1 and 100 characters"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpress_validation::{Payload, validate};
    use serde_json::json;

    #[test]
    fn short_password_is_reported() {
        let payload = Payload::from_body(json!({
            "email": "a@b.com",
            "password": "12345",
            "name": "A"
        }));
        let errors = validate(&payload, &register());
        let password = errors.iter().find(|e| e.field == "password").unwrap();
        assert_eq!(password.message, "Password must be at least 6 characters long");
    }

    #[test]
    fn complete_registration_passes() {
        let payload = Payload::from_body(json!({
            "email": "A@B.com",
            "password": "123456",
            "name": "Al",
            "role": "admin"
        }));
        assert!(validate(&payload, &register()).is_empty());
    }

    #[test]
    fn update_checks_path_id_first() {
        let payload = Payload::from_body(json!({ "isActive": "maybe" })).with_param("id", "nope");
        let fields: Vec<_> = validate(&payload, &update_user())
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, ["id", "isActive"]);
    }

    #[test]
    fn empty_update_body_is_valid() {
        let payload = Payload::from_body(json!({}))
            .with_param("id", uuid::Uuid::now_v7().to_string());
        assert!(validate(&payload, &update_user()).is_empty());
    }

    #[test]
    fn post_requires_all_fields() {
        let errors = validate(&Payload::from_body(json!({ "title": "  " })), &post());
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn page_must_fit_the_handler_width() {
        let at_max = Payload::default().with_query([("page", u32::MAX.to_string())]);
        assert!(validate(&at_max, &pagination()).is_empty());

        let too_big = Payload::default().with_query([("page", "5000000000")]);
        let errors = validate(&too_big, &pagination());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Page must be a positive integer");
    }
}
