use serde::Deserialize;

use crate::core::{Credential, Password};

pub const GRANT_TYPE_PASSWORD: &str = "password";

/// Fallback shown when a login failure carries no readable detail.
pub const LOGIN_FAILED_MESSAGE: &str = "An error occurred during login. Please try again.";

/// Answer of the token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Read the token answer out of any body. Anything but an object with
    /// string fields carries no token.
    pub fn from_body(body: &serde_json::Value) -> Self {
        let field = |name: &str| {
            body.get(name)
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        };
        Self {
            access_token: field("access_token"),
            token_type: field("token_type"),
        }
    }

    /// Bearer token, if one was actually issued.
    pub fn credential(self) -> Option<Credential> {
        self.access_token
            .filter(|token| !token.is_empty())
            .map(Credential::new)
    }
}

/// Form fields of an OAuth2 password grant.
pub fn password_grant(password: &Password<'_>) -> Vec<(String, String)> {
    vec![
        ("grant_type".into(), GRANT_TYPE_PASSWORD.into()),
        ("username".into(), password.username.to_string()),
        ("password".into(), password.password.to_string()),
        ("scope".into(), String::new()),
    ]
}

/// Extract a readable message from an error payload.
///
/// The backend reports errors as `{"detail": "..."}`, or, for validation
/// failures, as `{"detail": [{"msg": "...", ...}, ...]}` whose messages are
/// joined with `"; "`.
pub fn detail_message(body: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match body.get("detail")? {
        Value::String(detail) if !detail.is_empty() => Some(detail.clone()),
        Value::Array(details) if !details.is_empty() => Some(
            details
                .iter()
                .map(|d| match d {
                    Value::String(s) => s.clone(),
                    _ => match d.get("msg").and_then(Value::as_str) {
                        Some(msg) => msg.to_owned(),
                        None => d.to_string(),
                    },
                })
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_string() {
        assert_eq!(
            detail_message(&json!({"detail": "Incorrect username or password"})).as_deref(),
            Some("Incorrect username or password")
        );
    }

    #[test]
    fn detail_validation_list() {
        let body = json!({"detail": [
            {"loc": ["body", "username"], "msg": "field required", "type": "value_error.missing"},
            "plain entry",
            {"code": 7},
        ]});
        assert_eq!(
            detail_message(&body).as_deref(),
            Some(r#"field required; plain entry; {"code":7}"#)
        );
    }

    #[test]
    fn detail_absent() {
        assert_eq!(detail_message(&json!({"error": "x"})), None);
        assert_eq!(detail_message(&json!(null)), None);
        assert_eq!(detail_message(&json!({"detail": ""})), None);
    }

    #[test]
    fn token_response_requires_non_empty_token() {
        let res: TokenResponse = serde_json::from_value(json!({"token_type": "bearer"})).unwrap();
        assert!(res.credential().is_none());

        let res: TokenResponse = serde_json::from_value(json!({"access_token": ""})).unwrap();
        assert!(res.credential().is_none());

        let res: TokenResponse =
            serde_json::from_value(json!({"access_token": "T1", "token_type": "bearer"})).unwrap();
        assert_eq!(res.credential().unwrap().expose(), "T1");
    }

    #[test]
    fn token_response_from_any_body() {
        assert!(TokenResponse::from_body(&json!(null)).credential().is_none());
        assert!(TokenResponse::from_body(&json!("OK")).credential().is_none());
        assert!(TokenResponse::from_body(&json!([])).credential().is_none());
        assert!(TokenResponse::from_body(&json!({"access_token": 7}))
            .credential()
            .is_none());

        let res = TokenResponse::from_body(&json!({"access_token": "T1", "token_type": "bearer"}));
        assert_eq!(res.token_type.as_deref(), Some("bearer"));
        assert_eq!(res.credential().unwrap().expose(), "T1");
    }

    #[test]
    fn password_grant_fields() {
        let fields = password_grant(&Password::new("alice", "secret"));
        assert_eq!(
            fields,
            vec![
                ("grant_type".to_string(), "password".to_string()),
                ("username".to_string(), "alice".to_string()),
                ("password".to_string(), "secret".to_string()),
                ("scope".to_string(), String::new()),
            ]
        );
    }
}
