use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User account as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub full_name: Option<String>,
}

/// Paginated user list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersPublic {
    pub data: Vec<UserPublic>,
    pub count: u64,
}

/// Admin request body for `POST /users/`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(email(message = "Invalid email address"), length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 40, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
}

/// Self-service registration body for `POST /users/signup`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserRegister {
    #[validate(email(message = "Invalid email address"), length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 40, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 3, max = 255, message = "Full name must be at least 3 characters"))]
    pub full_name: Option<String>,
}

/// Admin request body for `PATCH /users/{id}`; unset fields are not sent
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email address"), length(max = 255))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 8, max = 40, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_superuser: Option<bool>,
}

/// Body for `PATCH /users/me`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdateMe {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email address"), length(max = 255))]
    pub email: Option<String>,
}

/// Body for `PATCH /users/me/password`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePassword {
    #[validate(length(min = 8, max = 40))]
    pub current_password: String,
    #[validate(length(min = 8, max = 40, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Body for `POST /reset-password/`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewPassword {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8, max = 40, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Bearer token issued by `POST /login/access-token`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Login form credentials; `username` is the account email
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginCredentials {
    #[validate(email(message = "Invalid email address"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Generic acknowledgement body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_validation() {
        let ok = UserRegister {
            email: "ada@example.com".to_string(),
            password: "correcthorse".to_string(),
            full_name: Some("Ada Lovelace".to_string()),
        };
        assert!(ok.validate().is_ok());

        let short_name = UserRegister {
            full_name: Some("Al".to_string()),
            ..ok.clone()
        };
        assert!(short_name.validate().is_err());

        let bad_email = UserRegister {
            email: "ada.example.com".to_string(),
            ..ok.clone()
        };
        assert!(bad_email
            .validate()
            .unwrap_err()
            .field_errors()
            .contains_key("email"));

        let short_password = UserRegister {
            password: "short".to_string(),
            ..ok
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn update_skips_unset_fields() {
        let update = UserUpdate {
            full_name: Some("Grace".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"full_name": "Grace"})
        );
    }

    #[test]
    fn token_type_defaults_to_bearer() {
        let token: Token = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(token.token_type, "bearer");
    }
}
