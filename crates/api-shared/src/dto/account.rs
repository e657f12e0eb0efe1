use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sns_types::{DeliveryMethod, DevicePlatform, UserRole};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenRes {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// Body of `POST /auth/signup`. The role-specific signup routes ignore `role`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupReq {
    #[serde(default)]
    pub email: Option<String>,
    pub phone: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub service_category: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// JSON login. Either `email` or `phone` identifies the account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginReq {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
}

/// OAuth2 password-grant style form login; `username` is an email or phone.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshReq {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OtpSendReq {
    pub phone: String,
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OtpVerifyReq {
    pub phone: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserRes {
    pub id: String,
    pub email: Option<String>,
    pub full_name: String,
    pub phone: String,
    pub role: String,
    pub service_category: Option<String>,
    pub bio: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub profile_photo: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial profile update. Absent fields are left unchanged; `null` clears an optional field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserUpdateReq {
    pub full_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::dto::explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, nullable)]
    pub email: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "crate::dto::explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, nullable)]
    pub bio: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "crate::dto::explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, nullable)]
    pub address: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "crate::dto::explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, nullable)]
    pub profile_photo: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "crate::dto::explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<f64>, nullable)]
    pub latitude: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "crate::dto::explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<f64>, nullable)]
    pub longitude: Option<Option<f64>>,
}

/// A user together with the marketplace statistics computed for professionals.
///
/// `match_score` and `match_reason` are only present in match listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProProfileRes {
    pub id: String,
    pub email: Option<String>,
    pub full_name: String,
    pub phone: String,
    pub role: String,
    pub service_category: Option<String>,
    pub bio: Option<String>,
    pub address: Option<String>,
    pub profile_photo: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub rating: f64,
    pub jobs_completed: i64,
    pub reviews_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeviceTokenCreateReq {
    pub token: String,
    pub platform: DevicePlatform,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeviceTokenRes {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub platform: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_defaults_optional_fields() {
        let req: SignupReq = serde_json::from_str(
            r#"{"phone":"9000000001","password":"pw","full_name":"Asha"}"#,
        )
        .unwrap();
        assert!(req.email.is_none());
        assert!(req.role.is_none());
    }

    #[test]
    fn signup_rejects_unknown_role() {
        let err = serde_json::from_str::<SignupReq>(
            r#"{"phone":"1","password":"pw","full_name":"A","role":"admin"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("admin"));
    }

    #[test]
    fn profile_update_tells_null_from_absent() {
        let req: UserUpdateReq =
            serde_json::from_str(r#"{"bio":null,"address":"12 MG Road"}"#).unwrap();
        assert_eq!(req.bio, Some(None));
        assert_eq!(req.address, Some(Some("12 MG Road".to_owned())));
        assert_eq!(req.profile_photo, None);
        assert_eq!(req.latitude, None);
    }

    #[test]
    fn otp_delivery_defaults_to_sms() {
        let req: OtpSendReq = serde_json::from_str(r#"{"phone":"9"}"#).unwrap();
        assert_eq!(req.delivery_method, DeliveryMethod::Sms);
    }
}
