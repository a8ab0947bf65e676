//! Account endpoints: login, sign-up, OTP and password reset.

use brief_bulletin_core::{OtpCode, Role, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiClient, ApiEnvelope, ApiError};

/// Successful login payload.
#[derive(Clone)]
pub struct LoginPayload {
    pub user_id: Option<UserId>,
    pub user_name: String,
    pub email: Option<String>,
    pub role: Role,
    pub token: SecretString,
}

impl std::fmt::Debug for LoginPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginPayload")
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Deserialize)]
struct RawLoginPayload {
    #[serde(default)]
    user_id: Option<UserId>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    token: Option<String>,
}

/// Account creation request (`api/auth/create`).
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub phone: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("phone", &self.phone)
            .field("user_name", &self.user_name)
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    login: &'a str,
    pwd: &'a str,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    login: &'a str,
    otp: &'a str,
}

#[derive(Serialize)]
struct SendOtpRequest<'a> {
    login: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest<'a> {
    email: &'a str,
    new_pwd: &'a str,
}

impl ApiClient {
    /// Log in with an e-mail, user name or phone number.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unverified`] when the account still needs OTP
    /// verification (the API mails a code in that case), or any other
    /// [`ApiError`]. A success envelope without a token is
    /// [`ApiError::Rejected`].
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        login: &str,
        password: &SecretString,
    ) -> Result<LoginPayload, ApiError> {
        let envelope = self
            .post(
                "api/auth/login",
                &LoginRequest {
                    login,
                    pwd: password.expose_secret(),
                },
                None,
            )
            .await?;
        let status = envelope.status_code;
        let message = envelope.message().map(str::to_owned);
        let Some(raw) = envelope.payload::<Option<RawLoginPayload>>()? else {
            return Err(ApiError::Rejected { status, message });
        };

        let token = raw
            .token
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Rejected { status, message })?;

        Ok(LoginPayload {
            user_id: raw.user_id,
            user_name: raw.user_name.unwrap_or_else(|| login.to_owned()),
            email: raw.email,
            role: raw.role.unwrap_or_default(),
            token: SecretString::from(token),
        })
    }

    /// Create an account. The API mails a verification code on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the API refuses the account.
    #[instrument(skip(self), fields(email = %user.email))]
    pub async fn create_user(&self, user: &NewUser) -> Result<ApiEnvelope, ApiError> {
        self.post("api/auth/create", user, None).await
    }

    /// Check a code mailed to `login`.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is wrong or expired.
    #[instrument(skip(self, code))]
    pub async fn verify_otp(&self, login: &str, code: &OtpCode) -> Result<ApiEnvelope, ApiError> {
        self.post(
            "api/verify-user",
            &VerifyRequest {
                login,
                otp: code.as_str(),
            },
            None,
        )
        .await
    }

    /// Mail a fresh code to `login`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API cannot send the code.
    #[instrument(skip(self))]
    pub async fn send_otp(&self, login: &str) -> Result<ApiEnvelope, ApiError> {
        self.post("api/send-otp", &SendOtpRequest { login }, None).await
    }

    /// Store a new password after a verified reset code.
    ///
    /// # Errors
    ///
    /// Returns an error if the API refuses the reset.
    #[instrument(skip(self, new_password))]
    pub async fn reset_password(
        &self,
        email: &str,
        new_password: &SecretString,
    ) -> Result<ApiEnvelope, ApiError> {
        self.post(
            "api/auth/resetpwd",
            &ResetPasswordRequest {
                email,
                new_pwd: new_password.expose_secret(),
            },
            None,
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::config::PortalConfig;

    async fn client(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(&PortalConfig::for_api(&server.url()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_login_sends_login_and_pwd() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/login")
            .match_body(Matcher::Json(json!({ "login": "reader", "pwd": "pw123456" })))
            .with_status(200)
            .with_body(
                json!({
                    "statusCode": 200,
                    "isSuccess": true,
                    "payload": {
                        "user_id": 3,
                        "user_name": "Reader",
                        "email": "reader@example.com",
                        "role": "admin",
                        "token": "jwt-abc"
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let api = client(&server).await;
        let payload = api
            .login("reader", &SecretString::from("pw123456"))
            .await
            .unwrap();
        assert_eq!(payload.user_name, "Reader");
        assert!(payload.role.is_admin());
        assert_eq!(payload.token.expose_secret(), "jwt-abc");
        assert!(!format!("{payload:?}").contains("jwt-abc"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_unverified() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .with_status(403)
            .with_body(
                json!({ "statusCode": 403, "serviceMessage": "OTP sent to your email" }).to_string(),
            )
            .create_async()
            .await;

        let api = client(&server).await;
        let err = api
            .login("reader", &SecretString::from("pw123456"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unverified { .. }));
        assert_eq!(err.service_message(), Some("OTP sent to your email"));
    }

    #[tokio::test]
    async fn test_login_without_token_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .with_status(200)
            .with_body(json!({ "statusCode": 200, "isSuccess": true, "payload": {} }).to_string())
            .create_async()
            .await;

        let api = client(&server).await;
        let err = api
            .login("reader", &SecretString::from("pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_create_user_body_uses_camel_case() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/create")
            .match_body(Matcher::Json(json!({
                "email": "ed@example.com",
                "password": "longenough",
                "phone": "",
                "userName": "Ed",
                "role": "ADMIN"
            })))
            .with_status(200)
            .with_body(json!({ "statusCode": 200, "isSuccess": true }).to_string())
            .create_async()
            .await;

        let api = client(&server).await;
        let user = NewUser {
            email: "ed@example.com".into(),
            password: "longenough".into(),
            phone: String::new(),
            user_name: "Ed".into(),
            role: Some(Role::Admin),
        };
        api.create_user(&user).await.unwrap();
        assert!(!format!("{user:?}").contains("longenough"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_reset_password_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/resetpwd")
            .match_body(Matcher::Json(json!({ "email": "a@b.c", "newPwd": "newpassword" })))
            .with_status(200)
            .with_body(json!({ "statusCode": 200 }).to_string())
            .create_async()
            .await;

        let api = client(&server).await;
        api.reset_password("a@b.c", &SecretString::from("newpassword"))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_verify_and_send_otp() {
        let mut server = mockito::Server::new_async().await;
        let verify = server
            .mock("POST", "/api/verify-user")
            .match_body(Matcher::Json(json!({ "login": "a@b.c", "otp": "123456" })))
            .with_status(200)
            .with_body(json!({ "statusCode": 200 }).to_string())
            .create_async()
            .await;
        let send = server
            .mock("POST", "/api/send-otp")
            .match_body(Matcher::Json(json!({ "login": "a@b.c" })))
            .with_status(200)
            .with_body(json!({ "statusCode": 200 }).to_string())
            .create_async()
            .await;

        let api = client(&server).await;
        let code = OtpCode::parse("123456").unwrap();
        api.verify_otp("a@b.c", &code).await.unwrap();
        api.send_otp("a@b.c").await.unwrap();
        verify.assert_async().await;
        send.assert_async().await;
    }
}
