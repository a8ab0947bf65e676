//! Form validation.
//!
//! Messages are shown to readers as-is, so they are part of the contract.

use serde::Deserialize;

/// A form failed validation before anything was sent to the API.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter email and password")]
    MissingCredentials,
    #[error("Please fill all required fields")]
    MissingSignUpFields,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,
    #[error("Please enter and confirm your new password")]
    MissingNewPassword,
    #[error("Please enter a valid 6-digit OTP")]
    OtpLength,
    #[error("OTP must contain only numbers")]
    OtpNotNumeric,
    #[error("Please enter your email address")]
    MissingEmail,
    #[error("Please fill all fields")]
    MissingCommentFields,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please fill all required fields (Name, Email, Password).")]
    MissingAdminFields,
}

/// Minimum password length for new accounts and resets.
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Checks shared by sign-up and password reset, after presence checks.
///
/// # Errors
///
/// [`ValidationError::PasswordMismatch`] first, then
/// [`ValidationError::PasswordTooShort`].
pub fn check_new_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Sign-in form. `login` may be an e-mail, user name or phone number.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

impl SignInForm {
    /// # Errors
    ///
    /// [`ValidationError::MissingCredentials`] when either field is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.login) || self.password.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(())
    }
}

/// Sign-up form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub user_name: String,
}

impl SignUpForm {
    /// # Errors
    ///
    /// Presence of every field, then the password rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.email)
            || self.password.is_empty()
            || is_blank(&self.phone)
            || is_blank(&self.user_name)
        {
            return Err(ValidationError::MissingSignUpFields);
        }
        check_new_password(&self.password, &self.confirm_password)
    }
}

/// "Forgot password" form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    pub email: String,
}

impl ForgotPasswordForm {
    /// Returns the trimmed address.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingEmail`] when empty.
    pub fn validate(&self) -> Result<&str, ValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        Ok(email)
    }
}

/// New password after a verified reset code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl ResetPasswordForm {
    /// # Errors
    ///
    /// [`ValidationError::MissingNewPassword`] when either field is empty,
    /// then the password rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.new_password.is_empty() || self.confirm_password.is_empty() {
            return Err(ValidationError::MissingNewPassword);
        }
        check_new_password(&self.new_password, &self.confirm_password)
    }
}
