//! Admin account provisioning.

use brief_bulletin_core::{AdminForm, Email, Role, ValidationError};
use brief_bulletin_portal::api::{ApiClient, NewUser};

use super::CliError;

/// Create an account with role ADMIN.
///
/// Name, e-mail and password are required and the e-mail must be well
/// formed. No sign-in is needed.
pub async fn create(api: &ApiClient, form: AdminForm) -> Result<(), CliError> {
    form.validate()?;
    let email = Email::parse(&form.email).map_err(|_| ValidationError::InvalidEmail)?;

    tracing::info!("Creating admin account: {email}");
    let envelope = api
        .create_user(&NewUser {
            email: email.into_inner(),
            password: form.password,
            phone: form.phone.trim().to_owned(),
            user_name: form.name.trim().to_owned(),
            role: Some(Role::Admin),
        })
        .await?;

    tracing::info!("{}", envelope.message_or("Admin user created successfully!"));
    Ok(())
}
