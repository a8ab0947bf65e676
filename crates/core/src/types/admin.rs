//! Admin account provisioning form.

use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, is_blank};

/// The "create admin" form. Held only while the tab is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub phone: String,
}

impl AdminForm {
    /// Name, e-mail and password are required; phone is optional.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingAdminFields`] when a required field is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.name) || is_blank(&self.email) || self.password.is_empty() {
            return Err(ValidationError::MissingAdminFields);
        }
        Ok(())
    }
}
