use std::path::Path;

use crate::error::ValidationError;
use crate::order::CheckoutForm;

pub const MIN_PASSWORD_LEN: usize = 6;

const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub confirm_password: String,
}

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

pub fn validate_login(identifier: &str, password: &str) -> Result<(), ValidationError> {
    required(identifier, "Email or username")?;
    required(password, "Password")
}

pub fn validate_register(form: &RegisterForm) -> Result<(), ValidationError> {
    required(&form.username, "Username")?;
    required(&form.email, "Email")?;
    required(&form.password, "Password")?;
    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    Ok(())
}

/// Postal code stays optional.
pub fn validate_checkout(form: &CheckoutForm) -> Result<(), ValidationError> {
    let s = &form.shipping;
    required(&s.full_name, "Full name")?;
    required(&s.phone, "Phone")?;
    required(&s.address, "Address")?;
    required(&s.city, "City")?;
    required(&s.province, "Province")
}

pub fn validate_chat_message(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        Err(ValidationError::EmptyMessage)
    } else {
        Ok(())
    }
}

/// MIME type for an uploadable image, judged by extension.
pub fn image_mime(path: &Path) -> Result<&'static str, ValidationError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    IMAGE_EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| ValidationError::UnsupportedImage(path.display().to_string()))
}
