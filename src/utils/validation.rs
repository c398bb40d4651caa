use crate::utils::error::{AppError, AppResult};

pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Link lifetimes offered by the share form.
pub const ALLOWED_EXPIRY_HOURS: &[i64] = &[1, 24, 72, 168];

pub fn validate_email(email: &str) -> AppResult<()> {
    if email.is_empty() {
        return Err(AppError::Validation("Email cannot be empty".to_string()));
    }

    if email.len() > 254 {
        return Err(AppError::Validation(
            "Email must be at most 254 characters long".to_string(),
        ));
    }

    // Matches the original form's leniency: presence of '@' only.
    if !email.contains('@') {
        return Err(AppError::Validation(
            "Email must contain an @ sign".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.is_empty() {
        return Err(AppError::Validation("Password cannot be empty".to_string()));
    }

    if password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters long".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_expiry_hours(hours: i64) -> AppResult<()> {
    if !ALLOWED_EXPIRY_HOURS.contains(&hours) {
        return Err(AppError::Validation(format!(
            "Expiry must be one of {:?} hours, got {}",
            ALLOWED_EXPIRY_HOURS, hours
        )));
    }

    Ok(())
}

pub fn validate_file_name(name: &str) -> AppResult<()> {
    if name.is_empty() {
        return Err(AppError::Validation(
            "File name cannot be empty".to_string(),
        ));
    }

    if name.len() > 255 {
        return Err(AppError::Validation(
            "File name must be at most 255 characters long".to_string(),
        ));
    }

    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(AppError::Validation(
            "File name must not contain path separators".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_file_size(data: &[u8]) -> AppResult<()> {
    if data.is_empty() {
        return Err(AppError::Validation("File is empty".to_string()));
    }

    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::Validation(format!(
            "File too large: {} bytes (max {} bytes)",
            data.len(),
            MAX_FILE_SIZE
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_hours_enumeration() {
        for hours in [1, 24, 72, 168] {
            assert!(validate_expiry_hours(hours).is_ok());
        }
        for hours in [0, 2, 48, 169, -1] {
            assert!(validate_expiry_hours(hours).is_err());
        }
    }

    #[test]
    fn test_email_leniency() {
        assert!(validate_email("a@b").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_file_name_rejects_traversal() {
        assert!(validate_file_name("report.pdf").is_ok());
        assert!(validate_file_name("../etc/passwd").is_err());
        assert!(validate_file_name("a/b.txt").is_err());
        assert!(validate_file_name("").is_err());
    }

    #[test]
    fn test_file_size_bounds() {
        assert!(validate_file_size(&[]).is_err());
        assert!(validate_file_size(&[0u8; 16]).is_ok());
    }
}
