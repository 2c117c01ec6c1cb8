use crate::core::error::ValidationError;
use crate::models::entry::NewEntry;
use crate::models::user::NewUser;

/// Check an account form and return it with email and name trimmed.
/// Passwords are kept byte-for-byte.
pub fn validate_new_user(user: NewUser) -> Result<NewUser, ValidationError> {
    let email = user.email.trim().to_string();
    let name = user.name.trim().to_string();

    if email.is_empty() {
        return Err(ValidationError::MissingField("email"));
    }

    validate_email(&email)?;

    if user.password.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }

    if name.is_empty() {
        return Err(ValidationError::MissingField("name"));
    }

    Ok(NewUser {
        email,
        password: user.password,
        name,
        role: user.role,
    })
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(ValidationError::InvalidFormat(format!(
            "'{}' is not an email address",
            email
        ))),
    }
}

/// Every allocation field is required and must not be blank
pub fn validate_new_entry(entry: &NewEntry) -> Result<(), ValidationError> {
    let fields: [(&'static str, &str); 8] = [
        ("user_id", &entry.user_id),
        ("name", &entry.name),
        ("serial_numbers", &entry.serial_numbers),
        ("id_number", &entry.id_number),
        ("phone_number", &entry.phone_number),
        ("van_shop", &entry.van_shop),
        ("allocation_date", &entry.allocation_date),
        ("location", &entry.location),
    ];

    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(field));
        }
    }

    Ok(())
}
