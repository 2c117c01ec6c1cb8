use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Authorization tag carried by every account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Public view of an account. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Stored account row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    /// `pbkdf2_sha256$<iterations>$<salt>$<hash>`
    pub password_hash: String,
    pub name: String,
    pub role: Role,
}

impl UserRecord {
    pub fn to_public(&self) -> User {
        User {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// Account fields supplied by the caller of `create_user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::Employee).unwrap(), "\"employee\"");
    }

    #[test]
    fn test_role_rejects_unknown_value() {
        assert!(serde_json::from_str::<Role>("\"manager\"").is_err());
        assert!("Admin".parse::<Role>().is_err());
        assert_eq!("employee".parse::<Role>().unwrap(), Role::Employee);
    }

    #[test]
    fn test_public_view_drops_password() {
        let record = UserRecord {
            id: "u1".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "pbkdf2_sha256$1$00$00".to_string(),
            name: "A".to_string(),
            role: Role::Employee,
        };

        let json = serde_json::to_value(record.to_public()).unwrap();
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["role"], "employee");
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
