use serde::{Deserialize, Serialize};

use crate::domain::salesperson::Salesperson;

/// `salesman_id` of the superadmin account. Users without a salesman id are
/// plain admins.
pub const SUPERADMIN_SALESMAN_ID: i64 = 0;

/// Form body of `POST /login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub is_admin: bool,
    pub is_superadmin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesperson: Option<Salesperson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String, // username
    pub salesman_id: Option<i64>,
    pub is_admin: bool,
    pub is_superadmin: bool,
    pub exp: usize, // expiration timestamp
    pub iat: usize, // issued at
}

/// Role flags derived from a user's salesman id: `(is_admin, is_superadmin)`
pub fn role_flags(salesman_id: Option<i64>) -> (bool, bool) {
    match salesman_id {
        None => (true, false),
        Some(SUPERADMIN_SALESMAN_ID) => (true, true),
        Some(_) => (false, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_flags() {
        assert_eq!(role_flags(None), (true, false));
        assert_eq!(role_flags(Some(0)), (true, true));
        assert_eq!(role_flags(Some(17)), (false, false));
    }
}
