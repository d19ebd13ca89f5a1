use contracts::system::auth::{TokenClaims, UserInfo};

pub mod admin;
pub mod budget;
pub mod division;
pub mod gross_profit;
pub mod sales;

/// `user_info` block of admin-only responses
pub(crate) fn admin_info(claims: TokenClaims) -> UserInfo {
    UserInfo {
        username: claims.sub,
        is_admin: true,
    }
}
