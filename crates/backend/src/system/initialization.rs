use anyhow::Result;
use contracts::system::auth::SUPERADMIN_SALESMAN_ID;
use contracts::system::users::CreateUserDto;

use crate::system::users::{repository, service};

/// Create the superadmin account when `sys_users` is empty
pub async fn ensure_admin_user_exists(password: &str) -> Result<()> {
    let count = repository::count_users().await?;

    if count == 0 {
        tracing::info!("No users found. Creating default admin user...");

        let admin_dto = CreateUserDto {
            username: "admin".to_string(),
            password: password.to_string(),
            salesman_id: Some(SUPERADMIN_SALESMAN_ID),
            full_name: Some("Administrator".to_string()),
        };

        let admin_id = service::create(admin_dto).await?;

        tracing::warn!(
            "Default admin user created (username: admin, id: {})",
            admin_id
        );
        tracing::warn!("Change the bootstrap password before going live");
    }

    Ok(())
}
