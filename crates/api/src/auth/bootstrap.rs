//! Seed the first admin account.
//!
//! Registration always creates non-admin users, so a fresh deployment has no
//! one able to promote anybody. When `ADMIN_EMAIL` and `ADMIN_PASSWORD` are
//! set, startup ensures that account exists and carries the admin flag.

use panotour_db::models::user::CreateUser;
use panotour_db::repositories::UserRepo;
use panotour_db::DbPool;

use crate::auth::password::hash_password;
use crate::config::AdminSeed;
use crate::error::{AppError, AppResult};

/// Create the seed admin, or promote it if the account already exists.
///
/// An existing account keeps its password. The email is stored lower-cased,
/// the same way registration stores it.
pub async fn ensure_admin(pool: &DbPool, seed: &AdminSeed) -> AppResult<()> {
    let email = seed.email.trim().to_lowercase();

    if let Some(user) = UserRepo::find_by_email(pool, &email).await? {
        if !user.is_admin {
            UserRepo::set_admin(pool, user.id, true).await?;
            tracing::info!(user_id = user.id, "Promoted seed account to admin");
        }
        return Ok(());
    }

    let password_hash = hash_password(&seed.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: seed.username.clone(),
            email,
            password_hash,
            is_admin: true,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, email = %user.email, "Created seed admin account");
    Ok(())
}
