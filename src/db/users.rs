use crate::error::AppError;
use crate::models::user::User;
use sqlx::SqlitePool;

pub async fn create_user(
    pool: &SqlitePool,
    id: &str,
    username: &str,
    email: Option<&str>,
    password_hash: &str,
    role: &str,
) -> Result<User, AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, role)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created user".to_string()))
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, role, created_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, role, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn set_role(pool: &SqlitePool, id: &str, role: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET role = ? WHERE id = ?")
        .bind(role)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::user::{ROLE_ADMIN, ROLE_STUDENT};

    #[tokio::test]
    async fn student_can_be_promoted_to_admin() {
        let pool = test_pool().await;
        let user = create_user(&pool, "u1", "camila", None, "hash", ROLE_STUDENT)
            .await
            .unwrap();
        assert!(!user.is_admin());

        set_role(&pool, "u1", ROLE_ADMIN).await.unwrap();
        let user = find_by_username(&pool, "camila").await.unwrap().unwrap();
        assert!(user.is_admin());
        assert!(find_by_id(&pool, "u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_database_error() {
        let pool = test_pool().await;
        create_user(&pool, "u1", "camila", None, "hash", ROLE_STUDENT)
            .await
            .unwrap();
        let err = create_user(&pool, "u2", "camila", None, "hash", ROLE_STUDENT)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
