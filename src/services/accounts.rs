//! # 계정 서비스
//!
//! 비밀번호 해싱(Argon2id), 참가자 가입/로그인, 관리자 계정 준비를 담당합니다.
//! 라우트 핸들러와 서버 시작 코드(main.rs)가 함께 사용합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sqlx::SqlitePool;

use crate::db::users as db_users;
use crate::error::AppError;
use crate::models::user::{RegisterRequest, User, ROLE_ADMIN, ROLE_STUDENT};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 8;

/// 비밀번호를 Argon2id로 해싱합니다. 솔트는 매번 새로 만듭니다.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// 저장된 해시와 비밀번호가 일치하는지 확인합니다.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 새 참가자(student)를 등록합니다. 가입 API로는 관리자를 만들 수 없습니다.
pub async fn register_student(pool: &SqlitePool, req: &RegisterRequest) -> Result<User, AppError> {
    if req.username.trim().len() < MIN_USERNAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Username must be at least {} characters",
            MIN_USERNAME_LEN
        )));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if let Some(email) = &req.email {
        if !email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
    }

    if db_users::find_by_username(pool, &req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = uuid::Uuid::now_v7().to_string();
    db_users::create_user(
        pool,
        &user_id,
        &req.username,
        req.email.as_deref(),
        &password_hash,
        ROLE_STUDENT,
    )
    .await
}

/// 아이디/비밀번호로 사용자를 확인합니다.
///
/// 어느 쪽이 틀렸는지 알려주지 않도록 같은 401 메시지를 돌려줍니다.
pub async fn authenticate(pool: &SqlitePool, username: &str, password: &str) -> Result<User, AppError> {
    let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

    let user = db_users::find_by_username(pool, username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(invalid());
    }

    Ok(user)
}

/// 서버 시작 시 관리자 계정을 보장합니다.
///
/// - 계정이 없으면 admin 역할로 새로 만듭니다.
/// - 같은 이름의 참가자 계정이 있으면 admin으로 승격합니다 (비밀번호는 건드리지 않음).
pub async fn ensure_admin(pool: &SqlitePool, username: &str, password: &str) -> Result<User, AppError> {
    if let Some(user) = db_users::find_by_username(pool, username).await? {
        if !user.is_admin() {
            db_users::set_role(pool, &user.id, ROLE_ADMIN).await?;
            tracing::info!(username, "Promoted existing account to admin");
        }
        return db_users::find_by_id(pool, &user.id)
            .await?
            .ok_or(AppError::NotFound);
    }

    let password_hash = hash_password(password)?;
    let user_id = uuid::Uuid::now_v7().to_string();
    let user =
        db_users::create_user(pool, &user_id, username, None, &password_hash, ROLE_ADMIN).await?;
    tracing::info!(username, "Created admin account");
    Ok(user)
}
