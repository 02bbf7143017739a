use crate::{
    auth::{hash_password, verify_password, AuthenticatedUser, TokenKeys},
    error::AppError,
    models::{
        AuthResponse, ChangePasswordRequest, LoginRequest, PublicUser, RegisterRequest,
        UpdateProfileRequest, User,
    },
};
use actix_web::{get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Register a new account.
///
/// Stores a salted hash of the password, never the plaintext, and returns a
/// freshly issued bearer token together with the public identity.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    keys: web::Data<TokenKeys>,
    payload: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let existing = sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(&**pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;

    // The unique constraint on email backs up the check above; a concurrent
    // duplicate insert still comes back as a conflict.
    let user = sqlx::query_as::<_, PublicUser>(
        "INSERT INTO users (name, email, password_hash)
         VALUES ($1, $2, $3)
         RETURNING id, name, email",
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&password_hash)
    .fetch_one(&**pool)
    .await?;

    let token = keys.issue(user.id)?;
    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Created().json(AuthResponse { token, user }))
}

/// Authenticate with email and password.
///
/// Unknown email and wrong password produce the identical generic response,
/// so the endpoint cannot be used to probe which emails are registered.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    keys: web::Data<TokenKeys>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1",
    )
    .bind(&payload.email)
    .fetch_optional(&**pool)
    .await?;

    // One generic answer for both an unknown email and a wrong password.
    let user = match user {
        Some(user) => user,
        None => return Err(AppError::Unauthenticated("Invalid credentials".into())),
    };
    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Unauthenticated("Invalid credentials".into()));
    }

    let token = keys.issue(user.id)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}

/// Return the caller's own identity.
#[get("/me")]
pub async fn me(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let profile =
        sqlx::query_as::<_, PublicUser>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(user.0)
            .fetch_optional(&**pool)
            .await?;

    match profile {
        Some(profile) => Ok(HttpResponse::Ok().json(profile)),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

/// Update the caller's name and email.
#[put("/profile")]
pub async fn update_profile(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let taken = sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE email = $1 AND id <> $2")
        .bind(&payload.email)
        .bind(user.0)
        .fetch_optional(&**pool)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(
            "Email already used by another account".into(),
        ));
    }

    let updated = sqlx::query_as::<_, PublicUser>(
        "UPDATE users SET name = $1, email = $2 WHERE id = $3 RETURNING id, name, email",
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(user.0)
    .fetch_optional(&**pool)
    .await?;

    match updated {
        Some(profile) => Ok(HttpResponse::Ok().json(profile)),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

/// Replace the caller's password after re-checking the current one.
#[put("/password")]
pub async fn change_password(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    payload: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let stored = sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
        .bind(user.0)
        .fetch_optional(&**pool)
        .await?;
    let stored = stored.ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !verify_password(&payload.current_password, &stored)? {
        return Err(AppError::Unauthenticated(
            "Current password incorrect".into(),
        ));
    }

    let new_hash = hash_password(&payload.new_password)?;
    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(&new_hash)
        .bind(user.0)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Password updated" })))
}
