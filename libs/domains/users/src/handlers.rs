use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_helpers::{
    ApiBody, AuthUser, BearerToken, JwtAuth, ListMeta, Pagination, RevocationError, ValidatedJson,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{UserError, UserResult};
use crate::models::{
    CreateUser, LoginRequest, PasswordResetConfirm, PasswordResetRequest, RegisterRequest,
    TokenResponse, UpdateProfileRequest, UpdateUser, UserFilter, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

const MAX_PAGE_SIZE: u64 = 100;

/// State for the auth endpoints: the user service plus the token issuer
pub struct AuthState<R: UserRepository> {
    pub service: Arc<UserService<R>>,
    pub jwt: JwtAuth,
}

impl<R: UserRepository> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            jwt: self.jwt.clone(),
        }
    }
}

/// Public auth endpoints. `/logout` must additionally sit behind the auth
/// middleware so the bearer token extension is present.
pub fn auth_router<R: UserRepository + 'static>(
    service: Arc<UserService<R>>,
    jwt: JwtAuth,
) -> Router {
    let state = AuthState { service, jwt };

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/password-reset/request", post(request_password_reset))
        .route("/password-reset/confirm", post(confirm_password_reset))
        .with_state(state)
}

/// Logout endpoint, routed separately so it can be wrapped in the auth layer
pub fn logout_router<R: UserRepository + 'static>(
    service: Arc<UserService<R>>,
    jwt: JwtAuth,
) -> Router {
    let state = AuthState { service, jwt };
    Router::new().route("/logout", post(logout)).with_state(state)
}

/// Authenticated profile endpoints
pub fn profile_router<R: UserRepository + 'static>(service: Arc<UserService<R>>) -> Router {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .with_state(service)
}

/// Admin user CRUD
pub fn admin_router<R: UserRepository + 'static>(service: Arc<UserService<R>>) -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .with_state(service)
}

/// POST /auth/register
async fn register<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> UserResult<impl IntoResponse> {
    let user = state.service.register(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiBody::new("User registered successfully", user)),
    ))
}

/// POST /auth/login
async fn login<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<ApiBody<TokenResponse>>> {
    let user = state
        .service
        .verify_credentials(&input.email, &input.password)
        .await?;

    let token = state
        .jwt
        .create_token(user.id, &user.role.to_string())
        .map_err(|e| UserError::Token(e.to_string()))?;

    Ok(Json(ApiBody::new("Login successful", TokenResponse { token })))
}

/// POST /auth/logout
async fn logout<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Extension(token): Extension<BearerToken>,
) -> UserResult<Json<ApiBody<()>>> {
    state.jwt.revoke_token(&token.0).await.map_err(|e| match e {
        RevocationError::InvalidToken(msg) => UserError::Validation(msg),
        RevocationError::AlreadyExpired => {
            UserError::Validation("Token is already expired".to_string())
        }
        RevocationError::Store(e) => UserError::Token(e.to_string()),
    })?;

    Ok(Json(ApiBody::<()>::message_only("Logout successful")))
}

/// POST /auth/password-reset/request
async fn request_password_reset<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<PasswordResetRequest>,
) -> UserResult<Json<ApiBody<()>>> {
    state.service.request_password_reset(&input.email).await?;
    Ok(Json(ApiBody::<()>::message_only(
        "If the email exists, a reset link has been sent",
    )))
}

/// POST /auth/password-reset/confirm
async fn confirm_password_reset<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<PasswordResetConfirm>,
) -> UserResult<Json<ApiBody<()>>> {
    state.service.confirm_password_reset(input).await?;
    Ok(Json(ApiBody::<()>::message_only(
        "Password has been reset successfully",
    )))
}

/// GET /profile
async fn get_profile<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Extension(auth): Extension<AuthUser>,
) -> UserResult<Json<ApiBody<UserResponse>>> {
    let user = service.get_user(auth.id).await?;
    Ok(Json(ApiBody::new("Profile retrieved successfully", user)))
}

/// PUT /profile
async fn update_profile<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(input): ValidatedJson<UpdateProfileRequest>,
) -> UserResult<Json<ApiBody<UserResponse>>> {
    let user = service.update_profile(auth.id, input).await?;
    Ok(Json(ApiBody::new("Profile updated successfully", user)))
}

#[derive(Debug, Default, Deserialize)]
struct ListUsersQuery {
    page: Option<u64>,
    limit: Option<u64>,
    search: Option<String>,
}

/// GET /admin/users?page=&limit=&search=
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Query(query): Query<ListUsersQuery>,
) -> UserResult<Json<ApiBody<Vec<UserResponse>>>> {
    let pagination = Pagination::new(query.page, query.limit, 10);
    pagination
        .ensure_valid(MAX_PAGE_SIZE)
        .map_err(UserError::Validation)?;

    let (users, total) = service
        .list_users(UserFilter {
            search: query.search,
            role: None,
            limit: pagination.limit,
            offset: pagination.offset(),
        })
        .await?;

    pagination
        .ensure_in_range(total)
        .map_err(UserError::Validation)?;

    let meta =
        ListMeta::new(pagination.page, pagination.limit, total).with_links("/api/admin/users");
    Ok(Json(ApiBody::paginated(
        "Users retrieved successfully",
        users,
        meta,
    )))
}

/// POST /admin/users
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiBody::new("User created successfully", user)),
    ))
}

/// GET /admin/users/{id}
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<i32>,
) -> UserResult<Json<ApiBody<UserResponse>>> {
    let user = service.get_user(id).await?;
    Ok(Json(ApiBody::new("User retrieved successfully", user)))
}

/// PUT /admin/users/{id}
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<i32>,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<ApiBody<UserResponse>>> {
    let user = service.update_user(id, input).await?;
    Ok(Json(ApiBody::new("User updated successfully", user)))
}

/// DELETE /admin/users/{id}
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<i32>,
) -> UserResult<Json<ApiBody<()>>> {
    service.delete_user(id).await?;
    Ok(Json(ApiBody::<()>::message_only("User deleted successfully")))
}
