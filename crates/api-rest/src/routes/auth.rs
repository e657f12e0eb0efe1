use api_shared::{
    AckRes, ErrorRes, LoginForm, LoginReq, OtpSendReq, OtpVerifyReq, RefreshReq, SignupReq,
    TokenKind, TokenRes, UserRes,
};
use axum::extract::State;
use axum::routing::post;
use axum::{Form, Json, Router};
use sns_core::repositories::users::{NewUser, INACTIVE_USER};
use sns_core::CoreError;
use sns_types::UserRole;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub const INVALID_OTP: &str = "Invalid or expired OTP";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signup/customer", post(signup_customer))
        .route("/auth/signup/pro", post(signup_pro))
        .route("/auth/login", post(login))
        .route("/auth/login/json", post(login_json))
        .route("/auth/refresh", post(refresh))
        .route("/auth/otp/send", post(send_otp))
        .route("/auth/otp/verify", post(verify_otp))
}

async fn register(state: &AppState, req: &SignupReq, role: UserRole) -> ApiResult<UserRes> {
    let user = state.users.create(NewUser::from_signup(req, role)?).await?;
    tracing::info!(user_id = %user.id, role = %role, "account created");
    Ok(user.into())
}

#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignupReq,
    responses(
        (status = 200, description = "Account created", body = UserRes),
        (status = 400, description = "Duplicate account or invalid data", body = ErrorRes)
    )
)]
/// Registers an account with the role named in the body.
///
/// # Returns
/// * `Ok(Json<UserRes>)` - The new account
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - `role` is missing, or a professional names no service category,
/// - the email or phone is already registered.
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupReq>,
) -> ApiResult<Json<UserRes>> {
    let role = req
        .role
        .ok_or_else(|| ApiError::bad_request("role must be customer or pro"))?;
    register(&state, &req, role).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/auth/signup/customer",
    tag = "auth",
    request_body = SignupReq,
    responses((status = 200, description = "Customer account created", body = UserRes))
)]
/// Registers a customer account; any `role` in the body is ignored.
///
/// # Returns
/// * `Ok(Json<UserRes>)` - The new account
async fn signup_customer(
    State(state): State<AppState>,
    Json(req): Json<SignupReq>,
) -> ApiResult<Json<UserRes>> {
    register(&state, &req, UserRole::Customer).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/auth/signup/pro",
    tag = "auth",
    request_body = SignupReq,
    responses((status = 200, description = "Professional account created", body = UserRes))
)]
/// Registers a professional account; a service category is required.
///
/// # Returns
/// * `Ok(Json<UserRes>)` - The new account
async fn signup_pro(
    State(state): State<AppState>,
    Json(req): Json<SignupReq>,
) -> ApiResult<Json<UserRes>> {
    register(&state, &req, UserRole::Pro).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token pair", body = TokenRes),
        (status = 400, description = "Bad credentials or inactive user", body = ErrorRes)
    )
)]
/// Form login; `username` is an email address or phone number.
///
/// # Returns
/// * `Ok(Json<TokenRes>)` - Access and refresh tokens
///
/// # Errors
/// Returns `400 Bad Request` for unknown accounts, wrong passwords and inactive users.
async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenRes>> {
    let user = state.users.authenticate(&form.username, &form.password).await?;
    Ok(Json(state.tokens.issue_pair(&user.id)?))
}

#[utoipa::path(
    post,
    path = "/auth/login/json",
    tag = "auth",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Token pair", body = TokenRes),
        (status = 400, description = "Bad credentials or inactive user", body = ErrorRes)
    )
)]
/// JSON login by email or phone.
///
/// # Returns
/// * `Ok(Json<TokenRes>)` - Access and refresh tokens
///
/// # Errors
/// Returns `400 Bad Request` for unknown accounts, wrong passwords and inactive users.
async fn login_json(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> ApiResult<Json<TokenRes>> {
    let user = state.users.authenticate_json(&req).await?;
    Ok(Json(state.tokens.issue_pair(&user.id)?))
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshReq,
    responses(
        (status = 200, description = "New token pair", body = TokenRes),
        (status = 401, description = "Invalid refresh token", body = ErrorRes)
    )
)]
/// Exchanges a refresh token for a fresh token pair.
///
/// # Returns
/// * `Ok(Json<TokenRes>)` - New access and refresh tokens
///
/// # Errors
/// Returns `401 Unauthorized` if the token is invalid, expired, an access token, or names a
/// user that no longer exists.
async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshReq>,
) -> ApiResult<Json<TokenRes>> {
    let claims = state.tokens.validate(&req.refresh_token, TokenKind::Refresh)?;
    let user = state
        .users
        .find(&claims.sub)
        .await?
        .ok_or_else(ApiError::credentials)?;
    if !user.is_active {
        return Err(ApiError::bad_request(INACTIVE_USER));
    }
    Ok(Json(state.tokens.issue_pair(&user.id)?))
}

#[utoipa::path(
    post,
    path = "/auth/otp/send",
    tag = "auth",
    request_body = OtpSendReq,
    responses((status = 200, description = "Code sent", body = AckRes))
)]
/// Generates a one-time code for a phone number and hands it to the delivery channel.
///
/// # Returns
/// * `Ok(Json<AckRes>)` - Confirmation naming the delivery method
async fn send_otp(
    State(state): State<AppState>,
    Json(req): Json<OtpSendReq>,
) -> ApiResult<Json<AckRes>> {
    let phone = req.phone.trim();
    if phone.is_empty() {
        return Err(CoreError::invalid("Phone number is required").into());
    }
    state.otp.send(phone, req.delivery_method).await?;
    Ok(Json(AckRes {
        message: format!("OTP sent via {}", req.delivery_method),
    }))
}

#[utoipa::path(
    post,
    path = "/auth/otp/verify",
    tag = "auth",
    request_body = OtpVerifyReq,
    responses(
        (status = 200, description = "Token pair", body = TokenRes),
        (status = 400, description = "Invalid or expired code", body = ErrorRes),
        (status = 404, description = "No account for this phone", body = ErrorRes)
    )
)]
/// Exchanges a valid code for a token pair of the account registered with that phone.
///
/// The code is consumed on success.
///
/// # Returns
/// * `Ok(Json<TokenRes>)` - Access and refresh tokens
///
/// # Errors
/// - `400 Bad Request` if the code is wrong, expired or already used, or the user is inactive
/// - `404 Not Found` if no account has that phone
async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<OtpVerifyReq>,
) -> ApiResult<Json<TokenRes>> {
    let phone = req.phone.trim();
    if !state.otp.verify(phone, req.code.trim()).await? {
        return Err(ApiError::bad_request(INVALID_OTP));
    }

    let user = state
        .users
        .find_by_phone(phone)
        .await?
        .ok_or_else(|| CoreError::not_found("User not found"))?;
    if !user.is_active {
        return Err(ApiError::bad_request(INACTIVE_USER));
    }
    Ok(Json(state.tokens.issue_pair(&user.id)?))
}
