use crate::{
    auth::auth_dto::*,
    auth::auth_handlers,
    gadget::gadget_dto::*,
    gadget::gadget_handlers,
    gadget::gadget_models::{Gadget, GadgetKind},
    middleware::auth_middleware,
    notification::notification_dto::*,
    notification::notification_handlers,
    notification::notification_models::{
        Notification, NotificationSettings, NotificationStatus, NotificationType,
    },
    push::device_handlers::{self, AddDeviceRequest},
    push::device_models::{Device, DevicePlatform},
    state::AppState,
    transaction::transaction_dto::*,
    transaction::transaction_handlers,
    transaction::transaction_models::{Transaction, TransactionStatus},
    user::user_dto::UpdateProfileRequest,
    user::user_handlers,
    user::user_models::{User, UserResponse},
};
use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::refresh_token,
        auth_handlers::logout,
        auth_handlers::forgot_password,
        auth_handlers::reset_password,
        auth_handlers::google_login,
        auth_handlers::google_callback,
        user_handlers::get_me,
        user_handlers::update_me,
        gadget_handlers::list_gadgets,
        gadget_handlers::add_gadget,
        gadget_handlers::request_verification,
        gadget_handlers::verify_gadget,
        gadget_handlers::delete_gadget,
        transaction_handlers::list_transactions,
        transaction_handlers::get_transaction,
        transaction_handlers::create_transaction,
        transaction_handlers::respond_transaction,
        transaction_handlers::resend_transaction,
        transaction_handlers::request_geodata,
        transaction_handlers::update_geodata,
        notification_handlers::list_notifications,
        notification_handlers::notification_stream,
        notification_handlers::update_notification_status,
        notification_handlers::get_notification_settings,
        notification_handlers::update_notification_settings,
        device_handlers::add_device,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshTokenRequest,
            AuthResponse,
            RefreshTokenResponse,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            UpdateProfileRequest,
            AddGadgetRequest,
            VerifyGadgetRequest,
            CreateTransactionRequest,
            RespondTransactionRequest,
            GeodataRequest,
            UpdateNotificationStatusRequest,
            NotificationSettingUpdate,
            UpdateNotificationSettingsRequest,
            AddDeviceRequest,
            User,
            UserResponse,
            Gadget,
            GadgetKind,
            Transaction,
            TransactionStatus,
            Notification,
            NotificationType,
            NotificationStatus,
            NotificationSettings,
            Device,
            DevicePlatform,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "Profile endpoints"),
        (name = "gadgets", description = "Contact channel endpoints"),
        (name = "transactions", description = "Trading endpoints"),
        (name = "notifications", description = "Notification endpoints"),
        (name = "devices", description = "Push device registration")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let auth_routes = Router::new()
        .route("/register", post(auth_handlers::register))
        .route("/login", post(auth_handlers::login))
        .route("/refresh", post(auth_handlers::refresh_token))
        .route("/logout", post(auth_handlers::logout))
        .route("/password/forgot", post(auth_handlers::forgot_password))
        .route("/password/reset", post(auth_handlers::reset_password))
        .route("/google", get(auth_handlers::google_login))
        .route("/google/callback", get(auth_handlers::google_callback));

    // Protected routes (auth required)
    let user_routes = Router::new()
        .route(
            "/me",
            get(user_handlers::get_me).put(user_handlers::update_me),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let gadget_routes = Router::new()
        .route(
            "/",
            get(gadget_handlers::list_gadgets).post(gadget_handlers::add_gadget),
        )
        .route("/:id", delete(gadget_handlers::delete_gadget))
        .route(
            "/:id/verification",
            post(gadget_handlers::request_verification),
        )
        .route("/:id/verify", post(gadget_handlers::verify_gadget))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let transaction_routes = Router::new()
        .route(
            "/",
            get(transaction_handlers::list_transactions)
                .post(transaction_handlers::create_transaction),
        )
        .route("/:id", get(transaction_handlers::get_transaction))
        .route("/:id/respond", post(transaction_handlers::respond_transaction))
        .route("/:id/resend", post(transaction_handlers::resend_transaction))
        .route(
            "/:id/geodata/request",
            post(transaction_handlers::request_geodata),
        )
        .route("/:id/geodata", put(transaction_handlers::update_geodata))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let notification_routes = Router::new()
        .route("/", get(notification_handlers::list_notifications))
        .route("/stream", get(notification_handlers::notification_stream))
        .route(
            "/:id/status",
            patch(notification_handlers::update_notification_status),
        )
        .route(
            "/settings",
            get(notification_handlers::get_notification_settings)
                .put(notification_handlers::update_notification_settings),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let device_routes = Router::new()
        .route("/", post(device_handlers::add_device))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine all routes
    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/gadgets", gadget_routes)
        .nest("/transactions", transaction_routes)
        .nest("/notifications", notification_routes)
        .nest("/devices", device_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}
