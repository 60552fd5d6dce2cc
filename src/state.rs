use crate::db::DbPool;
use crate::notification::notification_models::Notification;
use oauth2::basic::BasicClient;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::auth_repository::RefreshTokenRepository;
use crate::auth::auth_service::AuthService;
use crate::gadget::gadget_service::GadgetService;
use crate::notification::notification_service::NotificationService;
use crate::notification::settings_service::SettingsService;
use crate::push::push_service::PushService;
use crate::transaction::transaction_service::TransactionService;
use crate::user::user_service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub oauth_client: BasicClient,
    pub notification_tx: broadcast::Sender<(Uuid, Notification)>,
    pub refresh_token_repository: RefreshTokenRepository,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub gadget_service: GadgetService,
    pub transaction_service: TransactionService,
    pub notification_service: NotificationService,
    pub settings_service: SettingsService,
    pub push_service: PushService,
}

#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub fcm_server_key: String,
    pub apns_auth_token: String,
    pub apns_topic: String,
    pub transaction_response_hours: i64,
    pub otp_ttl_minutes: i64,
    pub gadget_retention_days: i32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: std::env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set"),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID")
                .expect("GOOGLE_CLIENT_ID must be set"),
            google_client_secret: std::env::var("GOOGLE_CLIENT_SECRET")
                .expect("GOOGLE_CLIENT_SECRET must be set"),
            google_redirect_uri: std::env::var("GOOGLE_REDIRECT_URI")
                .expect("GOOGLE_REDIRECT_URI must be set"),
            fcm_server_key: std::env::var("FCM_SERVER_KEY")
                .expect("FCM_SERVER_KEY must be set"),
            apns_auth_token: std::env::var("APNS_AUTH_TOKEN")
                .expect("APNS_AUTH_TOKEN must be set"),
            apns_topic: std::env::var("APNS_TOPIC")
                .unwrap_or_else(|_| "com.tradepost.app".to_string()),
            transaction_response_hours: std::env::var("TRANSACTION_RESPONSE_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("TRANSACTION_RESPONSE_HOURS must be a number"),
            otp_ttl_minutes: std::env::var("OTP_TTL_MINUTES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("OTP_TTL_MINUTES must be a number"),
            gadget_retention_days: std::env::var("GADGET_RETENTION_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("GADGET_RETENTION_DAYS must be a number"),
        }
    }
}
