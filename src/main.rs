mod auth;
mod db;
mod delivery;
mod error;
mod gadget;
mod jobs;
mod middleware;
mod notification;
mod push;
mod queue;
mod routes;
mod state;
mod transaction;
mod user;

use auth::create_oauth_client;
use db::{create_pool, run_migrations};
use delivery::{DeliveryTask, LogEmailSender, LogSmsSender};
use push::channels::{ApnsChannel, FcmChannel, PushChannel};
use push::push_service::PushTask;
use push::worker::PushWorker;
use queue::{RetryPolicy, TaskQueue};
use routes::create_router;
use state::{AppState, Config};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tradepost=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());

    // Create database connection pool
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set");

    tracing::info!("Connecting to database...");
    let db = create_pool(&database_url).await?;

    // Run migrations
    tracing::info!("Running migrations...");
    run_migrations(&db).await?;

    // Create OAuth client
    let oauth_client = create_oauth_client(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_redirect_uri.clone(),
    )?;

    // In-app notification broadcaster (SSE)
    let (notification_tx, _) = broadcast::channel(100);

    // Create repositories
    let user_repository = user::user_repository::UserRepository::new(db.clone());
    let refresh_token_repository = auth::auth_repository::RefreshTokenRepository::new(db.clone());
    let gadget_repository = gadget::gadget_repository::GadgetRepository::new(db.clone());
    let otp_repository = gadget::otp_repository::OtpRepository::new(db.clone());
    let transaction_repository =
        transaction::transaction_repository::TransactionRepository::new(db.clone());
    let notification_repository =
        notification::notification_repository::NotificationRepository::new(db.clone());
    let settings_repository =
        notification::settings_repository::SettingsRepository::new(db.clone());
    let device_repository = push::device_repository::DeviceRepository::new(db.clone());

    // Delivery queue: email/SMS dispatch with bounded retry
    let email_sender: Arc<dyn delivery::EmailSender> = Arc::new(LogEmailSender);
    let sms_sender: Arc<dyn delivery::SmsSender> = Arc::new(LogSmsSender);
    let delivery_queue = TaskQueue::start(
        "delivery",
        RetryPolicy::default(),
        move |task: DeliveryTask| {
            let email_sender = email_sender.clone();
            let sms_sender = sms_sender.clone();
            async move { delivery::dispatch(task, email_sender, sms_sender).await }
        },
    );

    // Push queue: one worker re-checking eligibility per task
    let channels: Vec<Arc<dyn PushChannel>> = vec![
        Arc::new(FcmChannel::new(config.fcm_server_key.clone())),
        Arc::new(ApnsChannel::new(
            config.apns_auth_token.clone(),
            config.apns_topic.clone(),
        )),
    ];
    let push_worker = Arc::new(PushWorker::new(
        device_repository.clone(),
        settings_repository.clone(),
        notification_repository.clone(),
        channels,
    ));
    let push_queue = TaskQueue::start(
        "push",
        RetryPolicy::default(),
        move |task: PushTask| {
            let worker = push_worker.clone();
            async move { worker.deliver(task).await }
        },
    );

    // Create services
    let user_service = user::user_service::UserService::new(user_repository.clone());
    let auth_service = auth::auth_service::AuthService::new(
        db.clone(),
        user_repository.clone(),
        refresh_token_repository.clone(),
        gadget_repository.clone(),
        otp_repository.clone(),
        settings_repository.clone(),
        delivery_queue.clone(),
        config.jwt_secret.clone(),
        config.otp_ttl_minutes,
    );
    let gadget_service = gadget::gadget_service::GadgetService::new(
        db.clone(),
        gadget_repository.clone(),
        otp_repository.clone(),
        delivery_queue.clone(),
        config.otp_ttl_minutes,
    );
    let notification_service = notification::notification_service::NotificationService::new(
        notification_repository.clone(),
        notification_tx.clone(),
    );
    let settings_service = notification::settings_service::SettingsService::new(
        db.clone(),
        settings_repository.clone(),
    );
    let push_service = push::push_service::PushService::new(
        device_repository.clone(),
        settings_repository.clone(),
        notification_repository.clone(),
        push_queue,
    );
    let transaction_service = transaction::transaction_service::TransactionService::new(
        transaction_repository.clone(),
        user_repository.clone(),
        notification_service.clone(),
        push_service.clone(),
        config.transaction_response_hours,
    );

    // Create application state
    let state = AppState {
        db: db.clone(),
        config: config.clone(),
        oauth_client,
        notification_tx: notification_tx.clone(),
        refresh_token_repository,
        auth_service,
        user_service,
        gadget_service,
        transaction_service,
        notification_service,
        settings_service,
        push_service,
    };

    // Start scheduled jobs (expiry sweep, cleanup)
    let scheduler_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = jobs::start_scheduler(scheduler_state).await {
            tracing::error!("Scheduler error: {:?}", e);
        }
    });

    // Create router
    let app = create_router(state);

    // Start server
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
