use crate::auth::auth_repository::RefreshTokenRepository;
use crate::auth::{create_access_token, create_refresh_token, hash_password, otp, verify_jwt, verify_password};
use crate::db::DbPool;
use crate::delivery::DeliveryTask;
use crate::error::{AppError, Result};
use crate::gadget::gadget_models::{GadgetKind, OtpPurpose};
use crate::gadget::gadget_repository::GadgetRepository;
use crate::gadget::otp_repository::OtpRepository;
use crate::notification::settings_repository::SettingsRepository;
use crate::queue::TaskQueue;
use crate::user::user_models::User;
use crate::user::user_repository::UserRepository;
use chrono::{Duration, Utc};

#[derive(Clone)]
pub struct AuthService {
    db: DbPool,
    user_repo: UserRepository,
    refresh_token_repo: RefreshTokenRepository,
    gadget_repo: GadgetRepository,
    otp_repo: OtpRepository,
    settings_repo: SettingsRepository,
    delivery_queue: TaskQueue<DeliveryTask>,
    jwt_secret: String,
    otp_ttl_minutes: i64,
}

impl AuthService {
    pub fn new(
        db: DbPool,
        user_repo: UserRepository,
        refresh_token_repo: RefreshTokenRepository,
        gadget_repo: GadgetRepository,
        otp_repo: OtpRepository,
        settings_repo: SettingsRepository,
        delivery_queue: TaskQueue<DeliveryTask>,
        jwt_secret: String,
        otp_ttl_minutes: i64,
    ) -> Self {
        Self {
            db,
            user_repo,
            refresh_token_repo,
            gadget_repo,
            otp_repo,
            settings_repo,
            delivery_queue,
            jwt_secret,
            otp_ttl_minutes,
        }
    }

    /// Register a new user. The user row, its default notification settings,
    /// the email gadget and the first refresh token commit atomically.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String, String)> {
        let password_hash = hash_password(password)?;

        let mut tx = self.db.begin().await?;

        let user = self
            .user_repo
            .create_with_tx(&mut tx, username, email, &password_hash)
            .await?;

        self.settings_repo
            .create_defaults_with_tx(&mut tx, user.id)
            .await?;

        self.gadget_repo
            .create_with_tx(&mut tx, user.id, GadgetKind::Email, email, false)
            .await?;

        let access_token = create_access_token(user.id, &user.email, &user.role, &self.jwt_secret)?;
        let refresh_token = create_refresh_token(user.id, &user.email, &user.role, &self.jwt_secret)?;

        let expires_at = Utc::now() + Duration::days(7);
        self.refresh_token_repo
            .create_with_tx(&mut tx, user.id, &refresh_token, expires_at)
            .await?;

        tx.commit().await?;

        Ok((user, access_token, refresh_token))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String, String)> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".into()))?;

        if let Some(ref password_hash) = user.password_hash {
            if !verify_password(password, password_hash)? {
                return Err(AppError::Authentication("Invalid credentials".into()));
            }
        } else {
            return Err(AppError::Authentication("Please use Google login".into()));
        }

        let access_token = create_access_token(user.id, &user.email, &user.role, &self.jwt_secret)?;
        let refresh_token = create_refresh_token(user.id, &user.email, &user.role, &self.jwt_secret)?;

        let mut tx = self.db.begin().await?;

        let expires_at = Utc::now() + Duration::days(7);
        self.refresh_token_repo
            .create_with_tx(&mut tx, user.id, &refresh_token, expires_at)
            .await?;

        tx.commit().await?;

        Ok((user, access_token, refresh_token))
    }

    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<(String, String)> {
        let claims = verify_jwt(refresh_token, &self.jwt_secret)?;

        self.refresh_token_repo
            .find_by_token(refresh_token)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid refresh token".into()))?;

        let user_id = uuid::Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Authentication("Invalid token claims".into()))?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Authentication("User not found".into()))?;

        let new_access_token = create_access_token(user.id, &user.email, &user.role, &self.jwt_secret)?;
        let new_refresh_token = create_refresh_token(user.id, &user.email, &user.role, &self.jwt_secret)?;

        let mut tx = self.db.begin().await?;

        self.refresh_token_repo
            .delete_by_token_with_tx(&mut tx, refresh_token)
            .await?;

        let expires_at = Utc::now() + Duration::days(7);
        self.refresh_token_repo
            .create_with_tx(&mut tx, user.id, &new_refresh_token, expires_at)
            .await?;

        tx.commit().await?;

        Ok((new_access_token, new_refresh_token))
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        self.refresh_token_repo.delete_by_token(refresh_token).await
    }

    pub async fn google_login_or_register(
        &self,
        username: &str,
        email: &str,
        google_id: &str,
        avatar_url: &str,
    ) -> Result<(User, String, String)> {
        let mut tx = self.db.begin().await?;

        let user = self
            .user_repo
            .upsert_google_user_with_tx(&mut tx, username, email, google_id, avatar_url)
            .await?;

        self.settings_repo
            .create_defaults_with_tx(&mut tx, user.id)
            .await?;

        // Google has already verified the address.
        self.gadget_repo
            .ensure_with_tx(&mut tx, user.id, GadgetKind::Email, email, true)
            .await?;

        let access_token = create_access_token(user.id, &user.email, &user.role, &self.jwt_secret)?;
        let refresh_token = create_refresh_token(user.id, &user.email, &user.role, &self.jwt_secret)?;

        let expires_at = Utc::now() + Duration::days(7);
        self.refresh_token_repo
            .create_with_tx(&mut tx, user.id, &refresh_token, expires_at)
            .await?;

        tx.commit().await?;

        Ok((user, access_token, refresh_token))
    }

    /// Issue a password reset code to a verified email gadget. Unknown or
    /// unverified addresses are not distinguishable from the outside.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let Some(gadget) = self
            .gadget_repo
            .find_verified_by_value(GadgetKind::Email, email)
            .await?
        else {
            tracing::debug!("password reset requested for unknown email");
            return Ok(());
        };

        let code = otp::generate_code();
        let code_hash = otp::hash_code(&code)?;
        let expires_at = Utc::now() + Duration::minutes(self.otp_ttl_minutes);

        self.otp_repo
            .create(gadget.id, &code_hash, OtpPurpose::PasswordReset, expires_at)
            .await?;

        self.delivery_queue.enqueue(DeliveryTask::Email {
            recipients: vec![gadget.value.clone()],
            subject: "Your password reset code".to_string(),
            body: format!("Your tradepost password reset code is {}", code),
        });

        Ok(())
    }

    pub async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> Result<()> {
        let gadget = self
            .gadget_repo
            .find_verified_by_value(GadgetKind::Email, email)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid or expired code".into()))?;

        let otp_code = self
            .otp_repo
            .find_active(gadget.id, OtpPurpose::PasswordReset)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid or expired code".into()))?;

        if !otp::verify_code(code, &otp_code.code_hash)? {
            return Err(AppError::BadRequest("Invalid or expired code".into()));
        }

        let password_hash = hash_password(new_password)?;

        let mut tx = self.db.begin().await?;
        self.otp_repo.consume_with_tx(&mut tx, otp_code.id).await?;
        self.user_repo
            .update_password_with_tx(&mut tx, gadget.user_id, &password_hash)
            .await?;
        tx.commit().await?;

        Ok(())
    }
}
