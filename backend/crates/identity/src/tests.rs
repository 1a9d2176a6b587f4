//! Scenario tests for the identity crate
//! Use cases run against the in-memory store, a recording mailer and a manual clock.

pub(crate) mod support {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use platform::clock::Clock;

    use crate::domain::entity::user::ExternalProfile;
    use crate::domain::gateway::{EmailSender, IdentityProvider};
    use crate::domain::value_object::{
        auth_provider::AuthProvider, email::Email, verification_code::VerificationCode,
    };
    use crate::error::{AuthError, AuthResult};

    /// Clock that only moves when told to
    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self {
                now: Mutex::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            }
        }
    }

    impl ManualClock {
        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    /// Mailer that keeps every (recipient, code) it was asked to send
    #[derive(Clone, Default)]
    pub struct RecordingEmailSender {
        sent: Arc<Mutex<Vec<(Email, VerificationCode)>>>,
        failing: Arc<AtomicBool>,
    }

    impl RecordingEmailSender {
        pub fn sent(&self) -> Vec<(Email, VerificationCode)> {
            self.sent.lock().unwrap().clone()
        }

        pub fn last(&self) -> Option<(Email, VerificationCode)> {
            self.sent.lock().unwrap().last().cloned()
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    impl EmailSender for RecordingEmailSender {
        async fn send_verification_code(
            &self,
            recipient: &Email,
            code: &VerificationCode,
        ) -> AuthResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(AuthError::Dispatch("mailbox unavailable".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((recipient.clone(), code.clone()));
            Ok(())
        }
    }

    pub const BAD_CODE: &str = "bad-code";

    /// Identity provider returning a fixed profile for any code but [`BAD_CODE`]
    #[derive(Clone)]
    pub struct StubIdentityProvider {
        profile: Arc<Mutex<ExternalProfile>>,
    }

    impl Default for StubIdentityProvider {
        fn default() -> Self {
            Self::with_profile(ExternalProfile {
                subject: "google-sub-1".into(),
                given_name: Some("Ada".into()),
                family_name: Some("Lovelace".into()),
                email: Email::from_trusted("ada@example.com"),
                email_verified: true,
            })
        }
    }

    impl StubIdentityProvider {
        pub fn with_profile(profile: ExternalProfile) -> Self {
            Self {
                profile: Arc::new(Mutex::new(profile)),
            }
        }

        pub fn set_profile(&self, profile: ExternalProfile) {
            *self.profile.lock().unwrap() = profile;
        }
    }

    impl IdentityProvider for StubIdentityProvider {
        fn provider(&self) -> AuthProvider {
            AuthProvider::Google
        }

        async fn exchange_code(&self, code: &str) -> AuthResult<String> {
            if code == BAD_CODE {
                return Err(AuthError::ExternalAuth("invalid_grant".into()));
            }
            Ok(format!("provider-token-{code}"))
        }

        async fn fetch_profile(&self, _access_token: &str) -> AuthResult<ExternalProfile> {
            Ok(self.profile.lock().unwrap().clone())
        }
    }
}

#[cfg(test)]
mod scenario_tests {
    use std::sync::Arc;

    use chrono::Duration;
    use platform::clock::Clock;

    use super::support::{BAD_CODE, ManualClock, RecordingEmailSender, StubIdentityProvider};
    use crate::application::{
        CredentialHasher, CurrentUserUseCase, FederatedLoginInput, FederatedLoginUseCase, LoginInput,
        LoginUseCase, RegisterInput, RegisterUseCase, RequestVerificationUseCase,
        SetAccountStatusUseCase, TokenIssuer, TokenKind, VerifyEmailInput, VerifyEmailUseCase,
    };
    use crate::application::config::AuthConfig;
    use crate::domain::entity::user::{ExternalProfile, User};
    use crate::domain::repository::{UserRepository, VerificationTokenRepository};
    use crate::domain::value_object::{auth_provider::AuthProvider, email::Email};
    use crate::error::AuthError;
    use crate::infra::memory::InMemoryIdentityRepository;

    const PASSWORD: &str = "Passw0rd!";

    struct World {
        repo: Arc<InMemoryIdentityRepository>,
        mailer: Arc<RecordingEmailSender>,
        provider: Arc<StubIdentityProvider>,
        clock: Arc<ManualClock>,
        issuer: Arc<TokenIssuer>,
        hasher: Arc<CredentialHasher>,
    }

    impl World {
        fn new() -> Self {
            let config = Arc::new(AuthConfig::development());
            let clock = Arc::new(ManualClock::default());
            let issuer = Arc::new(TokenIssuer::new(config.clone(), clock.clone()));
            let hasher = Arc::new(CredentialHasher::new(config.clone()));
            Self {
                repo: Arc::new(InMemoryIdentityRepository::new()),
                mailer: Arc::new(RecordingEmailSender::default()),
                provider: Arc::new(StubIdentityProvider::default()),
                clock,
                issuer,
                hasher,
            }
        }

        async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
            let use_case = RegisterUseCase::new(
                self.repo.clone(),
                self.repo.clone(),
                self.mailer.clone(),
                self.hasher.clone(),
                self.clock.clone(),
            );
            use_case
                .execute(RegisterInput {
                    email: email.into(),
                    password: password.into(),
                })
                .await?;
            let user = self
                .repo
                .find_by_email(&Email::new(email)?)
                .await?
                .ok_or(AuthError::UserNotFound)?;
            Ok(user)
        }

        async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
            let use_case =
                LoginUseCase::new(self.repo.clone(), self.issuer.clone(), self.hasher.clone());
            let output = use_case
                .execute(LoginInput {
                    email: email.into(),
                    password: password.into(),
                })
                .await?;
            Ok(output.tokens.access_token)
        }

        async fn consume(&self, user_id: &str, token: &str) -> Result<(), AuthError> {
            let use_case =
                VerifyEmailUseCase::new(self.repo.clone(), self.repo.clone(), self.clock.clone());
            use_case
                .execute(VerifyEmailInput {
                    user_id: user_id.into(),
                    token: token.into(),
                })
                .await
        }

        async fn resend(&self, user: &User) -> Result<(), AuthError> {
            let use_case = RequestVerificationUseCase::new(
                self.repo.clone(),
                self.mailer.clone(),
                self.clock.clone(),
            );
            use_case.execute(user).await
        }

        async fn google(&self, code: &str) -> Result<bool, AuthError> {
            let use_case = FederatedLoginUseCase::new(
                self.repo.clone(),
                self.provider.clone(),
                self.issuer.clone(),
                self.clock.clone(),
            );
            let output = use_case
                .execute(FederatedLoginInput { code: code.into() })
                .await?;
            Ok(output.created)
        }

        fn last_code(&self) -> String {
            self.mailer.last().unwrap().1.as_str().to_string()
        }

        async fn reload(&self, user: &User) -> User {
            self.repo.find_by_id(&user.user_id).await.unwrap().unwrap()
        }
    }

    // ========================================================================
    // Register
    // ========================================================================

    #[tokio::test]
    async fn test_register_once_then_conflict() {
        let world = World::new();
        let user = world.register("a@b.com", PASSWORD).await.unwrap();
        assert!(!user.is_verified);
        assert_eq!(user.provider, AuthProvider::Local);

        let err = world.register("A@B.com", PASSWORD).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(err.to_string(), "Email already exists.");
        assert_eq!(world.repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let world = World::new();

        let err = world.register("not-an-email", PASSWORD).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email");

        let err = world.register("a@b.com", "short1").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let err = world.register("", PASSWORD).await.unwrap_err();
        assert_eq!(err.to_string(), "Email is required");

        let err = world.register("a@b.com", "").await.unwrap_err();
        assert_eq!(err.to_string(), "Password is required");

        assert_eq!(world.repo.user_count().await, 0);
        assert!(world.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_register_sends_six_digit_code() {
        let world = World::new();
        let user = world.register("a@b.com", PASSWORD).await.unwrap();

        let (recipient, code) = world.mailer.last().unwrap();
        assert_eq!(recipient.as_str(), "a@b.com");
        assert_eq!(code.as_str().len(), 6);
        assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));

        let stored = world.repo.tokens_for(&user.user_id).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(
            stored[0].expires_at - stored[0].created_at,
            Duration::seconds(300)
        );
    }

    #[tokio::test]
    async fn test_dispatch_failure_keeps_user() {
        let world = World::new();
        world.mailer.set_failing(true);

        let err = world.register("a@b.com", PASSWORD).await.unwrap_err();
        assert!(matches!(err, AuthError::Dispatch(_)));

        let user = world
            .repo
            .find_by_email(&Email::new("a@b.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(!user.is_verified);
    }

    // ========================================================================
    // Verification
    // ========================================================================

    #[tokio::test]
    async fn test_consume_within_window() {
        let world = World::new();
        let user = world.register("a@b.com", PASSWORD).await.unwrap();
        let code = world.last_code();

        world.clock.advance(Duration::seconds(299));
        world
            .consume(&user.user_id.to_string(), &code)
            .await
            .unwrap();

        assert!(world.reload(&user).await.is_verified);
        assert!(world.repo.tokens_for(&user.user_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_consume_rejects_padded_code() {
        let world = World::new();
        let user = world.register("a@b.com", PASSWORD).await.unwrap();
        let id = user.user_id.to_string();
        let code = world.last_code();

        for padded in [format!(" {code}\t"), format!("{code} "), format!("\n{code}")] {
            let err = world.consume(&id, &padded).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidVerificationToken));
        }
        assert!(!world.reload(&user).await.is_verified);

        world.consume(&id, &code).await.unwrap();
        assert!(world.reload(&user).await.is_verified);
    }

    #[tokio::test]
    async fn test_consume_after_window_expires() {
        let world = World::new();
        let user = world.register("a@b.com", PASSWORD).await.unwrap();
        let code = world.last_code();

        world.clock.advance(Duration::seconds(300));
        let err = world
            .consume(&user.user_id.to_string(), &code)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::VerificationTokenExpired));
        assert!(!world.reload(&user).await.is_verified);
    }

    #[tokio::test]
    async fn test_consume_rejects_superseded_code() {
        let world = World::new();
        let user = world.register("a@b.com", PASSWORD).await.unwrap();
        let old_code = world.last_code();

        world.clock.advance(Duration::seconds(300));
        world.resend(&user).await.unwrap();
        let new_code = world.last_code();
        assert_eq!(world.repo.tokens_for(&user.user_id).await.len(), 1);

        if old_code != new_code {
            let err = world
                .consume(&user.user_id.to_string(), &old_code)
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::InvalidVerificationToken));
        }

        world
            .consume(&user.user_id.to_string(), &new_code)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_consume_error_order() {
        let world = World::new();
        let user = world.register("a@b.com", PASSWORD).await.unwrap();
        let id = user.user_id.to_string();
        let code = world.last_code();

        assert!(matches!(
            world.consume("", &code).await,
            Err(AuthError::MissingParameter("user_id"))
        ));
        assert!(matches!(
            world.consume(&id, "").await,
            Err(AuthError::MissingParameter("token"))
        ));
        assert!(matches!(
            world.consume("not-a-uuid", &code).await,
            Err(AuthError::NoVerificationToken)
        ));
        assert!(matches!(
            world
                .consume(&crate::domain::value_object::user_id::UserId::new().to_string(), &code)
                .await,
            Err(AuthError::NoVerificationToken)
        ));

        let wrong = if code == "000000" { "111111" } else { "000000" };
        assert!(matches!(
            world.consume(&id, wrong).await,
            Err(AuthError::InvalidVerificationToken)
        ));
    }

    #[tokio::test]
    async fn test_consume_already_verified() {
        let world = World::new();
        let user = world.register("a@b.com", PASSWORD).await.unwrap();
        let code = world.last_code();
        world.consume(&user.user_id.to_string(), &code).await.unwrap();

        // A stale token left behind must not re-verify
        let stale = crate::domain::entity::verification_token::VerificationToken::issue(
            user.user_id,
            world.clock.now(),
        );
        world.repo.create(&stale).await.unwrap();
        let err = world
            .consume(&user.user_id.to_string(), stale.token.as_str())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AlreadyVerified));
    }

    #[tokio::test]
    async fn test_resend_throttle_and_invalidation() {
        let world = World::new();
        let user = world.register("a@b.com", PASSWORD).await.unwrap();

        let err = world.resend(&user).await.unwrap_err();
        assert!(matches!(err, AuthError::VerificationTokenNotExpired));
        assert_eq!(world.mailer.sent().len(), 1);

        world.clock.advance(Duration::seconds(300));
        world.resend(&user).await.unwrap();
        assert_eq!(world.mailer.sent().len(), 2);

        let err = world.resend(&user).await.unwrap_err();
        assert!(matches!(err, AuthError::VerificationTokenNotExpired));
    }

    #[tokio::test]
    async fn test_resend_for_verified_user() {
        let world = World::new();
        let user = world.register("a@b.com", PASSWORD).await.unwrap();
        let code = world.last_code();
        world.consume(&user.user_id.to_string(), &code).await.unwrap();

        let verified = world.reload(&user).await;
        let err = world.resend(&verified).await.unwrap_err();
        assert!(matches!(err, AuthError::AlreadyVerified));
    }

    // ========================================================================
    // Login
    // ========================================================================

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let world = World::new();
        world.register("a@b.com", PASSWORD).await.unwrap();

        let wrong_password = world.login("a@b.com", "Wr0ngPass!").await.unwrap_err();
        let unknown_email = world.login("nobody@b.com", PASSWORD).await.unwrap_err();
        let bad_email = world.login("not-an-email", PASSWORD).await.unwrap_err();

        for err in [&wrong_password, &unknown_email, &bad_email] {
            assert!(matches!(err, AuthError::InvalidCredentials));
            assert_eq!(err.to_string(), "Incorrect email or password");
            assert_eq!(err.code(), "INVALID_CREDENTIALS");
        }
    }

    #[tokio::test]
    async fn test_login_token_resolves_current_user() {
        let world = World::new();
        let user = world.register("a@b.com", PASSWORD).await.unwrap();
        let token = world.login("A@b.com", PASSWORD).await.unwrap();

        assert_eq!(
            world.issuer.validate(&token, TokenKind::Access).unwrap(),
            "a@b.com"
        );

        let current = CurrentUserUseCase::new(world.repo.clone(), world.issuer.clone())
            .execute(&token)
            .await
            .unwrap();
        assert_eq!(current.user_id, user.user_id);

        world.clock.advance(Duration::minutes(30));
        let err = CurrentUserUseCase::new(world.repo.clone(), world.issuer.clone())
            .execute(&token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::BearerTokenExpired));
    }

    #[tokio::test]
    async fn test_disabled_account() {
        let world = World::new();
        let user = world.register("a@b.com", PASSWORD).await.unwrap();
        let token = world.login("a@b.com", PASSWORD).await.unwrap();

        SetAccountStatusUseCase::new(world.repo.clone())
            .execute(&user.user_id, true)
            .await
            .unwrap();

        // Wrong password still looks like any other failure
        let err = world.login("a@b.com", "Wr0ngPass!").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = world.login("a@b.com", PASSWORD).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountDisabled));

        let err = CurrentUserUseCase::new(world.repo.clone(), world.issuer.clone())
            .execute(&token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountDisabled));

        SetAccountStatusUseCase::new(world.repo.clone())
            .execute(&user.user_id, false)
            .await
            .unwrap();
        world.login("a@b.com", PASSWORD).await.unwrap();
    }

    // ========================================================================
    // Federated login
    // ========================================================================

    #[tokio::test]
    async fn test_federated_creates_then_updates() {
        let world = World::new();
        assert!(world.google("code-1").await.unwrap());

        world.provider.set_profile(ExternalProfile {
            subject: "google-sub-1".into(),
            given_name: Some("Augusta".into()),
            family_name: Some("King".into()),
            email: Email::from_trusted("ada@example.com"),
            email_verified: true,
        });
        assert!(!world.google("code-2").await.unwrap());

        assert_eq!(world.repo.user_count().await, 1);
        let user = world
            .repo
            .find_by_email(&Email::new("ada@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.provider, AuthProvider::Google);
        assert_eq!(user.given_name.as_deref(), Some("Augusta"));
        assert!(user.is_verified);
        assert!(user.password_hash.is_none());
    }

    #[tokio::test]
    async fn test_federated_account_cannot_password_login() {
        let world = World::new();
        world.google("code").await.unwrap();
        let err = world.login("ada@example.com", PASSWORD).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_federated_merges_into_local_account() {
        let world = World::new();
        let local = world.register("ada@example.com", PASSWORD).await.unwrap();

        assert!(!world.google("code").await.unwrap());
        let merged = world.reload(&local).await;
        assert_eq!(merged.provider, AuthProvider::Local);
        assert!(merged.is_verified);
        assert_eq!(merged.family_name.as_deref(), Some("Lovelace"));
        world.login("ada@example.com", PASSWORD).await.unwrap();
    }

    #[tokio::test]
    async fn test_federated_errors() {
        let world = World::new();
        assert!(matches!(
            world.google("   ").await,
            Err(AuthError::MissingParameter("code"))
        ));
        assert!(matches!(
            world.google(BAD_CODE).await,
            Err(AuthError::ExternalAuth(_))
        ));
        assert_eq!(world.repo.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_federated_subject_conflict() {
        let world = World::new();
        world.google("code").await.unwrap();

        // Same provider subject arriving under a different address
        world.provider.set_profile(ExternalProfile {
            subject: "google-sub-1".into(),
            given_name: None,
            family_name: None,
            email: Email::from_trusted("other@example.com"),
            email_verified: true,
        });
        assert!(matches!(
            world.google("code").await,
            Err(AuthError::ExternalSubjectTaken)
        ));
    }
}
