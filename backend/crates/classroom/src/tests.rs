//! Flow tests against an in-memory SQLite database

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use platform::password::{PasswordHasher, PasswordParams};
    use sqlx::sqlite::SqlitePoolOptions;

    use crate::application::config::ClassroomConfig;
    use crate::infra::sqlite::{MIGRATOR, SqliteClassroomRepository};

    /// One connection that never closes, so the in-memory database lives
    /// as long as the pool.
    pub async fn repo() -> Arc<SqliteClassroomRepository> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        MIGRATOR.run(&pool).await.unwrap();
        Arc::new(SqliteClassroomRepository::new(pool))
    }

    pub fn config() -> Arc<ClassroomConfig> {
        Arc::new(ClassroomConfig {
            password_hasher: PasswordHasher::new(PasswordParams::minimal()).unwrap(),
            ..ClassroomConfig::development()
        })
    }

    pub fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    pub async fn player_count(repo: &SqliteClassroomRepository) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM Players")
            .fetch_one(repo.pool())
            .await
            .unwrap()
    }
}

#[cfg(test)]
mod register_tests {
    use super::support::*;
    use crate::application::{Notice, RegisterInput, RegisterUseCase};
    use crate::domain::repository::PlayerRepository;
    use crate::domain::value_object::{player_password::RawPassword, user_name::UserName};
    use crate::error::ValidationError;

    fn input(username: Option<String>, password: Option<String>, confirm: Option<String>) -> RegisterInput {
        RegisterInput {
            username,
            password,
            confirm_password: confirm,
        }
    }

    #[tokio::test]
    async fn test_register_stores_salted_digest() {
        let repo = repo().await;
        let config = config();
        let use_case = RegisterUseCase::new(repo.clone(), config.clone());

        let output = use_case
            .execute(input(some("alice"), some("pw123"), some("pw123")))
            .await
            .unwrap();
        assert_eq!(output.notice, Notice::AccountCreated);

        let player = repo
            .find_by_username(&UserName::try_from("alice".to_string()).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(player.id, output.player_id);
        assert_ne!(player.password_hash.as_phc_string(), "pw123");

        let right = RawPassword::from_input(some("pw123")).unwrap();
        let wrong = RawPassword::from_input(some("pw456")).unwrap();
        assert!(config.password_hasher.verify(right.inner(), &player.password_hash));
        assert!(!config.password_hasher.verify(wrong.inner(), &player.password_hash));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let repo = repo().await;
        let use_case = RegisterUseCase::new(repo.clone(), config());

        use_case
            .execute(input(some("alice"), some("pw123"), some("pw123")))
            .await
            .unwrap();
        let err = use_case
            .execute(input(some("alice"), some("pw456"), some("pw456")))
            .await
            .unwrap_err();

        assert_eq!(err.as_validation(), Some(ValidationError::UsernameTaken));
        assert_eq!(err.public_message(), "username already exists");
        assert_eq!(player_count(&repo).await, 1);
    }

    #[tokio::test]
    async fn test_mismatched_confirmation_writes_nothing() {
        let repo = repo().await;
        let use_case = RegisterUseCase::new(repo.clone(), config());

        let err = use_case
            .execute(input(some("bob"), some("pw123"), some("pw124")))
            .await
            .unwrap_err();

        assert_eq!(err.public_message(), "passwords did not match");
        assert_eq!(player_count(&repo).await, 0);
    }

    #[tokio::test]
    async fn test_lookalike_confirmation_is_a_mismatch() {
        let repo = repo().await;
        let use_case = RegisterUseCase::new(repo.clone(), config());

        // U+FF21 FULLWIDTH LATIN CAPITAL LETTER A
        let err = use_case
            .execute(input(some("bob"), some("\u{FF21}bc"), some("Abc")))
            .await
            .unwrap_err();

        assert_eq!(err.as_validation(), Some(ValidationError::PasswordMismatch));
        assert_eq!(player_count(&repo).await, 0);
    }

    #[tokio::test]
    async fn test_checks_run_in_order() {
        let repo = repo().await;
        let use_case = RegisterUseCase::new(repo.clone(), config());

        let cases = [
            (input(None, None, None), "please provide username"),
            (input(some(""), some("pw"), some("pw")), "please provide username"),
            (input(some("carol"), None, None), "please provide password"),
            (input(some("carol"), some(""), some("")), "please provide password"),
            (
                input(some("carol"), some("pw"), None),
                "please provide confirmation password",
            ),
        ];
        for (input, expected) in cases {
            let err = use_case.execute(input).await.unwrap_err();
            assert_eq!(err.public_message(), expected);
        }

        use_case
            .execute(input(some("carol"), some("pw"), some("pw")))
            .await
            .unwrap();

        // The duplicate check comes before the password checks
        let err = use_case
            .execute(input(some("carol"), None, None))
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "username already exists");
    }

    #[tokio::test]
    async fn test_unique_index_maps_to_username_taken() {
        let repo = repo().await;
        let config = config();
        let username = UserName::try_from("dave".to_string()).unwrap();
        let password = RawPassword::from_input(some("pw")).unwrap();
        let hash = config.password_hasher.hash(password.inner()).unwrap();

        repo.insert(&username, &hash).await.unwrap();
        let err = repo.insert(&username, &hash).await.unwrap_err();

        assert_eq!(err.as_validation(), Some(ValidationError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_usernames_are_case_sensitive() {
        let repo = repo().await;
        let use_case = RegisterUseCase::new(repo.clone(), config());

        use_case
            .execute(input(some("Alice"), some("pw"), some("pw")))
            .await
            .unwrap();
        use_case
            .execute(input(some("alice"), some("pw"), some("pw")))
            .await
            .unwrap();

        assert_eq!(player_count(&repo).await, 2);
    }
}

#[cfg(test)]
mod login_tests {
    use super::support::*;
    use crate::application::{
        LoginInput, LoginUseCase, LogoutUseCase, RegisterInput, RegisterUseCase, SessionCookie,
        SessionManager,
    };
    use crate::domain::entity::session::{PLAYER_ID_KEY, PLAYER_USERNAME_KEY};
    use crate::domain::value_object::player_id::PlayerId;
    use crate::error::ValidationError;

    fn login(username: &str, password: &str) -> LoginInput {
        LoginInput {
            username: some(username),
            password: some(password),
        }
    }

    #[tokio::test]
    async fn test_register_then_login_scenario() {
        let repo = repo().await;
        let config = config();
        let register = RegisterUseCase::new(repo.clone(), config.clone());
        let login_use_case = LoginUseCase::new(repo.clone(), config.clone());
        let sessions = SessionManager::new(repo.clone(), config.clone());

        let registered = register
            .execute(RegisterInput {
                username: some("alice"),
                password: some("pw123"),
                confirm_password: some("pw123"),
            })
            .await
            .unwrap();

        let err = register
            .execute(RegisterInput {
                username: some("alice"),
                password: some("pw456"),
                confirm_password: some("pw456"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "username already exists");

        let mut session = sessions.load(None).await.unwrap();
        let err = login_use_case
            .execute(&mut session, login("alice", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "invalid username and/or password");
        assert!(session.identity().is_none());

        let identity = login_use_case
            .execute(&mut session, login("alice", "pw123"))
            .await
            .unwrap();
        assert_eq!(identity.player_id, registered.player_id);
        assert_eq!(
            session.get::<PlayerId>(PLAYER_ID_KEY),
            Some(registered.player_id)
        );
        assert_eq!(
            session.get::<String>(PLAYER_USERNAME_KEY),
            some("alice")
        );

        let SessionCookie::Set(token) = sessions.commit(session).await.unwrap() else {
            panic!("signed-in session must set a cookie");
        };
        let reloaded = sessions.load(Some(&token)).await.unwrap();
        assert_eq!(reloaded.player_username(), some("alice"));
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_the_same() {
        let repo = repo().await;
        let config = config();
        RegisterUseCase::new(repo.clone(), config.clone())
            .execute(RegisterInput {
                username: some("alice"),
                password: some("pw123"),
                confirm_password: some("pw123"),
            })
            .await
            .unwrap();

        let use_case = LoginUseCase::new(repo.clone(), config.clone());
        let sessions = SessionManager::new(repo.clone(), config);

        let mut session = sessions.load(None).await.unwrap();
        let wrong_password = use_case
            .execute(&mut session, login("alice", "nope"))
            .await
            .unwrap_err();
        let unknown_user = use_case
            .execute(&mut session, login("mallory", "pw123"))
            .await
            .unwrap_err();

        assert_eq!(
            wrong_password.as_validation(),
            Some(ValidationError::InvalidCredentials)
        );
        assert_eq!(wrong_password.as_validation(), unknown_user.as_validation());
        assert_eq!(wrong_password.public_message(), unknown_user.public_message());
    }

    #[tokio::test]
    async fn test_password_is_compared_as_typed() {
        let repo = repo().await;
        let config = config();
        RegisterUseCase::new(repo.clone(), config.clone())
            .execute(RegisterInput {
                username: some("bob"),
                password: some("\u{FF21}bc"),
                confirm_password: some("\u{FF21}bc"),
            })
            .await
            .unwrap();
        let use_case = LoginUseCase::new(repo.clone(), config.clone());
        let sessions = SessionManager::new(repo, config);
        let mut session = sessions.load(None).await.unwrap();

        let err = use_case
            .execute(&mut session, login("bob", "Abc"))
            .await
            .unwrap_err();
        assert_eq!(err.as_validation(), Some(ValidationError::InvalidCredentials));

        use_case
            .execute(&mut session, login("bob", "\u{FF21}bc"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_legacy_werkzeug_digest_logs_in() {
        let repo = repo().await;
        let config = config();
        sqlx::query("INSERT INTO Players (username, password) VALUES (?1, ?2)")
            .bind("erin")
            .bind("pbkdf2:sha256:1000$Xo3qM2Ab$46fe028f446d212328b2d42b2d94ffdbc950e1d1c20d62a4f4b509c45d794dd7")
            .execute(repo.pool())
            .await
            .unwrap();
        let use_case = LoginUseCase::new(repo.clone(), config.clone());
        let sessions = SessionManager::new(repo, config);
        let mut session = sessions.load(None).await.unwrap();

        let err = use_case
            .execute(&mut session, login("erin", "pw124"))
            .await
            .unwrap_err();
        assert_eq!(err.as_validation(), Some(ValidationError::InvalidCredentials));

        let identity = use_case
            .execute(&mut session, login("erin", "pw123"))
            .await
            .unwrap();
        assert_eq!(identity.player_username.as_str(), "erin");
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let repo = repo().await;
        let config = config();
        let use_case = LoginUseCase::new(repo.clone(), config.clone());
        let sessions = SessionManager::new(repo, config);
        let mut session = sessions.load(None).await.unwrap();

        let err = use_case
            .execute(&mut session, LoginInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "please provide username");

        let err = use_case
            .execute(
                &mut session,
                LoginInput {
                    username: some("alice"),
                    password: some(""),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "please provide password");
    }

    #[tokio::test]
    async fn test_failed_login_still_signs_out() {
        let repo = repo().await;
        let config = config();
        RegisterUseCase::new(repo.clone(), config.clone())
            .execute(RegisterInput {
                username: some("alice"),
                password: some("pw123"),
                confirm_password: some("pw123"),
            })
            .await
            .unwrap();
        let use_case = LoginUseCase::new(repo.clone(), config.clone());
        let sessions = SessionManager::new(repo.clone(), config);

        let mut session = sessions.load(None).await.unwrap();
        use_case
            .execute(&mut session, login("alice", "pw123"))
            .await
            .unwrap();
        let SessionCookie::Set(token) = sessions.commit(session).await.unwrap() else {
            panic!("expected a session cookie");
        };

        let mut session = sessions.load(Some(&token)).await.unwrap();
        assert!(use_case
            .execute(&mut session, login("alice", "wrong"))
            .await
            .is_err());
        assert!(session.is_empty());
        assert_eq!(sessions.commit(session).await.unwrap(), SessionCookie::Expire);

        let session = sessions.load(Some(&token)).await.unwrap();
        assert!(session.identity().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_identity() {
        let repo = repo().await;
        let config = config();
        RegisterUseCase::new(repo.clone(), config.clone())
            .execute(RegisterInput {
                username: some("alice"),
                password: some("pw123"),
                confirm_password: some("pw123"),
            })
            .await
            .unwrap();
        let sessions = SessionManager::new(repo.clone(), config.clone());

        let mut session = sessions.load(None).await.unwrap();
        LoginUseCase::new(repo.clone(), config)
            .execute(&mut session, login("alice", "pw123"))
            .await
            .unwrap();
        let SessionCookie::Set(token) = sessions.commit(session).await.unwrap() else {
            panic!("expected a session cookie");
        };

        let mut session = sessions.load(Some(&token)).await.unwrap();
        LogoutUseCase::new().execute(&mut session);
        assert_eq!(sessions.commit(session).await.unwrap(), SessionCookie::Expire);

        let session = sessions.load(Some(&token)).await.unwrap();
        assert!(session.identity().is_none());
    }

    #[tokio::test]
    async fn test_logout_without_session_is_a_no_op() {
        let repo = repo().await;
        let sessions = SessionManager::new(repo, config());

        let mut session = sessions.load(None).await.unwrap();
        LogoutUseCase::new().execute(&mut session);

        assert_eq!(sessions.commit(session).await.unwrap(), SessionCookie::Keep);
    }
}

#[cfg(test)]
mod session_tests {
    use std::sync::Arc;

    use chrono::Duration;
    use uuid::Uuid;

    use super::support::*;
    use crate::application::{SessionCookie, SessionManager};
    use crate::domain::entity::session::{SessionRecord, SessionState};
    use crate::domain::repository::SessionRepository;

    #[tokio::test]
    async fn test_set_get_roundtrip_through_storage() {
        let repo = repo().await;
        let sessions = SessionManager::new(repo, config());

        let mut session = sessions.load(None).await.unwrap();
        session.set("answer", 42).unwrap();
        assert_eq!(session.get::<i64>("answer"), Some(42));
        assert_eq!(session.get::<String>("answer"), None);

        let SessionCookie::Set(token) = sessions.commit(session).await.unwrap() else {
            panic!("expected a session cookie");
        };
        let session = sessions.load(Some(&token)).await.unwrap();
        assert_eq!(session.get::<i64>("answer"), Some(42));
    }

    #[tokio::test]
    async fn test_tampered_token_is_no_session() {
        let repo = repo().await;
        let sessions = SessionManager::new(repo, config());

        let mut session = sessions.load(None).await.unwrap();
        session.set("answer", 42).unwrap();
        let SessionCookie::Set(token) = sessions.commit(session).await.unwrap() else {
            panic!("expected a session cookie");
        };

        let (id, sig) = token.split_once('.').unwrap();
        let forged_id = format!("{}.{}", Uuid::new_v4(), sig);
        let bad_sig = format!("{id}.AAAA");

        for token in [forged_id.as_str(), bad_sig.as_str(), "garbage", ""] {
            let session = sessions.load(Some(token)).await.unwrap();
            assert!(session.is_empty(), "token {token:?} must not load state");
        }
    }

    #[tokio::test]
    async fn test_token_from_another_secret_is_rejected() {
        let repo = repo().await;
        let issuer = SessionManager::new(repo.clone(), config());
        let other = SessionManager::new(repo, config());

        let mut session = issuer.load(None).await.unwrap();
        session.set("answer", 42).unwrap();
        let SessionCookie::Set(token) = issuer.commit(session).await.unwrap() else {
            panic!("expected a session cookie");
        };

        assert!(other.load(Some(&token)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_rotates_stored_session() {
        let repo = repo().await;
        let sessions = SessionManager::new(repo.clone(), config());

        let mut session = sessions.load(None).await.unwrap();
        session.set("answer", 42).unwrap();
        let old_id = session.id();
        let SessionCookie::Set(old_token) = sessions.commit(session).await.unwrap() else {
            panic!("expected a session cookie");
        };

        let mut session = sessions.load(Some(&old_token)).await.unwrap();
        assert_eq!(session.id(), old_id);
        session.clear();
        session.clear();
        assert_ne!(session.id(), old_id);
        session.set("answer", 7).unwrap();
        let new_id = session.id();

        let SessionCookie::Set(new_token) = sessions.commit(session).await.unwrap() else {
            panic!("expected a session cookie");
        };
        assert_ne!(new_token, old_token);
        assert!(repo.find_by_id(old_id).await.unwrap().is_none());
        assert!(repo.find_by_id(new_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_empty_session_is_never_stored() {
        let repo = repo().await;
        let sessions = SessionManager::new(repo.clone(), config());

        let mut session = sessions.load(None).await.unwrap();
        let id = session.id();
        session.clear();

        assert_eq!(sessions.commit(session).await.unwrap(), SessionCookie::Keep);
        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_discarded_and_cleaned_up() {
        let repo = repo().await;
        let config = config();
        let sessions = SessionManager::new(repo.clone(), config.clone());

        let mut state = SessionState::default();
        state.insert("answer", serde_json::Value::from(42));

        let expired = SessionRecord::new(Uuid::new_v4(), state.clone(), Some(Duration::hours(-1)));
        let stale = SessionRecord::new(Uuid::new_v4(), state.clone(), Some(Duration::hours(-1)));
        let live = SessionRecord::new(Uuid::new_v4(), state.clone(), Some(Duration::hours(1)));
        let browser = SessionRecord::new(Uuid::new_v4(), state, None);
        for record in [&expired, &stale, &live, &browser] {
            repo.save(record).await.unwrap();
        }

        let token = platform::crypto::sign(&config.session_secret, &expired.session_id.to_string());
        let session = sessions.load(Some(&token)).await.unwrap();
        assert!(session.is_empty());
        assert!(repo.find_by_id(expired.session_id).await.unwrap().is_none());

        assert_eq!(sessions.cleanup_expired().await.unwrap(), 1);
        assert!(repo.find_by_id(stale.session_id).await.unwrap().is_none());
        assert!(repo.find_by_id(live.session_id).await.unwrap().is_some());
        assert!(repo.find_by_id(browser.session_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_session_lifetime_sets_expiry() {
        let repo = repo().await;
        let config = Arc::new(crate::ClassroomConfig {
            session_lifetime: Some(std::time::Duration::from_secs(600)),
            ..(*config()).clone()
        });
        let sessions = SessionManager::new(repo.clone(), config);

        let mut session = sessions.load(None).await.unwrap();
        session.set("answer", 42).unwrap();
        let id = session.id();
        sessions.commit(session).await.unwrap();

        let record = repo.find_by_id(id).await.unwrap().unwrap();
        let expires = record.expires_at_ms.unwrap();
        assert!(expires > record.created_at_ms);
        assert!(expires <= record.created_at_ms + 600_000);
    }
}

#[cfg(test)]
mod shop_tests {
    use super::support::*;
    use crate::application::ShopUseCase;

    #[tokio::test]
    async fn test_empty_catalog() {
        let repo = repo().await;
        let items = ShopUseCase::new(repo).list_items().await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_is_ordered_by_id() {
        let repo = repo().await;
        sqlx::query(
            "INSERT INTO ShopItem (id, name, description, price) VALUES \
             (2, 'Hat', NULL, 5), (1, 'Chair', 'Sturdy', 10)",
        )
        .execute(repo.pool())
        .await
        .unwrap();

        let items = ShopUseCase::new(repo).list_items().await.unwrap();
        let names: Vec<_> = items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["Chair", "Hat"]);
        assert_eq!(items[0].description.as_deref(), Some("Sturdy"));
        assert_eq!(items[1].description, None);
        assert_eq!(items[1].price, 5);
    }
}
