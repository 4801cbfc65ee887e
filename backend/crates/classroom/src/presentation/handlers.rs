//! HTTP Handlers
//!
//! Each handler loads the session from its cookie, runs one flow with the
//! session passed explicitly, then commits the session. The commit happens
//! whether the flow succeeded or not.

use askama::Template;
use axum::Form;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use std::sync::Arc;

use platform::cookie::extract_cookie;

use crate::application::config::ClassroomConfig;
use crate::application::{
    LoginUseCase, LogoutUseCase, Notice, RegisterUseCase, Session, SessionCookie, SessionManager,
    ShopUseCase,
};
use crate::domain::repository::{PlayerRepository, SessionRepository, ShopRepository};
use crate::error::{ClassroomError, ClassroomResult};
use crate::presentation::dto::{LoginForm, RegisterForm};
use crate::presentation::views::{
    AvatarShopView, ErrorView, IndexView, LoginView, RegisterView, ShopView,
};

/// Shared state for classroom handlers
#[derive(Clone)]
pub struct ClassroomAppState<R>
where
    R: PlayerRepository + ShopRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<ClassroomConfig>,
}

impl<R> ClassroomAppState<R>
where
    R: PlayerRepository + ShopRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    fn sessions(&self) -> SessionManager<R> {
        SessionManager::new(self.repo.clone(), self.config.clone())
    }

    async fn load_session(&self, headers: &HeaderMap) -> ClassroomResult<Session> {
        let token = extract_cookie(headers, &self.config.session_cookie_name);
        self.sessions().load(token.as_deref()).await
    }

    /// Commit the session and attach its cookie to the response
    ///
    /// A failed flow is rendered first, so the error page still gets the
    /// session's cookie instruction.
    async fn finish(&self, session: Session, outcome: ClassroomResult<Response>) -> Response {
        let player_username = session.player_username();
        let mut response = outcome.unwrap_or_else(|e| error_page(e, player_username));

        match self.sessions().commit(session).await {
            Ok(cookie) => {
                self.apply_session_cookie(cookie, response.headers_mut());
                response
            }
            Err(e) => e.into_response(),
        }
    }

    fn apply_session_cookie(&self, cookie: SessionCookie, headers: &mut HeaderMap) {
        let cookie_config = self.config.session_cookie();
        let value = match cookie {
            SessionCookie::Keep => return,
            SessionCookie::Set(token) => cookie_config.set_header(&token),
            SessionCookie::Expire => cookie_config.delete_header(),
        };
        append_set_cookie(headers, value);
    }

    /// Message of the pending notice; unknown codes are dropped
    fn notice(&self, headers: &HeaderMap) -> Option<String> {
        let code = extract_cookie(headers, &self.config.notice_cookie_name)?;
        Notice::from_code(&code).map(|notice| notice.message().to_string())
    }

    /// Expire the notice cookie once a page has shown it
    fn consume_notice(
        &self,
        headers: &HeaderMap,
        outcome: ClassroomResult<Response>,
    ) -> ClassroomResult<Response> {
        let mut response = outcome?;
        if extract_cookie(headers, &self.config.notice_cookie_name).is_some() {
            append_set_cookie(
                response.headers_mut(),
                self.config.notice_cookie().delete_header(),
            );
        }
        Ok(response)
    }
}

fn append_set_cookie(headers: &mut HeaderMap, value: Option<HeaderValue>) {
    match value {
        Some(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        None => tracing::error!("Cookie value is not a valid header"),
    }
}

/// Error view for a failed flow
///
/// Validation failures keep the navigation of the current player; anything
/// else goes through the generic error response.
fn error_page(error: ClassroomError, player_username: Option<String>) -> Response {
    if error.as_validation().is_none() {
        return error.into_response();
    }

    error.log();
    let view = ErrorView::new(error.public_message()).with_player(player_username);
    match view.render_html() {
        Ok(html) => (error.status_code(), Html(html)).into_response(),
        Err(e) => ClassroomError::from(e).into_response(),
    }
}

/// A body that cannot be read as a form counts as an empty form
fn form_or_empty<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable form body, treating it as empty");
            T::default()
        }
    }
}

fn page(view: impl Template) -> ClassroomResult<Response> {
    Ok(Html(view.render()?).into_response())
}

// ============================================================================
// Home
// ============================================================================

/// GET /
pub async fn index<R>(State(state): State<ClassroomAppState<R>>, headers: HeaderMap) -> Response
where
    R: PlayerRepository + ShopRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let session = match state.load_session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    let outcome = page(IndexView {
        player_username: session.player_username(),
        notice: state.notice(&headers),
    });
    let outcome = state.consume_notice(&headers, outcome);

    state.finish(session, outcome).await
}

// ============================================================================
// Register
// ============================================================================

/// GET /register
pub async fn register_page<R>(
    State(state): State<ClassroomAppState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: PlayerRepository + ShopRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let session = match state.load_session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    let outcome = page(RegisterView {
        player_username: session.player_username(),
    });

    state.finish(session, outcome).await
}

/// POST /register
pub async fn register<R>(
    State(state): State<ClassroomAppState<R>>,
    headers: HeaderMap,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Response
where
    R: PlayerRepository + ShopRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let session = match state.load_session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let form = form_or_empty(form);
    let outcome = match use_case.execute(form.into()).await {
        Ok(output) => {
            let mut response = Redirect::to("/login").into_response();
            append_set_cookie(
                response.headers_mut(),
                state.config.notice_cookie().set_header(output.notice.code()),
            );
            Ok(response)
        }
        Err(e) => Err(e),
    };

    state.finish(session, outcome).await
}

// ============================================================================
// Login
// ============================================================================

/// GET /login
///
/// Viewing the form already signs the player out.
pub async fn login_page<R>(
    State(state): State<ClassroomAppState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: PlayerRepository + ShopRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let mut session = match state.load_session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());
    use_case.begin(&mut session);

    let outcome = page(LoginView {
        player_username: session.player_username(),
        notice: state.notice(&headers),
    });
    let outcome = state.consume_notice(&headers, outcome);

    state.finish(session, outcome).await
}

/// POST /login
pub async fn login<R>(
    State(state): State<ClassroomAppState<R>>,
    headers: HeaderMap,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response
where
    R: PlayerRepository + ShopRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let mut session = match state.load_session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());

    let form = form_or_empty(form);
    let outcome = use_case
        .execute(&mut session, form.into())
        .await
        .map(|_| Redirect::to("/").into_response());

    state.finish(session, outcome).await
}

// ============================================================================
// Logout
// ============================================================================

/// GET /logout
pub async fn logout<R>(State(state): State<ClassroomAppState<R>>, headers: HeaderMap) -> Response
where
    R: PlayerRepository + ShopRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let mut session = match state.load_session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    LogoutUseCase::new().execute(&mut session);

    state
        .finish(session, Ok(Redirect::to("/").into_response()))
        .await
}

// ============================================================================
// Shop
// ============================================================================

/// GET /shop
pub async fn shop<R>(State(state): State<ClassroomAppState<R>>, headers: HeaderMap) -> Response
where
    R: PlayerRepository + ShopRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let session = match state.load_session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    let use_case = ShopUseCase::new(state.repo.clone());

    let outcome = match use_case.list_items().await {
        Ok(items) => page(ShopView {
            player_username: session.player_username(),
            items,
        }),
        Err(e) => Err(e),
    };

    state.finish(session, outcome).await
}

/// GET /avatarshop
pub async fn avatar_shop<R>(
    State(state): State<ClassroomAppState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: PlayerRepository + ShopRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let session = match state.load_session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    let outcome = page(AvatarShopView::new(session.player_username()));

    state.finish(session, outcome).await
}
