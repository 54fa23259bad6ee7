use crate::chess::{Fen, InvalidFen};
use crate::engine::Suggest;
use crate::game::Store;
use crate::render::{Highlights, Renderer};
use crate::slack::{self, Dispatcher, SlashCommand};
use axum::extract::{rejection::FormRejection, ConnectInfo, Path, RawQuery, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use std::{fmt::Display, net::SocketAddr, sync::Arc};
use tokio::task::spawn_blocking;
use tracing::{error, info, info_span, warn, Instrument};
use url::form_urlencoded;

/// The shared state of the HTTP service.
#[derive(Debug)]
pub struct App<S, E> {
    token: String,
    dispatcher: Dispatcher<S, E>,
    renderer: Renderer,
}

impl<S, E> App<S, E> {
    /// Constructs an [`App`] that only accepts slash commands carrying `token`.
    pub fn new(token: String, dispatcher: Dispatcher<S, E>, renderer: Renderer) -> Self {
        App {
            token,
            dispatcher,
            renderer,
        }
    }
}

type Failure = (StatusCode, String);

/// The squares to highlight, from the first `markSquares` parameter of a query string.
fn mark_squares(query: Option<&str>) -> Highlights {
    let marks = form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .find(|(k, _)| k == "markSquares")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();

    Highlights::parse(&marks)
}

/// Interprets the path of a board image, such as `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR.png`.
fn board_fen(path: &str) -> Result<Fen, InvalidFen> {
    Fen::from_partial(path.strip_suffix(".png").unwrap_or(path))
}

async fn up() -> &'static str {
    "up"
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn command<S, E>(
    State(app): State<Arc<App<S, E>>>,
    form: Result<Form<SlashCommand>, FormRejection>,
) -> Result<Json<slack::Response>, Failure>
where
    S: Store + Send + Sync + 'static,
    E: Suggest + Send + Sync + 'static,
    E::Error: Display,
{
    let Form(cmd) = form.map_err(|e| {
        warn!(error = %e, "failed to decode the slash command");
        (StatusCode::INTERNAL_SERVER_ERROR, e.body_text())
    })?;

    if cmd.token != app.token {
        warn!(user = %cmd.user_id, "invalid token");
        return Err((StatusCode::BAD_REQUEST, "invalid token".into()));
    }

    match app.dispatcher.dispatch(&cmd).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!(error = %e, "failed to access the game");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

async fn board<S, E>(
    State(app): State<Arc<App<S, E>>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, Failure>
where
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    let fen = board_fen(&path).map_err(|e| {
        info!(error = %e, "invalid board notation");
        (StatusCode::NOT_FOUND, format!("could not parse fen: {}", e))
    })?;

    let highlights = mark_squares(query.as_deref());

    let renderer = app.renderer;
    let png = match spawn_blocking(move || renderer.render(&fen, &highlights)).await {
        Ok(Ok(png)) => png,
        Ok(Err(e)) => {
            error!(error = %e, "failed to render the board");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }

        Err(e) => {
            error!(error = %e, "the rendering task failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let headers = [
        (header::CONTENT_TYPE, "image/png"),
        (header::CACHE_CONTROL, "max-age=31536000"),
    ];

    Ok((headers, png))
}

/// Logs every request in a span carrying the remote address, method and path.
async fn trace(req: Request, next: Next) -> Response {
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();

    let span = info_span!(
        "request",
        %remote,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let response = next.run(req).await;
        info!(status = %response.status(), "served");
        response
    }
    .instrument(span)
    .await
}

/// The routes of the HTTP service.
pub fn router<S, E>(app: App<S, E>) -> Router
where
    S: Store + Send + Sync + 'static,
    E: Suggest + Send + Sync + 'static,
    E::Error: Display,
{
    Router::new()
        .route("/", get(up).fallback(not_found))
        .route("/command", post(command::<S, E>).fallback(not_found))
        .route("/board/{*path}", get(board::<S, E>).fallback(not_found))
        .fallback(not_found)
        .layer(middleware::from_fn(trace))
        .with_state(Arc::new(app))
}
