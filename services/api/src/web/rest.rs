//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{generation_task::spawn_generation, protocol::ServerMessage, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};
use tutor_core::{ShellError, Tab, GENERATION_FAILED_MESSAGE};
use utoipa::{OpenApi, ToSchema};

type HandlerError = (StatusCode, String);

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_shell_handler,
        create_module_handler,
        clear_module_handler,
        get_view_handler,
        select_view_handler,
        carousel_next_handler,
        carousel_previous_handler,
        carousel_slide_handler,
        flashcard_flip_handler,
        flashcard_reveal_handler,
        scenario_next_handler,
        scenario_previous_handler,
    ),
    components(
        schemas(CreateModuleRequest, SelectViewRequest)
    ),
    tags(
        (name = "Web3 Tutor API", description = "Generate and browse learning modules for Web3 topics.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Payload Structs
//=========================================================================================

/// The request payload for generating a new learning module.
#[derive(Deserialize, ToSchema)]
pub struct CreateModuleRequest {
    /// Free-text topic, 3 to 100 characters after trimming.
    pub topic: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SelectViewRequest {
    #[schema(value_type = String, example = "Glossary")]
    pub view: Tab,
}

fn shell_error(e: ShellError) -> HandlerError {
    let status = match e {
        ShellError::Input(_) => StatusCode::BAD_REQUEST,
        ShellError::Busy => StatusCode::CONFLICT,
        ShellError::NoModule | ShellError::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
    };
    (status, e.to_string())
}

//=========================================================================================
// Shell and Module Handlers
//=========================================================================================

/// Current shell state: loading flag, status line, error and active view.
#[utoipa::path(
    get,
    path = "/shell",
    responses((status = 200, description = "Shell snapshot"))
)]
pub async fn get_shell_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(app_state.shell.lock().await.snapshot())
}

/// Generate a learning module for a topic.
///
/// Blocks until the generation settles. Progress is pushed over `/ws`.
#[utoipa::path(
    post,
    path = "/modules",
    request_body = CreateModuleRequest,
    responses(
        (status = 201, description = "Module generated and stored"),
        (status = 400, description = "Topic is empty, too short or too long"),
        (status = 409, description = "A generation is already pending"),
        (status = 502, description = "The generative service failed or returned unusable content")
    )
)]
pub async fn create_module_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<CreateModuleRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let topic = app_state
        .shell
        .lock()
        .await
        .begin_request(&req.topic)
        .map_err(shell_error)?;

    let module = spawn_generation(app_state.clone(), topic)
        .await
        .map_err(|e| {
            error!("Generation task failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Generation task failed".to_string(),
            )
        })?;

    match module {
        Some(module) => Ok((StatusCode::CREATED, Json(module))),
        None => Err((StatusCode::BAD_GATEWAY, GENERATION_FAILED_MESSAGE.to_string())),
    }
}

/// Drop the current module to analyze a new topic.
#[utoipa::path(
    delete,
    path = "/modules/current",
    responses(
        (status = 204, description = "Module cleared"),
        (status = 409, description = "A generation is pending")
    )
)]
pub async fn clear_module_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<StatusCode, HandlerError> {
    app_state.shell.lock().await.reset().map_err(shell_error)?;
    app_state.publish(ServerMessage::ModuleCleared);
    info!("Current module cleared.");
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// View Handlers
//=========================================================================================

/// Render the active view over the current module.
#[utoipa::path(
    get,
    path = "/view",
    responses(
        (status = 200, description = "Rendered view"),
        (status = 404, description = "No module generated yet")
    )
)]
pub async fn get_view_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let view = app_state.shell.lock().await.render_active().map_err(shell_error)?;
    Ok(Json(view))
}

/// Select a view (Overview, Carousels, Flashcards, Scenarios, Glossary) and render it.
#[utoipa::path(
    put,
    path = "/view",
    request_body = SelectViewRequest,
    responses(
        (status = 200, description = "Rendered view"),
        (status = 404, description = "No module generated yet")
    )
)]
pub async fn select_view_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<SelectViewRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let view = app_state
        .shell
        .lock()
        .await
        .select_view(req.view)
        .map_err(shell_error)?;
    Ok(Json(view))
}

//=========================================================================================
// Component Handlers
//=========================================================================================

#[utoipa::path(
    post,
    path = "/carousels/{index}/next",
    params(("index" = usize, Path, description = "Carousel index")),
    responses((status = 200, description = "Current frame"), (status = 404, description = "Unknown carousel"))
)]
pub async fn carousel_next_handler(
    State(app_state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, HandlerError> {
    let frame = app_state.shell.lock().await.carousel_next(index).map_err(shell_error)?;
    Ok(Json(frame))
}

#[utoipa::path(
    post,
    path = "/carousels/{index}/previous",
    params(("index" = usize, Path, description = "Carousel index")),
    responses((status = 200, description = "Current frame"), (status = 404, description = "Unknown carousel"))
)]
pub async fn carousel_previous_handler(
    State(app_state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, HandlerError> {
    let frame = app_state
        .shell
        .lock()
        .await
        .carousel_previous(index)
        .map_err(shell_error)?;
    Ok(Json(frame))
}

#[utoipa::path(
    post,
    path = "/carousels/{index}/slides/{slide}",
    params(
        ("index" = usize, Path, description = "Carousel index"),
        ("slide" = usize, Path, description = "Slide to jump to")
    ),
    responses((status = 200, description = "Current frame"), (status = 404, description = "Unknown carousel or slide"))
)]
pub async fn carousel_slide_handler(
    State(app_state): State<Arc<AppState>>,
    Path((index, slide)): Path<(usize, usize)>,
) -> Result<impl IntoResponse, HandlerError> {
    let frame = app_state
        .shell
        .lock()
        .await
        .carousel_go_to(index, slide)
        .map_err(shell_error)?;
    Ok(Json(frame))
}

#[utoipa::path(
    post,
    path = "/flashcards/{index}/flip",
    params(("index" = usize, Path, description = "Flashcard index")),
    responses((status = 200, description = "Card face"), (status = 404, description = "Unknown flashcard"))
)]
pub async fn flashcard_flip_handler(
    State(app_state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, HandlerError> {
    let face = app_state.shell.lock().await.flashcard_flip(index).map_err(shell_error)?;
    Ok(Json(face))
}

/// Reveal the next, deeper explanation level of a flipped card.
#[utoipa::path(
    post,
    path = "/flashcards/{index}/reveal",
    params(("index" = usize, Path, description = "Flashcard index")),
    responses((status = 200, description = "Card face"), (status = 404, description = "Unknown flashcard"))
)]
pub async fn flashcard_reveal_handler(
    State(app_state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, HandlerError> {
    let face = app_state
        .shell
        .lock()
        .await
        .flashcard_reveal(index)
        .map_err(shell_error)?;
    Ok(Json(face))
}

#[utoipa::path(
    post,
    path = "/scenarios/{index}/next",
    params(("index" = usize, Path, description = "Scenario index")),
    responses((status = 200, description = "Current step"), (status = 404, description = "Unknown scenario"))
)]
pub async fn scenario_next_handler(
    State(app_state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, HandlerError> {
    let frame = app_state.shell.lock().await.scenario_next(index).map_err(shell_error)?;
    Ok(Json(frame))
}

#[utoipa::path(
    post,
    path = "/scenarios/{index}/previous",
    params(("index" = usize, Path, description = "Scenario index")),
    responses((status = 200, description = "Current step"), (status = 404, description = "Unknown scenario"))
)]
pub async fn scenario_previous_handler(
    State(app_state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, HandlerError> {
    let frame = app_state
        .shell
        .lock()
        .await
        .scenario_previous(index)
        .map_err(shell_error)?;
    Ok(Json(frame))
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::web::{create_router, protocol::ServerMessage, state::AppState};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tower::util::ServiceExt;
    use tutor_core::{ContentGenerator, PortError, PortResult, GENERATION_FAILED_MESSAGE};

    const UNISWAP: &str = include_str!("../../../../crates/tutor_core/fixtures/uniswap_v3.json");

    struct FakeGenerator {
        reply: Result<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContentGenerator for FakeGenerator {
        async fn generate(&self, _prompt: &str, _schema: &Value) -> PortResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .map(str::to_string)
                .map_err(|e| PortError::Unexpected(e.to_string()))
        }
    }

    /// Panics on its first call, then replies with the fixture.
    struct PanicOnceGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContentGenerator for PanicOnceGenerator {
        async fn generate(&self, _prompt: &str, _schema: &Value) -> PortResult<String> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("generator crashed");
            }
            Ok(UNISWAP.to_string())
        }
    }

    fn state_with(generator: Arc<dyn ContentGenerator>) -> Arc<AppState> {
        let config = Config::from_lookup(|key| {
            (key == "OPENAI_API_KEY").then(|| "sk-test".to_string())
        })
        .unwrap();
        Arc::new(AppState::new(Arc::new(config), generator))
    }

    fn test_state(reply: Result<&'static str, &'static str>) -> (Arc<AppState>, Arc<FakeGenerator>) {
        let fake = Arc::new(FakeGenerator {
            reply,
            calls: AtomicUsize::new(0),
        });
        (state_with(fake.clone()), fake)
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn generate(router: &Router, topic: &str) -> (StatusCode, Vec<u8>) {
        send(router, Method::POST, "/modules", Some(json!({ "topic": topic }))).await
    }

    #[tokio::test]
    async fn create_module_stores_document() {
        let (state, fake) = test_state(Ok(UNISWAP));
        let router = create_router(state.clone());

        let (status, body) = generate(&router, "  Uniswap v3 ").await;
        assert_eq!(status, StatusCode::CREATED);
        let module: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(module["topic"], "Uniswap v3");
        assert_eq!(module["document"]["projectName"], "Uniswap v3");
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);

        let (status, body) = send(&router, Method::GET, "/shell", None).await;
        assert_eq!(status, StatusCode::OK);
        let shell: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(shell["loading"], false);
        assert_eq!(shell["project_name"], "Uniswap v3");
        assert_eq!(shell["active_view"], "Overview");
    }

    #[tokio::test]
    async fn invalid_topics_never_reach_the_service() {
        let (state, fake) = test_state(Ok(UNISWAP));
        let router = create_router(state);

        for (topic, fragment) in [("", "Please enter"), ("ab", "too short")] {
            let (status, body) = generate(&router, topic).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(String::from_utf8(body).unwrap().contains(fragment));
        }
        let (status, body) = generate(&router, &"z".repeat(101)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8(body).unwrap().contains("too long"));

        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_reply_yields_static_message() {
        let (state, _) = test_state(Ok("<html>rate limited</html>"));
        let router = create_router(state);

        let (status, body) = generate(&router, "Solana").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(String::from_utf8(body).unwrap(), GENERATION_FAILED_MESSAGE);

        let (status, _) = send(&router, Method::GET, "/view", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn service_failure_yields_same_message() {
        let (state, _) = test_state(Err("connection refused"));
        let router = create_router(state);

        let (status, body) = generate(&router, "Solana").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(String::from_utf8(body).unwrap(), GENERATION_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn pending_generation_refuses_another() {
        let (state, fake) = test_state(Ok(UNISWAP));
        state.shell.lock().await.begin_request("Ethereum").unwrap();
        let router = create_router(state);

        let (status, _) = generate(&router, "Solana").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn view_switching_is_idempotent() {
        let (state, _) = test_state(Ok(UNISWAP));
        let router = create_router(state);
        generate(&router, "Uniswap v3").await;

        let (_, first) = send(&router, Method::PUT, "/view", Some(json!({ "view": "Overview" }))).await;
        let (status, glossary) =
            send(&router, Method::PUT, "/view", Some(json!({ "view": "Glossary" }))).await;
        assert_eq!(status, StatusCode::OK);
        let glossary: Value = serde_json::from_slice(&glossary).unwrap();
        assert_eq!(glossary["view"], "glossary");
        let (_, again) = send(&router, Method::PUT, "/view", Some(json!({ "view": "Overview" }))).await;

        assert_eq!(first, again);
    }

    #[tokio::test]
    async fn component_navigation() {
        let (state, _) = test_state(Ok(UNISWAP));
        let router = create_router(state);
        generate(&router, "Uniswap v3").await;

        let (status, body) = send(&router, Method::POST, "/carousels/0/previous", None).await;
        assert_eq!(status, StatusCode::OK);
        let frame: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(frame["position"], "5 / 5");
        assert_eq!(frame["kind"], "usecase");

        let (_, body) = send(&router, Method::POST, "/carousels/0/slides/3", None).await;
        let frame: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(frame["code"]["language"], "solidity");

        send(&router, Method::POST, "/flashcards/1/flip", None).await;
        let (_, body) = send(&router, Method::POST, "/flashcards/1/reveal", None).await;
        let face: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(face["explanations"].as_array().unwrap().len(), 2);
        assert_eq!(face["icon"], "document");

        let (_, body) = send(&router, Method::POST, "/scenarios/0/next", None).await;
        let step: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(step["heading"], "Step 2 of 3: Mint the position");

        let (status, _) = send(&router, Method::POST, "/scenarios/4/next", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn clearing_drops_the_module() {
        let (state, _) = test_state(Ok(UNISWAP));
        let router = create_router(state);
        generate(&router, "Uniswap v3").await;

        let (status, _) = send(&router, Method::DELETE, "/modules/current", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&router, Method::GET, "/view", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn crashed_generation_settles_the_shell() {
        let state = state_with(Arc::new(PanicOnceGenerator {
            calls: AtomicUsize::new(0),
        }));
        let mut events = state.events.subscribe();
        let router = create_router(state);

        let (status, body) = generate(&router, "Solana").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(String::from_utf8(body).unwrap(), GENERATION_FAILED_MESSAGE);

        let (_, body) = send(&router, Method::GET, "/shell", None).await;
        let shell: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(shell["loading"], false);
        assert_eq!(shell["error"], GENERATION_FAILED_MESSAGE);

        let mut failed = false;
        while let Ok(event) = events.try_recv() {
            failed |= matches!(event, ServerMessage::GenerationFailed { .. });
        }
        assert!(failed);

        let (status, _) = generate(&router, "Solana").await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn clearing_is_refused_while_pending() {
        let (state, _) = test_state(Ok(UNISWAP));
        let router = create_router(state.clone());
        generate(&router, "Uniswap v3").await;

        let topic = state.shell.lock().await.begin_request("Solana").unwrap();
        let (status, _) = send(&router, Method::DELETE, "/modules/current", None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let document = state.pipeline.generate(&topic).await.unwrap();
        state.shell.lock().await.complete(topic, Ok(document));
        let (status, _) = send(&router, Method::GET, "/view", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&router, Method::DELETE, "/modules/current", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
