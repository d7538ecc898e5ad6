//! HTTP surface over a single shared [`EditSession`].

use crate::{
    error::RestyleError,
    gemini::GeminiClient,
    models::{ImageMime, Influence, Operation, PromptParams, Quality, SourceImage, StyleOption},
    prompt::compose_prompt,
    session::{EditSession, RequestState},
};
use actix_web::{
    http::StatusCode, middleware::Logger, web, App, HttpResponse, HttpServer, ResponseError,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

pub struct AppState {
    client: GeminiClient,
    session: Mutex<EditSession>,
}

impl AppState {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            session: Mutex::new(EditSession::new()),
        }
    }
}

impl ResponseError for RestyleError {
    fn status_code(&self) -> StatusCode {
        match self {
            RestyleError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RestyleError::RequestInFlight => StatusCode::CONFLICT,
            RestyleError::NoImageInResponse | RestyleError::GenerationFailed(_) => {
                StatusCode::BAD_GATEWAY
            }
            RestyleError::ConfigurationMissing(_) | RestyleError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Remote and internal details stay in the log.
        let message = match self {
            RestyleError::InvalidInput(msg) => msg.clone(),
            RestyleError::RequestInFlight => {
                "Please wait for the current request to finish.".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// Base64, optionally as a `data:` URL.
    pub data: String,
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
pub struct TransformRequest {
    /// Catalog style id; ignored when `prompt` is given.
    pub style_id: Option<String>,
    pub prompt: Option<String>,
    #[serde(default)]
    pub influence: Influence,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub scene: String,
    /// Raw selector; only `"high"` selects HD.
    #[serde(default)]
    pub quality: String,
}

impl TransformRequest {
    fn to_params(&self) -> Result<PromptParams, RestyleError> {
        let base_style = match (&self.prompt, &self.style_id) {
            (Some(prompt), _) if !prompt.trim().is_empty() => prompt.clone(),
            (_, Some(id)) => StyleOption::by_id(id)
                .map(|style| style.prompt_template.to_string())
                .ok_or_else(|| RestyleError::InvalidInput(format!("Unknown style '{}'", id)))?,
            _ => {
                return Err(RestyleError::InvalidInput(
                    "Choose a style or enter a prompt.".into(),
                ))
            }
        };

        Ok(PromptParams {
            base_style,
            influence: self.influence,
            character: self.character.clone(),
            scene: self.scene.clone(),
            quality: Quality::parse(&self.quality),
        })
    }
}

#[derive(Debug, Serialize)]
struct ImageBody {
    mime_type: String,
    data_url: String,
}

#[derive(Debug, Serialize)]
struct OperationBody {
    state: RequestState,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<ImageBody>,
}

fn source_body(image: &SourceImage) -> ImageBody {
    ImageBody {
        mime_type: image.mime().to_string(),
        data_url: image.to_data_url(),
    }
}

async fn list_styles() -> HttpResponse {
    HttpResponse::Ok().json(StyleOption::all())
}

async fn get_state(data: web::Data<AppState>) -> HttpResponse {
    let session = data.session.lock().await;
    HttpResponse::Ok().json(json!({
        "state": session.state(),
        "has_image": session.current().is_some(),
        "has_result": session.result().is_some(),
    }))
}

async fn upload_image(
    data: web::Data<AppState>,
    body: web::Json<UploadRequest>,
) -> Result<HttpResponse, RestyleError> {
    let image = SourceImage::from_base64(&body.data, &body.mime_type)?;
    let mut session = data.session.lock().await;
    session.load_image(image)?;
    Ok(HttpResponse::Ok().json(json!({ "state": session.state() })))
}

async fn get_image(data: web::Data<AppState>) -> Result<HttpResponse, RestyleError> {
    let session = data.session.lock().await;
    let image = session
        .current()
        .ok_or_else(|| RestyleError::InvalidInput("No image has been uploaded.".into()))?;
    Ok(HttpResponse::Ok().json(source_body(image)))
}

async fn get_result(data: web::Data<AppState>) -> Result<HttpResponse, RestyleError> {
    let session = data.session.lock().await;
    let result = session
        .result()
        .ok_or_else(|| RestyleError::InvalidInput("There is no generated image yet.".into()))?;
    Ok(HttpResponse::Ok().json(ImageBody {
        mime_type: result.mime_type.clone(),
        data_url: result.to_data_url(),
    }))
}

async fn promote_result(data: web::Data<AppState>) -> Result<HttpResponse, RestyleError> {
    let mut session = data.session.lock().await;
    session.promote_result()?;
    Ok(HttpResponse::Ok().json(json!({ "state": session.state() })))
}

/// Fails the in-flight call if the handler is dropped before it settles,
/// e.g. when the client disconnects during a slow model call.
struct InFlightGuard {
    data: Option<web::Data<AppState>>,
    operation: Operation,
}

impl InFlightGuard {
    fn new(data: &web::Data<AppState>, operation: Operation) -> Self {
        Self {
            data: Some(data.clone()),
            operation,
        }
    }

    fn disarm(mut self) {
        self.data = None;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let Some(data) = self.data.take() else {
            return;
        };
        let operation = self.operation;
        let outcome = Err(RestyleError::GenerationFailed(format!(
            "{} request dropped before the model answered",
            operation
        )));

        if let Ok(mut session) = data.session.try_lock() {
            session.complete(operation, outcome);
            return;
        }
        actix_web::rt::spawn(async move {
            data.session.lock().await.complete(operation, outcome);
        });
    }
}

async fn transform(
    data: web::Data<AppState>,
    body: web::Json<TransformRequest>,
) -> Result<HttpResponse, RestyleError> {
    let params = body.to_params()?;
    let prompt = compose_prompt(&params);

    // The lock is released while the model works; `InFlight` keeps other
    // requests out.
    let image = data.session.lock().await.begin(Operation::Transform)?;
    let guard = InFlightGuard::new(&data, Operation::Transform);
    let outcome = data.client.image().transform_image(&image, &prompt).await;

    let mut session = data.session.lock().await;
    guard.disarm();
    let state = session.complete(Operation::Transform, outcome).clone();
    let image = session.result().map(|result| ImageBody {
        mime_type: result.mime_type.clone(),
        data_url: result.to_data_url(),
    });
    Ok(operation_response(state, image))
}

async fn remove_background(data: web::Data<AppState>) -> Result<HttpResponse, RestyleError> {
    let image = data
        .session
        .lock()
        .await
        .begin(Operation::RemoveBackground)?;
    let guard = InFlightGuard::new(&data, Operation::RemoveBackground);
    let outcome = data.client.image().remove_background(&image).await;

    let mut session = data.session.lock().await;
    guard.disarm();
    let state = session.complete(Operation::RemoveBackground, outcome).clone();
    let image = session.current().map(source_body);
    Ok(operation_response(state, image))
}

fn operation_response(state: RequestState, image: Option<ImageBody>) -> HttpResponse {
    match state {
        RequestState::Succeeded { .. } => HttpResponse::Ok().json(OperationBody {
            state,
            image,
        }),
        _ => HttpResponse::BadGateway().json(OperationBody { state, image: None }),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/styles", web::get().to(list_styles))
            .route("/state", web::get().to(get_state))
            .route("/image", web::post().to(upload_image))
            .route("/image", web::get().to(get_image))
            .route("/result", web::get().to(get_result))
            .route("/result/promote", web::post().to(promote_result))
            .route("/transform", web::post().to(transform))
            .route("/remove-background", web::post().to(remove_background)),
    );
}

pub async fn run(client: GeminiClient, port: u16) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(client));
    log::info!("🌐 Listening on http://127.0.0.1:{}", port);
    log::info!(
        "   Accepting {} and {} uploads",
        ImageMime::Jpeg,
        ImageMime::Png
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(20 * 1024 * 1024))
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}
