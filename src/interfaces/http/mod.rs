mod form;

pub use form::{parse_flag, CleanForm, FILE_FIELD};

use std::sync::{Arc, Mutex, PoisonError};

use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, CONTENT_DISPOSITION};
use actix_web::http::StatusCode;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::application::CleanTableUseCase;
use crate::domain::error::AppError;
use crate::domain::table::{CleanError, CleanedFile, PipelineStage};
use crate::infrastructure::config::ServerConfig;

/// Entries kept for `GET /api/logs`
const MAX_LOG_ENTRIES: usize = 100;

/// Response header carrying the JSON `CleanReport`
pub const REPORT_HEADER: &str = "X-Clean-Report";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub type LogBuffer = Arc<Mutex<Vec<LogEntry>>>;

pub struct HttpState {
    pub engine: CleanTableUseCase,
    pub config: ServerConfig,
    pub logs: LogBuffer,
}

impl HttpState {
    pub fn new(config: ServerConfig, logs: LogBuffer) -> Self {
        Self {
            engine: CleanTableUseCase::new(),
            config,
            logs,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct HeadersResponse {
    pub headers: Vec<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[post("/clean")]
async fn clean(data: web::Data<HttpState>, payload: Multipart) -> HttpResponse {
    let mut form = match CleanForm::read(payload, data.config.max_upload_bytes).await {
        Ok(form) => form,
        Err(e) => return failure(&data.logs, CleanError::new(PipelineStage::Receive, e)),
    };
    let request = form
        .take_upload()
        .and_then(|upload| form.options().map(|options| (upload, options)));
    let (upload, options) = match request {
        Ok(request) => request,
        Err(e) => return failure(&data.logs, CleanError::new(PipelineStage::Receive, e)),
    };

    add_log(
        &data.logs,
        "INFO",
        "Cleaner",
        &format!(
            "Cleaning {} ({} bytes, {} columns selected, output={})",
            upload.file_name.as_deref().unwrap_or("file"),
            upload.bytes.len(),
            options.columns.len(),
            options.output_format
        ),
    );

    let engine = data.engine;
    match web::block(move || engine.execute(&upload, &options)).await {
        Ok(Ok(cleaned)) => {
            add_log(
                &data.logs,
                "INFO",
                "Cleaner",
                &format!("Cleaned {}: {}", cleaned.file_name, cleaned.report.summary()),
            );
            cleaned_response(cleaned)
        }
        Ok(Err(err)) => failure(&data.logs, err),
        Err(e) => failure(
            &data.logs,
            CleanError::new(
                PipelineStage::Receive,
                AppError::Internal(format!("Cleaning task was aborted: {}", e)),
            ),
        ),
    }
}

#[post("/headers")]
async fn headers(data: web::Data<HttpState>, payload: Multipart) -> HttpResponse {
    let upload = match CleanForm::read(payload, data.config.max_upload_bytes)
        .await
        .and_then(|mut form| form.take_upload())
    {
        Ok(upload) => upload,
        Err(e) => return failure(&data.logs, CleanError::new(PipelineStage::Receive, e)),
    };

    let engine = data.engine;
    match web::block(move || engine.read_headers(&upload)).await {
        Ok(Ok(headers)) => HttpResponse::Ok().json(HeadersResponse { headers }),
        Ok(Err(err)) => failure(&data.logs, err),
        Err(e) => failure(
            &data.logs,
            CleanError::new(
                PipelineStage::Receive,
                AppError::Internal(format!("Header task was aborted: {}", e)),
            ),
        ),
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse { status: "ok" })
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data.logs.lock().unwrap_or_else(PoisonError::into_inner);
    HttpResponse::Ok().json(&*logs)
}

fn cleaned_response(cleaned: CleanedFile) -> HttpResponse {
    let report = serde_json::to_string(&cleaned.report).unwrap_or_default();
    HttpResponse::Ok()
        .content_type(cleaned.content_type())
        .insert_header((
            CONTENT_DISPOSITION,
            ContentDisposition::attachment(cleaned.file_name.clone()),
        ))
        .insert_header((REPORT_HEADER, report))
        .body(cleaned.bytes)
}

fn failure(logs: &Mutex<Vec<LogEntry>>, err: CleanError) -> HttpResponse {
    let status = status_for(&err.error);
    let level = if status.is_server_error() { "ERROR" } else { "WARN" };
    add_log(logs, level, "Cleaner", &err.to_string());

    HttpResponse::build(status)
        .content_type("text/plain; charset=utf-8")
        .body(err.to_string())
}

pub fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::FormatError(_) | AppError::ValidationError(_) | AppError::TransportError(_) => {
            StatusCode::BAD_REQUEST
        }
        AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        AppError::EncodingError(_) | AppError::Internal(_) | AppError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    match level {
        "ERROR" => error!(source, "{}", message),
        "WARN" => warn!(source, "{}", message),
        _ => info!(source, "{}", message),
    }

    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap_or_else(PoisonError::into_inner);
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

/// Mount every endpoint under `/api`
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(clean)
            .service(headers)
            .service(health)
            .service(get_logs),
    );
}

pub fn start_server(config: ServerConfig, logs: LogBuffer) -> std::io::Result<Server> {
    let address = (config.host.clone(), config.port);
    let workers = config.workers;
    let state = web::Data::new(HttpState::new(config, logs.clone()));

    let mut server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Browser front-ends on any local port

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(routes)
    });
    if workers > 0 {
        server = server.workers(workers);
    }
    let server = server.bind(address.clone())?.run();

    add_log(
        &logs,
        "INFO",
        "HttpApi",
        &format!("Listening on http://{}:{}", address.0, address.1),
    );
    Ok(server)
}
