use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::cookie::Key;
use actix_web::http::header::{
    self, ContentDisposition, ContentType, DispositionParam, DispositionType,
};
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::{FlashMessagesFramework, IncomingFlashMessages};
use chrono::Local;
use futures::TryStreamExt;
use serde::Deserialize;
use sha2::{Digest, Sha512};
use shared::{DiseaseLabel, PredictionResult};
use std::path::Path;
use std::str::FromStr;
use url::form_urlencoded;

use crate::error::AppError;
use crate::report::{ReportDocument, REPORT_FILENAME};
use crate::state::AppState;
use crate::storage::upload_store::UPLOADS_URL_PREFIX;
use crate::storage::{allowed_file, sanitize_filename, UploadError, UploadStore};
use crate::views::{self, IndexContext, ResultView};

const FILE_FIELD: &str = "file";

pub fn configure_routes(cfg: &mut web::ServiceConfig, upload_dir: &Path) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/upload").route(web::post().to(upload)))
        .service(web::resource("/download_report").route(web::get().to(download_report)))
        .service(web::resource("/training").route(web::get().to(training)))
        .service(web::resource("/research").route(web::get().to(research)))
        .service(web::resource("/contact").route(web::get().to(contact)))
        .service(web::resource("/about").route(web::get().to(about)))
        .service(Files::new(UPLOADS_URL_PREFIX, upload_dir));
}

/// Flash messages live in a signed cookie keyed from the configured secret.
pub fn flash_framework(secret_key: &str) -> FlashMessagesFramework {
    // Key::from needs 64 bytes of material
    let key = Key::from(Sha512::digest(secret_key.as_bytes()).as_slice());
    FlashMessagesFramework::builder(CookieMessageStore::builder(key).build()).build()
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

async fn index(messages: IncomingFlashMessages) -> HttpResponse {
    let context = IndexContext {
        flashes: messages.iter().map(|m| m.content().to_string()).collect(),
        result: None,
    };
    html(views::index(&context))
}

async fn upload(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let (original_name, bytes) =
        read_file_field(&mut payload, state.settings.max_content_length).await?;
    let saved = state.uploads.save(&original_name, &bytes)?;

    let predictor = state.predictor.clone();
    let image_path = saved.path.clone();
    let prediction = web::block(move || predictor.predict_file(&image_path)).await??;

    let context = IndexContext {
        flashes: Vec::new(),
        result: Some(ResultView {
            prediction,
            image_url: UploadStore::public_url(&saved.file_name),
            filename: saved.file_name,
        }),
    };
    Ok(html(views::index(&context)))
}

/// Drains the multipart stream and returns the name and bytes of the `file` part.
async fn read_file_field(
    payload: &mut Multipart,
    limit: usize,
) -> Result<(String, Vec<u8>), AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut received = 0usize;

    while let Some(mut field) = payload.try_next().await? {
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);
        // parts without a filename parameter are plain form fields
        let capture = upload.is_none() && field.name() == Some(FILE_FIELD) && filename.is_some();

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            received += chunk.len();
            if received > limit {
                return Err(AppError::PayloadTooLarge(limit));
            }
            if capture {
                data.extend_from_slice(&chunk);
            }
        }

        if capture {
            if let Some(name) = filename {
                upload = Some((name, data));
            }
        }
    }

    upload.ok_or(AppError::Upload(UploadError::NoFilePart))
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub prediction: Option<String>,
    pub confidence: Option<String>,
    pub filename: Option<String>,
}

impl ReportQuery {
    fn validate(self) -> Result<(PredictionResult, String), AppError> {
        let prediction = self.prediction.ok_or_else(|| missing("prediction"))?;
        let confidence = self.confidence.ok_or_else(|| missing("confidence"))?;
        let filename = self.filename.ok_or_else(|| missing("filename"))?;

        let label = DiseaseLabel::from_str(&prediction)
            .map_err(|_| AppError::BadRequest(format!("unknown prediction '{}'", prediction)))?;
        let confidence = confidence
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|c| c.is_finite() && (0.0..=100.0).contains(c))
            .ok_or_else(|| {
                AppError::BadRequest("confidence must be a number between 0 and 100".into())
            })?;
        let is_flat = sanitize_filename(&filename).as_deref() == Some(filename.as_str());
        if !is_flat || !allowed_file(&filename) {
            return Err(AppError::BadRequest(format!("invalid filename '{}'", filename)));
        }

        Ok((PredictionResult { label, confidence }, filename))
    }
}

fn missing(param: &str) -> AppError {
    AppError::BadRequest(format!("missing query parameter '{}'", param))
}

async fn download_report(
    state: web::Data<AppState>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let (prediction, filename) = query.into_inner().validate()?;
    let image_path = state.uploads.path_for(&filename);
    if !image_path.is_file() {
        return Err(AppError::ImageNotFound(filename));
    }

    let document = ReportDocument::new(prediction, image_path, Local::now());
    let reports = state.reports.clone();
    let pdf = web::block(move || reports.render(&document)).await??;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(REPORT_FILENAME.to_string())],
        })
        .body(pdf))
}

async fn training() -> HttpResponse {
    html(views::training())
}

#[derive(Debug, Deserialize)]
pub struct ResearchQuery {
    #[serde(default)]
    pub query: String,
}

pub fn research_url(base_url: &str, query: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{}{}", base_url, encoded)
}

async fn research(state: web::Data<AppState>, query: web::Query<ResearchQuery>) -> HttpResponse {
    let target = research_url(&state.settings.search_base_url, &query.query);
    log::info!("Redirecting research query to {}", target);
    HttpResponse::Found()
        .insert_header((header::LOCATION, target))
        .finish()
}

async fn contact() -> HttpResponse {
    html(views::contact())
}

async fn about() -> HttpResponse {
    html(views::about())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(prediction: &str, confidence: &str, filename: &str) -> ReportQuery {
        ReportQuery {
            prediction: Some(prediction.into()),
            confidence: Some(confidence.into()),
            filename: Some(filename.into()),
        }
    }

    #[test]
    fn research_query_is_form_encoded() {
        let base = "https://scholar.google.com/scholar?q=Veterinary+";
        assert_eq!(
            research_url(base, "Newcastle Disease"),
            "https://scholar.google.com/scholar?q=Veterinary+Newcastle+Disease"
        );
        assert_eq!(research_url(base, "a&b=c#d"), format!("{}a%26b%3Dc%23d", base));
        assert_eq!(research_url(base, ""), base);
    }

    #[test]
    fn report_query_accepts_a_valid_result() {
        let (prediction, filename) = query("Healthy", "98.5", "sample.jpg").validate().unwrap();
        assert_eq!(prediction.label, DiseaseLabel::Healthy);
        assert_eq!(prediction.confidence, 98.5);
        assert_eq!(filename, "sample.jpg");
    }

    #[test]
    fn report_query_rejects_bad_values() {
        for bad in [
            query("Bird Flu", "50", "a.png"),
            query("Healthy", "150", "a.png"),
            query("Healthy", "NaN", "a.png"),
            query("Healthy", "50", "../secret.png"),
            query("Healthy", "50", "notes.txt"),
        ] {
            assert!(matches!(bad.validate(), Err(AppError::BadRequest(_))));
        }
        let missing = ReportQuery {
            prediction: None,
            confidence: Some("1".into()),
            filename: Some("a.png".into()),
        };
        assert!(matches!(missing.validate(), Err(AppError::BadRequest(_))));
    }
}
