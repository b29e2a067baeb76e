//! Artifact download route.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use gifforge_core::config::CATEGORIES;
use gifforge_core::Error;

use crate::context::AppContext;
use crate::error::AppError;

/// GET /download/{category}/{filename}
///
/// Serves a finished artifact as an attachment. The category must be one of
/// the known export categories and the filename must be a plain file name;
/// anything that could traverse out of the export tree is rejected before
/// touching the filesystem.
pub async fn download(
    State(ctx): State<AppContext>,
    Path((category, filename)): Path<(String, String)>,
) -> Result<Response, AppError> {
    if !CATEGORIES.contains(&category.as_str()) {
        return Err(Error::Validation(format!("unknown download category: {category}")).into());
    }
    if !is_plain_filename(&filename) {
        return Err(Error::Validation("invalid file name".into()).into());
    }

    let path = ctx.config.output.category_dir(&category).join(&filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| Error::not_found("artifact", &filename))?;

    let headers = [
        (header::CONTENT_TYPE, content_type(&filename).to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// A bare file name: no separators, no parent references, not hidden.
fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
}

fn content_type(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("png") => "image/png",
        Some("apng") => "image/apng",
        _ => "application/octet-stream",
    }
}
