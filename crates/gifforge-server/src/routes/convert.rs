//! The conversion endpoint.
//!
//! `POST /api/gif/convert` accepts a multipart body with one or more `file`
//! parts and an `input_body` JSON part describing the task. Dispatch:
//!
//! - target `gif`, multiple files: frame composition (image sequence)
//! - target `gif`, one file: the tiered video pipeline
//! - any other target: reverse conversion from GIF
//!
//! The JSON part mirrors the task schema:
//! `{"tasks":{"convert":{"output_format":"gif","options":{...}}}}`.

use std::str::FromStr;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use gifforge_av::scratch;
use gifforge_core::{ConversionOptions, ConversionResult, Error, TargetFormat};

use crate::context::AppContext;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
struct RequestBody {
    tasks: Tasks,
}

#[derive(Debug, Deserialize)]
struct Tasks {
    convert: ConvertTask,
}

#[derive(Debug, Deserialize)]
struct ConvertTask {
    output_format: String,
    #[serde(default)]
    options: ConversionOptions,
}

/// One uploaded file part.
struct Upload {
    name: String,
    bytes: Vec<u8>,
}

/// POST /api/gif/convert
pub async fn convert(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let (uploads, task) = read_request(multipart).await?;

    let target = TargetFormat::from_str(&task.output_format)?;
    let options = task.options;

    if uploads.is_empty() {
        return Err(Error::Validation("no file uploaded".into()).into());
    }

    let result = match target {
        TargetFormat::Gif if uploads.len() > 1 => {
            compose_sequence(&ctx, &uploads, &options).await?
        }
        TargetFormat::Gif => {
            let upload = &uploads[0];
            ctx.gif_pipeline()?
                .convert_to_animated(&upload.name, &upload.bytes, &options)
                .await?
        }
        other => {
            ctx.reverse_converter()?
                .convert_from_animated(&uploads[0].bytes, other, &options)
                .await?
        }
    };

    Ok(Json(success_body(&result)))
}

/// Pull the file parts and the task JSON out of the multipart body.
async fn read_request(mut multipart: Multipart) -> Result<(Vec<Upload>, ConvertTask), AppError> {
    let mut uploads = Vec::new();
    let mut task: Option<ConvertTask> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::Validation(format!("failed to read upload: {e}")))?;
                uploads.push(Upload {
                    name,
                    bytes: bytes.to_vec(),
                });
            }
            Some("input_body") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Error::Validation(format!("failed to read input_body: {e}")))?;
                let body: RequestBody = serde_json::from_str(&text)
                    .map_err(|e| Error::Validation(format!("invalid input_body: {e}")))?;
                task = Some(body.tasks.convert);
            }
            _ => {}
        }
    }

    let task = task.ok_or_else(|| Error::Validation("missing input_body part".into()))?;
    Ok((uploads, task))
}

/// Compose an image sequence into a GIF and persist it like any other
/// pipeline artifact.
async fn compose_sequence(
    ctx: &AppContext,
    uploads: &[Upload],
    options: &ConversionOptions,
) -> Result<ConversionResult, AppError> {
    let inputs: Vec<Vec<u8>> = uploads.iter().map(|u| u.bytes.clone()).collect();
    let opts = options.clone();

    let scoped_out = scratch::scoped_output("gif")?;
    let dest_tmp = scoped_out.to_path_buf();
    let info = tokio::task::spawn_blocking(move || {
        gifforge_compose::compose_gif(&inputs, &opts, &dest_tmp)
    })
    .await
    .map_err(|e| Error::Internal(format!("composition task failed: {e}")))??;

    let file_size = scratch::verify_artifact(&scoped_out)?;
    let output_file = scratch::unique_artifact_name("gif");
    let dest = ctx
        .config
        .output
        .category_dir("gifs")
        .join(&output_file);
    scratch::persist(scoped_out, &dest)?;

    tracing::info!(
        frames = info.frames,
        output = %output_file,
        size = file_size,
        "Image sequence composed"
    );

    let mut echoed = options.clone();
    echoed.width = info.width;
    echoed.height = Some(info.height);

    Ok(ConversionResult {
        output_file,
        path: dest,
        file_size,
        format: TargetFormat::Gif,
        tier: None,
        method: "compose".to_string(),
        options: echoed,
    })
}

fn success_body(result: &ConversionResult) -> Value {
    let download_url = format!(
        "/download/{}/{}",
        result.format.category(),
        result.output_file
    );
    json!({
        "success": true,
        "output_file": result.output_file,
        "download_url": download_url,
        "file_size": result.file_size,
        "output_format": result.format,
        "conversion_options": result.options,
        "gif_info": {
            "width": result.options.width,
            "height": result.options.height,
            "fps": result.options.fps,
            "loop_count": result.options.loop_count,
            "method": result.method,
        },
    })
}
