use std::collections::HashMap;
use std::path::Path;

use axum::{extract::Multipart, http::StatusCode};
use chrono::Utc;
use tokio::fs;

use crate::models::Error;

/// Multipart field carrying the optional dish image.
pub const UPLOAD_FIELD: &str = "dishImage";

/// Hard cap on accepted image files (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// An accepted image file, held in memory until `store_image` writes it.
pub struct ImageFile {
    pub original_name: String,
    pub data: Vec<u8>,
}

/// The decoded multipart form of a dish create/update request: plain text
/// fields plus at most one image.
pub struct DishForm {
    pub fields: HashMap<String, String>,
    pub image: Option<ImageFile>,
}

fn is_image(content_type: Option<&str>) -> bool {
    content_type.map_or(false, |ct| ct.starts_with("image/"))
}

/// Drains a multipart request into a [`DishForm`]. A `dishImage` field
/// with a non-image MIME type is dropped without failing the request; an
/// image over the size cap fails it with a 400.
pub async fn read_dish_form(mut multipart: Multipart) -> Result<DishForm, Error> {
    let mut fields = HashMap::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| Error::new(StatusCode::BAD_REQUEST, "Invalid multipart request."))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == UPLOAD_FIELD {
            if !is_image(field.content_type()) {
                continue;
            }
            let original_name = field.file_name().unwrap_or("upload").to_owned();
            let data = field.bytes().await.map_err(|_| {
                Error::new(StatusCode::BAD_REQUEST, "Failed to read uploaded file.")
            })?;
            if data.len() > MAX_IMAGE_BYTES {
                return Err(Error::new(
                    StatusCode::BAD_REQUEST,
                    "Image exceeds the 5MB size limit.",
                ));
            }
            image = Some(ImageFile {
                original_name,
                data: data.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(|_| {
                Error::new(StatusCode::BAD_REQUEST, "Invalid multipart request.")
            })?;
            fields.insert(name, value);
        }
    }

    Ok(DishForm { fields, image })
}

/// Persists an accepted image under the public upload directory and
/// returns the relative URL it will be served from.
pub async fn store_image(image: &ImageFile, upload_dir: &Path) -> Result<String, Error> {
    fs::create_dir_all(upload_dir).await?;
    let filename = unique_filename(&image.original_name);
    fs::write(upload_dir.join(&filename), &image.data).await?;
    Ok(format!("/uploads/{filename}"))
}

fn unique_filename(original: &str) -> String {
    unique_filename_at(Utc::now().timestamp_millis(), original)
}

/// Collision resistance comes from the millisecond timestamp prefix; the
/// original name is kept for operator friendliness, stripped of any path
/// components the client may have sent.
fn unique_filename_at(millis: i64, original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");
    format!("{millis}-{base}")
}
