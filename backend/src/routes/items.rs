use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use findmystuff_storage::{
    item::{ItemCatalog, ItemCreateRequest, ItemSummary},
    user::UserStore,
};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use crate::{
    item_upload::{
        allowed_extension, generate_unique_id, guess_content_type, secure_filename, storage_key,
    },
    media_storage::ObjectStorage,
    pages::{ItemPages, FALLBACK_ERROR_PAGE},
    types::AppError,
};

/// Maximum accepted upload body: 15 MiB
pub const MAX_IMAGE_SIZE_BYTES: usize = 15 * 1024 * 1024;

#[derive(Debug, Serialize, JsonSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    /// Public URL of the uploaded image
    pub url: String,
    /// Short public token identifying the item
    pub unique_id: String,
}

/// Item as listed on the dashboard
#[derive(Debug, Serialize, JsonSchema)]
pub struct DashboardItem {
    /// Store-generated item ID
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub unique_id: String,
}

impl From<ItemSummary> for DashboardItem {
    fn from(summary: ItemSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            description: summary.description,
            image_url: summary.image_url,
            unique_id: summary.unique_id,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct DashboardResponse {
    pub success: bool,
    pub items: Vec<DashboardItem>,
}

/// Fields of the upload form; absent or empty parts are `None`
#[derive(Default)]
struct UploadForm {
    image: Option<(String, Bytes)>,
    name: Option<String>,
    description: Option<String>,
}

fn invalid_multipart(err: &MultipartError) -> AppError {
    tracing::warn!("Invalid multipart payload: {}", err.body_text());
    AppError::new(err.status(), "invalid_multipart", "Invalid multipart payload")
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| invalid_multipart(&e))?
    {
        let field_name = field.name().map(ToString::to_string);

        match field_name.as_deref() {
            Some("image") => {
                let filename = field.file_name().map(ToString::to_string);
                let data = field.bytes().await.map_err(|e| invalid_multipart(&e))?;
                form.image = filename.and_then(non_empty).map(|filename| (filename, data));
            }
            Some("name") => {
                form.name = non_empty(field.text().await.map_err(|e| invalid_multipart(&e))?);
            }
            Some("description") => {
                form.description =
                    non_empty(field.text().await.map_err(|e| invalid_multipart(&e))?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Uploads the image of a found item and adds it to the catalog
///
/// 1. Validates the form and the image extension
/// 2. Attributes the upload to the most recently registered user
/// 3. Uploads the bytes under `{name}__{filename}__{unique_id}.{ext}`
/// 4. Stores the item with the public URL of the image
///
/// The catalog write is not linked to the upload: if it fails, the object
/// stays in the bucket.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Missing field or extension not in png/jpg/jpeg
/// - `500 INTERNAL_SERVER_ERROR` - No user to attribute to, upload failed,
///   no public URL, or the catalog write failed
#[instrument(skip_all)]
pub async fn upload_item(
    Extension(user_store): Extension<Arc<dyn UserStore>>,
    Extension(item_catalog): Extension<Arc<dyn ItemCatalog>>,
    Extension(object_storage): Extension<Arc<dyn ObjectStorage>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let multipart = multipart.map_err(|rejection| {
        tracing::warn!("Upload without multipart body: {rejection}");
        AppError::validation("Expected a multipart/form-data body")
    })?;

    let UploadForm {
        image: Some((raw_filename, data)),
        name: Some(item_name),
        description: Some(description),
    } = read_upload_form(multipart).await?
    else {
        return Err(AppError::validation("All fields are required"));
    };

    let filename = secure_filename(&raw_filename);
    let Some(extension) = allowed_extension(&filename) else {
        return Err(AppError::validation("Invalid file type"));
    };

    // There is no caller identity, so the latest registration owns the upload
    let uploader = user_store.get_latest().await?.ok_or_else(|| {
        AppError::server("no_uploader", "No registered user to attribute the upload to")
    })?;

    let uploaded_at = Utc::now().timestamp();
    let unique_id = generate_unique_id();
    let key = storage_key(&item_name, &filename, &unique_id, &extension);
    let content_type = guess_content_type(&key);

    object_storage
        .upload(&key, data.to_vec(), &content_type)
        .await?;

    let url = object_storage.public_url(&key).ok_or_else(|| {
        tracing::error!(key, "No public URL for uploaded object");
        AppError::server("public_url_unavailable", "Failed to get public image URL")
    })?;

    let item = item_catalog
        .create(ItemCreateRequest {
            name: item_name,
            description,
            image_url: url.clone(),
            unique_id: unique_id.clone(),
            uploaded_at,
            user_id: uploader.id,
        })
        .await
        .inspect_err(|_| tracing::error!(key, "Catalog write failed, uploaded object is orphaned"))?;

    tracing::info!(item_id = %item.id, unique_id, "item uploaded");

    Ok(Json(UploadResponse {
        success: true,
        message: "Item uploaded successfully".to_string(),
        url,
        unique_id,
    }))
}

/// Lists every item in the catalog
///
/// The list is neither filtered nor paginated and carries no user fields.
///
/// # Errors
///
/// - `500 INTERNAL_SERVER_ERROR` - The catalog could not be read
#[instrument(skip_all)]
pub async fn dashboard(
    Extension(item_catalog): Extension<Arc<dyn ItemCatalog>>,
) -> Result<Json<DashboardResponse>, AppError> {
    let summaries = item_catalog.list_summaries().await.map_err(|e| {
        tracing::error!("Dashboard fetch error: {e}");
        AppError::server("fetch_failed", "Error fetching items")
    })?;

    Ok(Json(DashboardResponse {
        success: true,
        items: summaries.into_iter().map(DashboardItem::from).collect(),
    }))
}

/// Renders the public page of an item, reached from its QR code
#[instrument(skip(item_catalog, pages))]
pub async fn view_item(
    Extension(item_catalog): Extension<Arc<dyn ItemCatalog>>,
    Extension(pages): Extension<Arc<ItemPages>>,
    Path(unique_id): Path<String>,
) -> Response {
    let (status, rendered) = match item_catalog.get_by_unique_id(&unique_id).await {
        Ok(Some(item)) => (StatusCode::OK, pages.item(&item)),
        Ok(None) => (StatusCode::NOT_FOUND, pages.not_found("Item not found")),
        Err(e) => {
            tracing::error!("Item lookup error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                pages.error("We could not load this item right now."),
            )
        }
    };

    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Item page rendering failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(FALLBACK_ERROR_PAGE)).into_response()
        }
    }
}
