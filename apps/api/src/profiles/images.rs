use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Largest accepted avatar upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Maps an accepted image content type to its file extension.
pub fn image_extension(content_type: &str) -> Result<&'static str, AppError> {
    match content_type {
        "image/png" => Ok("png"),
        "image/jpeg" | "image/jpg" => Ok("jpg"),
        "image/webp" => Ok("webp"),
        "image/gif" => Ok("gif"),
        other => Err(AppError::Validation(format!(
            "Unsupported image type '{other}'. Upload a PNG, JPEG, WebP or GIF."
        ))),
    }
}

/// Object key for a user's avatar, unique per upload.
pub fn image_key(user_id: &str, extension: &str) -> String {
    format!("profiles/{}/{}.{}", user_id, Uuid::new_v4(), extension)
}

/// Uploads an avatar and returns its public path-style URL.
pub async fn upload_profile_image(
    s3: &aws_sdk_s3::Client,
    endpoint: &str,
    bucket: &str,
    user_id: &str,
    content_type: &str,
    body: Bytes,
) -> Result<String, AppError> {
    if body.is_empty() {
        return Err(AppError::Validation("image file is empty".to_string()));
    }
    if body.len() > MAX_IMAGE_BYTES {
        return Err(AppError::Validation(format!(
            "image exceeds {} MB",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    let key = image_key(user_id, image_extension(content_type)?);

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(body))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("profile image upload failed: {e}")))?;

    info!("Uploaded profile image to s3://{}/{}", bucket, key);
    Ok(format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key))
}
