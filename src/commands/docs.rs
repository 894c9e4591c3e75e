//! Supporting document commands
//!
//! Evaluations, referral letters, and similar files live on the backend;
//! this module uploads local files (base64 with a sha256 digest) and
//! manages stored ones by id.

use std::path::Path;

use colored::Colorize;

use crate::api::PracticeApi;
use crate::enroll::DocumentUpload;
use crate::error::Result;
use crate::store::{ActivityKind, DataStore};

/// Upload a local file as a supporting document
///
/// # Arguments
///
/// * `api` - Practice API client
/// * `store` - Data store, used to record the upload in the activity log
/// * `path` - Local file to upload
/// * `child_id` - Learner to attach the document to, if any
pub async fn upload(
    api: &dyn PracticeApi,
    store: &DataStore,
    path: &Path,
    child_id: Option<String>,
) -> Result<()> {
    let upload = DocumentUpload::from_path(path, child_id)?;
    tracing::info!(
        "Uploading {} ({}, sha256 {})",
        upload.file_name,
        upload.content_type,
        upload.sha256
    );

    let record = api.upload_document(&upload).await?;

    if let Err(e) = store.add_activity(
        &format!("Uploaded document {}", record.file_name),
        ActivityKind::Report,
    ) {
        tracing::warn!("Could not record upload activity: {}", e);
    }

    println!("{}", "Document uploaded.".green());
    println!("File id: {}", record.file_id);
    if let Some(url) = &record.url {
        println!("URL:     {}", url);
    }
    Ok(())
}

/// Delete a stored document by id
pub async fn delete(api: &dyn PracticeApi, file_id: &str) -> Result<()> {
    api.delete_document(file_id).await?;
    println!("Document {} deleted.", file_id);
    Ok(())
}

/// Print a short-lived view link for a stored document
pub async fn view(api: &dyn PracticeApi, file_id: &str) -> Result<()> {
    let link = api.view_document(file_id).await?;
    println!("{}", link.url);
    Ok(())
}
