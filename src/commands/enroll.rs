//! Enrollment command
//!
//! Loads a YAML intake form, validates it locally so every problem is
//! reported in one pass, and submits it to the backend. A successful
//! enrollment invalidates the cached learner collections via the store's
//! event bus.

use std::path::Path;

use colored::Colorize;

use crate::api::PracticeApi;
use crate::enroll::EnrollmentForm;
use crate::error::Result;
use crate::store::{ActivityKind, DataStore, StoreEvent};

/// Enroll a new learner from a YAML intake form
///
/// # Arguments
///
/// * `api` - Practice API client
/// * `store` - Data store, notified of the enrollment on success
/// * `file` - Path to the intake form
pub async fn run_enroll(api: &dyn PracticeApi, store: &DataStore, file: &Path) -> Result<()> {
    let form = EnrollmentForm::from_yaml_file(file)?;
    form.validate()?;

    tracing::info!("Submitting enrollment for {}", form.child.name);
    let receipt = api.enroll_student(&form).await?;

    if let Err(e) = store.add_activity(
        &format!("Enrolled {}", form.child.name),
        ActivityKind::Learner,
    ) {
        tracing::warn!("Could not record enrollment activity: {}", e);
    }

    // Cached learner lists are stale now; let any subscriber refetch.
    store.publish(StoreEvent::ScheduleChanged);

    println!("{}", format!("Enrolled {}.", form.child.name).green());
    if let Some(learner_id) = &receipt.learner_id {
        println!("Learner id: {}", learner_id);
    }
    if let Some(message) = &receipt.message {
        println!("{}", message);
    }
    Ok(())
}
