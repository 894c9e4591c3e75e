//! Assistant preference commands
//!
//! Each learner carries one free-text instruction block that rides along
//! with assistant messages. This module shows the stored text and
//! replaces it.

use colored::Colorize;

use crate::api::PracticeApi;
use crate::error::Result;
use crate::store::{ActivityKind, DataStore};

/// Print the stored preference text for one learner
pub async fn show(api: &dyn PracticeApi, learner_id: &str) -> Result<()> {
    let prefs = api.ai_preferences(learner_id).await?;

    if prefs.preferences.is_empty() {
        println!("No assistant preferences saved for learner {}.", learner_id);
    } else {
        println!("\nAssistant preferences for learner {}:\n", learner_id);
        println!("{}\n", prefs.preferences);
    }
    Ok(())
}

/// Replace the stored preference text for one learner
///
/// # Arguments
///
/// * `api` - Practice API client
/// * `store` - Data store, used to record the update in the activity log
/// * `learner_id` - Learner whose preferences to replace
/// * `text` - New preference text; empty clears the stored block
pub async fn set(
    api: &dyn PracticeApi,
    store: &DataStore,
    learner_id: &str,
    text: &str,
) -> Result<()> {
    api.save_ai_preferences(learner_id, text).await?;

    if let Err(e) = store.add_activity(
        &format!("Updated assistant preferences for {}", learner_id),
        ActivityKind::Learner,
    ) {
        tracing::warn!("Could not record preference update: {}", e);
    }

    if text.is_empty() {
        println!(
            "{}",
            format!("Preferences cleared for learner {}.", learner_id).green()
        );
    } else {
        println!(
            "{}",
            format!("Preferences saved for learner {}.", learner_id).green()
        );
    }
    Ok(())
}
