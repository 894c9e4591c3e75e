//! Enrollment intake form and document uploads
//!
//! New learners are enrolled by submitting a structured intake form,
//! authored as YAML and validated before it leaves the machine.
//! Supporting documents (evaluations, referrals) are uploaded separately
//! as base64 payloads with a SHA-256 digest the backend verifies.

use crate::error::{Result, TherakitError};
use anyhow::Context;
use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Identity of the child being enrolled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChildInfo {
    #[serde(default)]
    pub name: String,

    /// Birth date as `YYYY-MM-DD`.
    #[serde(default)]
    pub birth_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

/// Parent or guardian contact details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardianInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Medical background relevant to therapy planning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicalHistory {
    #[serde(default)]
    pub diagnoses: Vec<String>,

    #[serde(default)]
    pub medications: Vec<String>,

    #[serde(default)]
    pub allergies: Vec<String>,
}

/// Why the family is seeking services and what they hope to achieve.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TherapyIntake {
    #[serde(default)]
    pub referral_reason: String,

    #[serde(default)]
    pub prior_services: Vec<String>,

    #[serde(default)]
    pub initial_goals: Vec<String>,
}

/// Consent flags and signature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsentSection {
    #[serde(default)]
    pub treatment_consent: bool,

    #[serde(default)]
    pub photo_consent: bool,

    #[serde(default)]
    pub signature_name: String,

    /// Signature date as `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_date: Option<String>,
}

/// The complete enrollment intake form.
///
/// Each section is updated through targeted methods rather than by
/// merging partial structures, so every mutation is explicit and
/// auditable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollmentForm {
    #[serde(default)]
    pub child: ChildInfo,

    #[serde(default)]
    pub guardian: GuardianInfo,

    #[serde(default)]
    pub medical: MedicalHistory,

    #[serde(default)]
    pub intake: TherapyIntake,

    #[serde(default)]
    pub consent: ConsentSection,
}

impl EnrollmentForm {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a form from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read enrollment form: {}", path.display()))?;
        let form: EnrollmentForm = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse enrollment form: {}", path.display()))?;
        Ok(form)
    }

    // ---------- Child ----------

    pub fn set_child_name(&mut self, name: impl Into<String>) {
        self.child.name = name.into();
    }

    pub fn set_birth_date(&mut self, date: impl Into<String>) {
        self.child.birth_date = date.into();
    }

    pub fn set_gender(&mut self, gender: impl Into<String>) {
        self.child.gender = Some(gender.into());
    }

    // ---------- Guardian ----------

    pub fn set_guardian_name(&mut self, name: impl Into<String>) {
        self.guardian.name = name.into();
    }

    pub fn set_guardian_phone(&mut self, phone: impl Into<String>) {
        self.guardian.phone = Some(phone.into());
    }

    pub fn set_guardian_email(&mut self, email: impl Into<String>) {
        self.guardian.email = Some(email.into());
    }

    // ---------- Medical history ----------

    pub fn add_diagnosis(&mut self, diagnosis: impl Into<String>) {
        self.medical.diagnoses.push(diagnosis.into());
    }

    pub fn add_medication(&mut self, medication: impl Into<String>) {
        self.medical.medications.push(medication.into());
    }

    pub fn add_allergy(&mut self, allergy: impl Into<String>) {
        self.medical.allergies.push(allergy.into());
    }

    // ---------- Intake ----------

    pub fn set_referral_reason(&mut self, reason: impl Into<String>) {
        self.intake.referral_reason = reason.into();
    }

    pub fn add_prior_service(&mut self, service: impl Into<String>) {
        self.intake.prior_services.push(service.into());
    }

    pub fn add_initial_goal(&mut self, goal: impl Into<String>) {
        self.intake.initial_goals.push(goal.into());
    }

    // ---------- Consent ----------

    /// Records treatment consent with the signer's name, dated today.
    pub fn give_consent(&mut self, signature_name: impl Into<String>) {
        self.consent.treatment_consent = true;
        self.consent.signature_name = signature_name.into();
        self.consent.signature_date =
            Some(chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string());
    }

    pub fn set_photo_consent(&mut self, granted: bool) {
        self.consent.photo_consent = granted;
    }

    /// Checks the form is complete enough to submit.
    ///
    /// Requires a child name, a parseable birth date, and signed treatment
    /// consent. All problems are reported at once so the form can be fixed
    /// in a single pass.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.child.name.trim().is_empty() {
            problems.push("child name is required".to_string());
        }

        if self.child.birth_date.trim().is_empty() {
            problems.push("child birth date is required".to_string());
        } else if NaiveDate::parse_from_str(&self.child.birth_date, "%Y-%m-%d").is_err() {
            problems.push(format!(
                "child birth date '{}' is not in YYYY-MM-DD form",
                self.child.birth_date
            ));
        }

        if !self.consent.treatment_consent {
            problems.push("treatment consent must be given".to_string());
        } else if self.consent.signature_name.trim().is_empty() {
            problems.push("consent signature name is required".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(TherakitError::Enrollment(problems.join("; ")).into())
        }
    }
}

/// A supporting document prepared for upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,

    /// Base64-encoded file contents.
    pub data: String,

    /// Hex SHA-256 digest of the raw file bytes.
    pub sha256: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_id: Option<String>,
}

impl DocumentUpload {
    /// Reads a local file and prepares it for upload.
    pub fn from_path<P: AsRef<Path>>(path: P, child_id: Option<String>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                TherakitError::Enrollment(format!("Invalid document path: {}", path.display()))
            })?;

        let content_type = content_type_for(path).to_string();
        let data = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let sha256 = format!("{:x}", Sha256::digest(&bytes));

        Ok(Self {
            file_name,
            content_type,
            data,
            sha256,
            child_id,
        })
    }
}

/// Guesses the MIME type from the file extension.
fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}
