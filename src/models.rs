use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Description and location are required")]
    MissingDescriptionOrLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A single user-submitted animal-welfare incident record. Created once at
/// submission, persisted to MySQL or the fallback file, never updated or
/// deleted in scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub description: String,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub urgency_level: String,
    pub animal_type: Option<String>,
    pub situation_type: Option<String>,
    pub image_url: Option<String>,
    pub ai_analysis: Option<serde_json::Value>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

// Request/Response DTOs

#[derive(Debug, Deserialize)]
pub struct SubmitReportRequest {
    pub description: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub animal_type: Option<String>,
    pub situation_type: Option<String>,
    pub image_url: Option<String>,
}

impl SubmitReportRequest {
    /// Both required fields, trimmed; anything blank counts as missing.
    pub fn required_fields(&self) -> Result<(String, String), ValidationError> {
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        let location = self
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty());
        match (description, location) {
            (Some(d), Some(l)) => Ok((d.to_string(), l.to_string())),
            _ => Err(ValidationError::MissingDescriptionOrLocation),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitReportResponse {
    pub success: bool,
    pub report_id: String,
    pub message: String,
    pub notifications_sent: Vec<String>,
    pub saved_to_database: bool,
}

#[derive(Debug, Serialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActiveReport {
    pub id: String,
    pub description: String,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub urgency_level: String,
    pub animal_type: Option<String>,
    pub situation_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub contact_info: ContactInfo,
    pub image_url: Option<String>,
    pub ai_analysis: Option<serde_json::Value>,
}

impl From<Report> for ActiveReport {
    fn from(r: Report) -> Self {
        ActiveReport {
            id: r.id,
            description: r.description,
            location: r.location,
            coordinates: r.coordinates,
            urgency_level: r.urgency_level,
            animal_type: r.animal_type,
            situation_type: r.situation_type,
            created_at: r.created_at,
            contact_info: ContactInfo {
                name: r.contact_name,
                email: r.contact_email,
                phone: r.contact_phone,
            },
            image_url: r.image_url,
            ai_analysis: r.ai_analysis,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActiveReportsResponse {
    pub success: bool,
    pub reports: Vec<ActiveReport>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub description: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailNotifyRequest {
    pub email: Option<String>,
    pub report_id: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub urgency_level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppNotifyRequest {
    pub phone_number: Option<String>,
    pub report_id: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub urgency_level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QrParams {
    pub report_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TestEmailRequest {
    pub email: Option<String>,
    pub test_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomEmailRequest {
    pub to_email: Option<String>,
    pub subject: Option<String>,
    pub content: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkEmailRequest {
    pub email_list: Option<Vec<String>>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TemplateEmailRequest {
    pub template_name: Option<String>,
    pub to_email: Option<String>,
    pub variables: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(description: Option<&str>, location: Option<&str>) -> SubmitReportRequest {
        SubmitReportRequest {
            description: description.map(str::to_string),
            location: location.map(str::to_string),
            coordinates: None,
            contact_name: None,
            contact_email: None,
            contact_phone: None,
            animal_type: None,
            situation_type: None,
            image_url: None,
        }
    }

    #[test]
    fn test_required_fields_present() {
        let (d, l) = request(Some("  injured dog "), Some("central park"))
            .required_fields()
            .unwrap();
        assert_eq!(d, "injured dog");
        assert_eq!(l, "central park");
    }

    #[test]
    fn test_required_fields_missing() {
        for req in [
            request(None, Some("park")),
            request(Some("dog"), None),
            request(Some("   "), Some("park")),
            request(None, None),
        ] {
            assert_eq!(
                req.required_fields(),
                Err(ValidationError::MissingDescriptionOrLocation)
            );
        }
    }

    #[test]
    fn test_active_report_nests_contact_info() {
        let report = Report {
            id: "r-1".into(),
            description: "d".into(),
            location: "l".into(),
            coordinates: Some(Coordinates { lat: 1.0, lng: 2.0 }),
            contact_name: Some("Jo".into()),
            contact_email: Some("jo@example.com".into()),
            contact_phone: None,
            urgency_level: "normal".into(),
            animal_type: None,
            situation_type: None,
            image_url: None,
            ai_analysis: None,
            status: "active".into(),
            created_at: Utc::now(),
        };
        let active: ActiveReport = report.into();
        assert_eq!(active.contact_info.name.as_deref(), Some("Jo"));
        assert_eq!(active.contact_info.email.as_deref(), Some("jo@example.com"));
        assert!(active.contact_info.phone.is_none());
    }
}
