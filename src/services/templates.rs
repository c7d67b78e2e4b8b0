use chrono::Utc;

use crate::models::Report;

/// Strip tags and collapse whitespace; used to derive the plain-text part
/// when a caller only supplies HTML.
pub fn html_to_text(html: &str) -> String {
    let tags = regex::Regex::new(r"<[^>]+>").unwrap();
    let spaces = regex::Regex::new(r"\s+").unwrap();
    let text = tags.replace_all(html, " ");
    spaces.replace_all(&text, " ").trim().to_string()
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn urgency_color(urgency: &str) -> &'static str {
    match urgency.to_lowercase().as_str() {
        "emergency" => "#dc2626",
        "high" => "#ea580c",
        _ => "#16a34a",
    }
}

fn or_not_provided(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("Not provided")
}

/// Alert sent to the rescue team for a newly submitted report.
pub fn rescue_alert(report: &Report) -> (String, String) {
    let urgency = report.urgency_level.to_uppercase();
    let color = urgency_color(&report.urgency_level);
    let subject = format!("{}: Animal Rescue Report #{}", urgency, short_id(&report.id));

    let map_link = report
        .coordinates
        .map(|c| {
            format!(
                r#"<p><strong>Coordinates:</strong> {lat}, {lng}</p>
                <p><a href="https://www.google.com/maps?q={lat},{lng}" target="_blank">View on Map</a></p>"#,
                lat = c.lat,
                lng = c.lng
            )
        })
        .unwrap_or_default();

    let analysis_block = report
        .ai_analysis
        .as_ref()
        .and_then(|a| a.get("full_analysis"))
        .and_then(|v| v.as_str())
        .map(|text| {
            format!(
                r#"<div style="background: #f0f9ff; padding: 10px; border-radius: 4px; font-size: 14px;">
                <strong>AI Analysis:</strong> {}</div>"#,
                text
            )
        })
        .unwrap_or_default();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; color: #333;">
  <div style="max-width: 700px; margin: 0 auto; padding: 20px;">
    <div style="text-align: center; padding: 20px 0; border-bottom: 2px solid #e5e7eb;">
      <div style="font-size: 24px; font-weight: bold; color: #1e40af;">RescueRadar</div>
      <div style="color: #6b7280; font-size: 14px;">Emergency Response System</div>
    </div>
    <div style="background-color: #fef2f2; border-left: 4px solid {color}; padding: 15px; margin: 20px 0;">
      <h2 style="margin: 0; color: {color};">{urgency} PRIORITY REPORT</h2>
      <p style="margin: 5px 0 0 0;">Action Required: Immediate Response Needed</p>
    </div>
    <div style="margin: 25px 0; padding: 15px; background: #f9fafb; border-radius: 6px;">
      <h3 style="color: #1e40af; margin-top: 0;">Report Summary</h3>
      <p><strong>Report ID:</strong> {id}</p>
      <p><strong>Date &amp; Time:</strong> {time}</p>
      <p><strong>Urgency Level:</strong> <span style="color: {color}; font-weight: bold;">{urgency}</span></p>
      <p><strong>Animal Type:</strong> {animal_type}</p>
      <p><strong>Situation:</strong> {situation_type}</p>
    </div>
    <div style="margin: 25px 0; padding: 15px; background: #f9fafb; border-radius: 6px;">
      <h3 style="color: #1e40af; margin-top: 0;">Incident Location</h3>
      <p><strong>Address:</strong> {location}</p>
      {map_link}
    </div>
    <div style="margin: 25px 0; padding: 15px; background: #f9fafb; border-radius: 6px;">
      <h3 style="color: #1e40af; margin-top: 0;">Incident Details</h3>
      <p>{description}</p>
      {analysis_block}
    </div>
    <div style="margin: 25px 0; padding: 15px; background: #f9fafb; border-radius: 6px;">
      <h3 style="color: #1e40af; margin-top: 0;">Reporter Information</h3>
      <p><strong>Name:</strong> {contact_name}</p>
      <p><strong>Phone:</strong> {contact_phone}</p>
      <p><strong>Email:</strong> {contact_email}</p>
    </div>
    <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #e5e7eb; font-size: 12px; color: #6b7280; text-align: center;">
      <p>This is an automated message from RescueRadar Emergency Response System.</p>
      <p>Please do not reply to this email.</p>
    </div>
  </div>
</body>
</html>"#,
        color = color,
        urgency = urgency,
        id = report.id,
        time = Utc::now().format("%Y-%m-%d %H:%M:%S"),
        animal_type = report.animal_type.as_deref().unwrap_or("Not specified"),
        situation_type = report.situation_type.as_deref().unwrap_or("Unknown"),
        location = report.location,
        map_link = map_link,
        description = report.description,
        analysis_block = analysis_block,
        contact_name = or_not_provided(&report.contact_name),
        contact_phone = or_not_provided(&report.contact_phone),
        contact_email = or_not_provided(&report.contact_email),
    );

    (subject, html)
}

/// Confirmation sent to the reporter after a successful submission.
pub fn user_confirmation(report: &Report) -> (String, String) {
    let subject = format!("Report Confirmation - #{}", short_id(&report.id));
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #16a34a; text-align: center;">Thank You for Your Report!</h2>
  <p>Dear {name},</p>
  <p>Thank you for taking action to help an animal in need. Your report has been
  successfully submitted and forwarded to local rescue teams.</p>
  <div style="background: #f0fdf4; padding: 20px; border-radius: 8px; border-left: 4px solid #16a34a; margin: 20px 0;">
    <h3>Report Details:</h3>
    <p><strong>Report ID:</strong> {id}</p>
    <p><strong>Location:</strong> {location}</p>
    <p><strong>Description:</strong> {description}</p>
    <p><strong>Urgency Level:</strong> {urgency}</p>
    <p><strong>Submitted:</strong> {time}</p>
  </div>
  <h3>What Happens Next?</h3>
  <ul style="background: #f9fafb; padding: 15px 30px; border-radius: 6px;">
    <li>Your report has been sent to local animal rescue teams</li>
    <li>A rescue coordinator may contact you for additional information</li>
    <li>If this is an emergency, please also contact local authorities</li>
  </ul>
  <div style="background: #fef3c7; padding: 15px; border-radius: 6px; margin: 20px 0;">
    <p><strong>Emergency Note:</strong> If the animal is in immediate danger,
    please also contact your local animal control or emergency services.</p>
  </div>
  <p style="text-align: center; color: #6b7280; font-size: 12px; margin-top: 30px;">
    Best regards,<br>The RescueRadar Team
  </p>
</div>"#,
        name = report.contact_name.as_deref().unwrap_or("Animal Advocate"),
        id = report.id,
        location = report.location,
        description = report.description,
        urgency = report.urgency_level.to_uppercase(),
        time = Utc::now().format("%Y-%m-%d %H:%M:%S"),
    );

    (subject, html)
}

/// Direct rescue-alert body for the standalone email-notify endpoint.
pub fn direct_alert(
    report_id: &str,
    description: Option<&str>,
    location: Option<&str>,
    urgency_level: Option<&str>,
) -> (String, String, String) {
    let subject = format!("Animal Rescue Alert - Report #{}", report_id);
    let html = format!(
        r#"<h2>New Animal Rescue Report</h2>
<p><strong>Report ID:</strong> {id}</p>
<p><strong>Description:</strong> {description}</p>
<p><strong>Location:</strong> {location}</p>
<p><strong>Urgency:</strong> {urgency}</p>
<p>Please respond as soon as possible.</p>"#,
        id = report_id,
        description = description.unwrap_or("N/A"),
        location = location.unwrap_or("N/A"),
        urgency = urgency_level.unwrap_or("Normal"),
    );
    let text = format!(
        "New Animal Rescue Report #{} - {}",
        report_id,
        description.unwrap_or("N/A")
    );
    (subject, html, text)
}

pub fn test_email(test_type: &str, method: &str) -> (String, String) {
    let subject = format!("Test Email - RescueRadar ({})", test_type);
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #2563eb;">Email Service Test</h2>
  <p>This email verifies that the RescueRadar email service is working.</p>
  <div style="background: #f0f9ff; padding: 15px; border-radius: 6px; margin: 20px 0;">
    <p><strong>Test Type:</strong> {test_type}</p>
    <p><strong>Method:</strong> {method}</p>
    <p><strong>Time:</strong> {time}</p>
  </div>
</div>"#,
        test_type = test_type,
        method = method,
        time = Utc::now().format("%B %d, %Y at %I:%M %p"),
    );
    (subject, html)
}

/// Wrap caller-supplied plain text in the standard HTML frame.
pub fn custom_text(content: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <pre style="white-space: pre-wrap; font-family: Arial, sans-serif;">{content}</pre>
  <p style="color: #6b7280; font-size: 12px; text-align: center; margin-top: 30px;">
    Sent via RescueRadar Email Service - {time}
  </p>
</div>"#,
        content = content,
        time = Utc::now().format("%B %d, %Y at %I:%M %p"),
    )
}

pub fn bulk_notification(message: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #2563eb;">RescueRadar Notification</h2>
  <div style="background: #f9fafb; padding: 20px; border-radius: 8px;">
    <p>{}</p>
  </div>
  <p style="color: #6b7280; font-size: 12px; margin-top: 30px;">
    This notification was sent by RescueRadar System
  </p>
</div>"#,
        message
    )
}

pub fn status_update(report_id: &str, status: &str, update_message: &str) -> (String, String) {
    let subject = format!("Report #{} Status Update: {}", short_id(report_id), status);
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #1e40af;">Report Status Update</h2>
  <div style="background: #f9fafb; padding: 20px; border-radius: 8px;">
    <p><strong>Report ID:</strong> {id}</p>
    <p><strong>New Status:</strong> {status}</p>
    <p>{message}</p>
    <p><strong>Updated:</strong> {time}</p>
  </div>
</div>"#,
        id = report_id,
        status = status,
        message = update_message,
        time = Utc::now().format("%Y-%m-%d %H:%M:%S"),
    );
    (subject, html)
}

/// Catalog served by the email-templates endpoint.
pub fn catalog() -> serde_json::Value {
    serde_json::json!({
        "rescue_alert": {
            "name": "Rescue Team Alert",
            "description": "Emergency alert sent to rescue teams",
            "variables": ["report_id", "urgency_level", "animal_type", "situation_type",
                          "location", "description", "contact_name", "contact_phone", "contact_email"]
        },
        "user_confirmation": {
            "name": "User Confirmation",
            "description": "Confirmation email sent to users who submit reports",
            "variables": ["contact_name", "report_id", "location", "urgency_level"]
        },
        "status_update": {
            "name": "Status Update",
            "description": "Report status update notification",
            "variables": ["report_id", "status", "update_message"]
        },
        "test_email": {
            "name": "Test Email",
            "description": "Email service functionality test",
            "variables": ["test_type"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_report() -> Report {
        Report {
            id: "0a1b2c3d-1111-2222-3333-444455556666".into(),
            description: "injured dog".into(),
            location: "central park".into(),
            coordinates: Some(crate::models::Coordinates { lat: 40.78, lng: -73.96 }),
            contact_name: Some("Jo".into()),
            contact_email: None,
            contact_phone: None,
            urgency_level: "emergency".into(),
            animal_type: Some("dog".into()),
            situation_type: None,
            image_url: None,
            ai_analysis: None,
            status: "active".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_html_to_text_strips_tags() {
        let text = html_to_text("<h1>Hello</h1>\n<p>world  now</p>");
        assert_eq!(text, "Hello world now");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0a1b2c3d-1111"), "0a1b2c3d");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_rescue_alert_contains_urgency_and_map() {
        let (subject, html) = rescue_alert(&sample_report());
        assert!(subject.starts_with("EMERGENCY"));
        assert!(subject.contains("0a1b2c3d"));
        assert!(html.contains("#dc2626"));
        assert!(html.contains("google.com/maps?q=40.78,-73.96"));
        assert!(html.contains("central park"));
    }

    #[test]
    fn test_urgency_colors() {
        assert_eq!(urgency_color("emergency"), "#dc2626");
        assert_eq!(urgency_color("HIGH"), "#ea580c");
        assert_eq!(urgency_color("normal"), "#16a34a");
        assert_eq!(urgency_color("low"), "#16a34a");
    }

    #[test]
    fn test_user_confirmation_defaults_name() {
        let mut report = sample_report();
        report.contact_name = None;
        let (_, html) = user_confirmation(&report);
        assert!(html.contains("Dear Animal Advocate"));
    }

    #[test]
    fn test_direct_alert_defaults() {
        let (subject, html, text) = direct_alert("r-1", None, None, None);
        assert!(subject.contains("r-1"));
        assert!(html.contains("N/A"));
        assert!(text.contains("N/A"));
    }
}
