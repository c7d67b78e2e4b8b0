use serde::{Deserialize, Serialize};

/// Keyword lists checked in strict precedence order. Matching is
/// substring-based over the case-folded description, not word-boundary
/// based, so "abandoned" also matches inside "abandonedly".
const EMERGENCY_KEYWORDS: [&str; 8] = [
    "emergency",
    "dying",
    "bleeding",
    "severe",
    "critical",
    "urgent",
    "immediate",
    "life-threatening",
];

const HIGH_KEYWORDS: [&str; 8] = [
    "injured", "hurt", "sick", "abuse", "neglect", "abandoned", "trapped", "danger",
];

const LOW_KEYWORDS: [&str; 5] = ["stray", "lost", "mild", "minor", "observation"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Emergency,
    High,
    Normal,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Emergency => "emergency",
            Severity::High => "high",
            Severity::Normal => "normal",
            Severity::Low => "low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub severity: Severity,
    pub category: String,
    pub urgency_level: Severity,
    pub response_team: String,
    pub recommended_action: String,
    pub full_analysis: String,
    /// Free-text addendum from the optional LLM enhancement. Advisory only;
    /// it never changes the tier computed above.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_enhancement: Option<String>,
}

/// Classify a report description into a severity tier.
///
/// Pure function of the description text: first keyword list that matches
/// wins, so a description containing both an emergency token and a low token
/// is always `emergency`. An empty description falls through to `normal`.
/// A supplied location is appended to `full_analysis` and never affects the
/// tier.
pub fn classify(description: &str, location: Option<&str>) -> Classification {
    let text = description.to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

    let (severity, response_team, recommended_action, full_analysis) =
        if contains_any(&EMERGENCY_KEYWORDS) {
            (
                Severity::Emergency,
                "emergency_vet",
                "IMMEDIATE ACTION REQUIRED: Contact emergency veterinary services and animal rescue teams immediately.",
                "Emergency situation detected. Immediate veterinary attention and rescue response needed.",
            )
        } else if contains_any(&HIGH_KEYWORDS) {
            (
                Severity::High,
                "veterinary_rescue",
                "High priority response needed. Contact local animal welfare organizations and veterinary services.",
                "High priority situation requiring prompt attention from qualified animal welfare professionals.",
            )
        } else if contains_any(&LOW_KEYWORDS) {
            (
                Severity::Low,
                "animal_control",
                "Standard monitoring and welfare check recommended.",
                "Standard animal welfare check and monitoring recommended.",
            )
        } else {
            (
                Severity::Normal,
                "animal_welfare",
                "Regular animal welfare assessment recommended.",
                "Standard animal welfare assessment and appropriate response measures recommended.",
            )
        };

    let mut full_analysis = full_analysis.to_string();
    if let Some(loc) = location.filter(|l| !l.is_empty()) {
        full_analysis.push_str(&format!(
            " Location: {}. Coordinate with local authorities in this area.",
            loc
        ));
    }

    Classification {
        severity,
        category: "general".to_string(),
        urgency_level: severity,
        response_team: response_team.to_string(),
        recommended_action: recommended_action.to_string(),
        full_analysis,
        ai_enhancement: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emergency_tokens_win() {
        for desc in [
            "there is an emergency",
            "the dog is dying",
            "cat bleeding from paw",
            "severe wound on leg",
            "critical condition",
            "urgent help needed",
            "needs immediate help",
            "life-threatening situation",
        ] {
            let c = classify(desc, None);
            assert_eq!(c.severity, Severity::Emergency, "desc: {}", desc);
            assert_eq!(c.response_team, "emergency_vet");
        }
    }

    #[test]
    fn test_emergency_wins_over_any_other_token() {
        // Contains a high token ("injured"), a low token ("stray") and an
        // emergency token ("bleeding"); precedence says emergency.
        let c = classify("injured stray dog bleeding heavily", None);
        assert_eq!(c.severity, Severity::Emergency);
        assert_eq!(c.urgency_level, Severity::Emergency);
    }

    #[test]
    fn test_high_wins_over_low() {
        let c = classify("injured stray dog near the park", None);
        assert_eq!(c.severity, Severity::High);
        assert_eq!(c.response_team, "veterinary_rescue");
    }

    #[test]
    fn test_low_tier() {
        let c = classify("stray cat seen near the station", None);
        assert_eq!(c.severity, Severity::Low);
        assert_eq!(c.response_team, "animal_control");
    }

    #[test]
    fn test_no_token_is_normal() {
        let c = classify("cat sleeping on porch", None);
        assert_eq!(c.severity, Severity::Normal);
        assert_eq!(c.response_team, "animal_welfare");
    }

    #[test]
    fn test_empty_description_is_normal() {
        let c = classify("", None);
        assert_eq!(c.severity, Severity::Normal);
    }

    #[test]
    fn test_case_insensitive() {
        let upper = classify("BLEEDING", None);
        let lower = classify("bleeding", None);
        assert_eq!(upper.severity, lower.severity);
        assert_eq!(upper.severity, Severity::Emergency);
    }

    #[test]
    fn test_substring_match_not_word_boundary() {
        // "abandoned" matches inside "abandonedly".
        let c = classify("the dog was abandonedly left behind", None);
        assert_eq!(c.severity, Severity::High);
    }

    #[test]
    fn test_mixed_emergency_description() {
        let c = classify(
            "injured dog needs immediate help, bleeding from leg",
            Some("central park"),
        );
        assert_eq!(c.severity, Severity::Emergency);
        assert_eq!(c.response_team, "emergency_vet");
    }

    #[test]
    fn test_location_suffix_does_not_change_tier() {
        let without = classify("stray cat seen near the station", None);
        let with = classify("stray cat seen near the station", Some("downtown"));
        assert_eq!(without.severity, with.severity);
        assert!(with.full_analysis.contains("Location: downtown."));
        assert!(with.full_analysis.starts_with(without.full_analysis.as_str()));
    }

    #[test]
    fn test_empty_location_ignored() {
        let c = classify("cat sleeping on porch", Some(""));
        assert!(!c.full_analysis.contains("Location:"));
    }

    #[test]
    fn test_classification_serializes_lowercase_tiers() {
        let c = classify("urgent", None);
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["severity"], "emergency");
        assert_eq!(v["urgency_level"], "emergency");
        assert!(v.get("ai_enhancement").is_none());
    }
}
