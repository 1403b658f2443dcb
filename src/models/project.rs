//! Project metadata served by every endpoint

use serde::{Deserialize, Serialize};

/// A named team member and their role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
}

impl TeamMember {
    fn new(name: &str, role: &str) -> Self {
        Self {
            name: name.to_string(),
            role: role.to_string(),
        }
    }
}

/// Static project metadata returned as the `data` field of success responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub project_name: String,
    pub manager: String,
    pub dev_team: Vec<TeamMember>,
    pub testing_team: Vec<TeamMember>,
    pub description: String,
    pub features: Vec<String>,
    pub modules: Vec<String>,
}

impl ProjectInfo {
    /// The AI Hub project record
    pub fn ai_hub() -> Self {
        Self {
            project_name: "AI Hub".to_string(),
            manager: "Gowtham".to_string(),
            dev_team: vec![
                TeamMember::new("Mohammed Rishal", "Full stack Developer"),
                TeamMember::new("Richu", "Front Developer & Prompt Engineer"),
                TeamMember::new("Muneeb", "Full stack Developer"),
                TeamMember::new("Zaheer", "ML Engineer"),
                TeamMember::new("Harsh Vardhan", "AI/ML Engineer"),
                TeamMember::new("Afsal", "ML Engineer"),
                TeamMember::new("Gnanasekaran Perumal", "Back-end Developer"),
            ],
            testing_team: vec![
                TeamMember::new(
                    "Somashekar N",
                    "Manual & Automation Test Engineer, Prompt Engineer",
                ),
                TeamMember::new(
                    "Swathi",
                    "Manual & Automation Test Engineer, Prompt Engineer",
                ),
            ],
            description: "AI Hub on Neutrinos is a framework for integrating AI/ML into apps \
                          with NLP, GenAI, analytics, and automation."
                .to_string(),
            features: [
                "Ready-to-use AI Models",
                "Custom Model Integration",
                "API-First AI as a Service",
                "Workflow Automation",
                "Scalability for Enterprises",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            modules: [
                "Dashboard",
                "Prediction",
                "Extraction",
                "Tokens",
                "Assistant",
                "Knowledge",
                "Audit Logs",
                "Deployment",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self::ai_hub()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_hub_record() {
        let info = ProjectInfo::ai_hub();

        assert_eq!(info.project_name, "AI Hub");
        assert_eq!(info.manager, "Gowtham");
        assert_eq!(info.dev_team.len(), 7);
        assert_eq!(info.testing_team.len(), 2);
        assert_eq!(info.features.len(), 5);
        assert_eq!(info.modules.len(), 8);
        assert!(info.description.starts_with("AI Hub on Neutrinos"));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(ProjectInfo::ai_hub()).unwrap();

        assert_eq!(json["project_name"], "AI Hub");
        assert_eq!(json["dev_team"][0]["name"], "Mohammed Rishal");
        assert_eq!(json["dev_team"][0]["role"], "Full stack Developer");
        assert_eq!(json["modules"][6], "Audit Logs");
    }
}
