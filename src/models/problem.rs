use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hvac,
    Plumber,
    Electrician,
    Roofer,
    Appliance,
    Pest,
    General,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Hvac,
        Category::Plumber,
        Category::Electrician,
        Category::Roofer,
        Category::Appliance,
        Category::Pest,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hvac => "hvac",
            Category::Plumber => "plumber",
            Category::Electrician => "electrician",
            Category::Roofer => "roofer",
            Category::Appliance => "appliance",
            Category::Pest => "pest",
            Category::General => "general",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "hvac" => Category::Hvac,
            "plumber" | "plumbing" => Category::Plumber,
            "electrician" | "electrical" => Category::Electrician,
            "roofer" | "roofing" => Category::Roofer,
            "appliance" => Category::Appliance,
            "pest" => Category::Pest,
            _ => Category::General,
        }
    }

    /// Human label used in vendor names and search fallbacks.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Hvac => "HVAC",
            Category::Plumber => "Plumbing",
            Category::Electrician => "Electrical",
            Category::Roofer => "Roofing",
            Category::Appliance => "Appliance Repair",
            Category::Pest => "Pest Control",
            Category::General => "Handyman",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Emergency,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Emergency => "emergency",
        }
    }

    /// Maps an explicit UI choice to an urgency. Unknown choices yield `None`
    /// so the classifier's value is kept.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim().to_lowercase().as_str() {
            "low" | "flexible" => Some(Urgency::Low),
            "medium" | "normal" => Some(Urgency::Medium),
            "high" | "urgent" | "asap" => Some(Urgency::High),
            "emergency" => Some(Urgency::Emergency),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProblemSummary {
    pub transcript: String,
    pub summary: String,
    pub category: Category,
    pub urgency: Urgency,
    pub symptoms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_serial: Option<String>,
}

impl ProblemSummary {
    pub fn with_urgency(&self, urgency: Urgency) -> Self {
        Self {
            urgency,
            ..self.clone()
        }
    }
}
