use crate::models::{Category, ProblemSummary, Urgency};

// Declaration order doubles as the tie-break priority.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Hvac,
        &[
            "ac", "a/c", "air condition", "hvac", "furnace", "heat pump", "heater", "heating",
            "thermostat", "cooling", "vent", "duct", "compressor", "refrigerant",
        ],
    ),
    (
        Category::Plumber,
        &[
            "leak", "pipe", "drain", "clog", "toilet", "faucet", "sink", "water heater",
            "sewer", "plumb", "shower", "garbage disposal",
        ],
    ),
    (
        Category::Electrician,
        &[
            "electric", "outlet", "breaker", "wiring", "wire", "light", "switch", "power",
            "spark", "circuit", "fuse",
        ],
    ),
    (
        Category::Roofer,
        &["roof", "shingle", "gutter", "attic", "skylight", "flashing"],
    ),
    (
        Category::Appliance,
        &[
            "washer", "dryer", "dishwasher", "refrigerator", "fridge", "oven", "stove",
            "microwave", "freezer", "ice maker", "appliance",
        ],
    ),
    (
        Category::Pest,
        &[
            "pest", "mice", "mouse", "rat", "roach", "cockroach", "termite", "ant", "bug",
            "bed bug", "wasp", "rodent",
        ],
    ),
];

const URGENCY_KEYWORDS: &[(Urgency, &[&str])] = &[
    (
        Urgency::Emergency,
        &[
            "emergency", "flood", "fire", "smoke", "gas smell", "smell gas", "sparking",
            "burst", "no heat", "carbon monoxide",
        ],
    ),
    (
        Urgency::High,
        &["urgent", "asap", "right away", "immediately", "today", "not working"],
    ),
    (Urgency::Medium, &["soon", "this week", "broken", "leaking"]),
    (
        Urgency::Low,
        &["whenever", "no rush", "not urgent", "eventually", "next month", "flexible"],
    ),
];

const SYMPTOMS: &[&str] = &[
    "leaking",
    "dripping",
    "not cooling",
    "not heating",
    "no hot water",
    "noisy",
    "strange noise",
    "burning smell",
    "smell",
    "won't turn on",
    "not working",
    "broken",
    "clogged",
    "sparking",
    "flickering",
    "tripping",
    "frozen",
    "cracked",
    "water damage",
];

const SUMMARY_MAX_CHARS: usize = 140;

/// Classifies a free-text problem description. Never fails: unmatched input
/// falls back to `general` / `medium`.
pub fn analyze_problem(transcript: &str) -> ProblemSummary {
    let text = transcript.to_lowercase();

    ProblemSummary {
        transcript: transcript.trim().to_string(),
        summary: summarize(transcript),
        category: classify_category(&text),
        urgency: classify_urgency(&text),
        symptoms: extract_symptoms(&text),
        model_serial: extract_model_serial(transcript),
    }
}

pub fn classify_category(text: &str) -> Category {
    let mut best = Category::General;
    let mut best_hits = 0;

    for (category, keywords) in CATEGORY_KEYWORDS {
        let hits = keywords.iter().filter(|k| text.contains(*k)).count();
        // Strictly greater keeps the earlier category on ties.
        if hits > best_hits {
            best = *category;
            best_hits = hits;
        }
    }

    best
}

pub fn classify_urgency(text: &str) -> Urgency {
    URGENCY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(urgency, _)| *urgency)
        .unwrap_or(Urgency::Medium)
}

fn extract_symptoms(text: &str) -> Vec<String> {
    SYMPTOMS
        .iter()
        .filter(|s| text.contains(*s))
        .map(|s| s.to_string())
        .collect()
}

fn summarize(transcript: &str) -> String {
    let trimmed = transcript.trim();
    let first_sentence = trimmed
        .split_inclusive(['.', '!', '?'])
        .next()
        .unwrap_or(trimmed)
        .trim();

    if first_sentence.chars().count() <= SUMMARY_MAX_CHARS {
        return first_sentence.to_string();
    }

    let cut: String = first_sentence.chars().take(SUMMARY_MAX_CHARS - 3).collect();
    format!("{}...", cut.trim_end())
}

fn extract_model_serial(transcript: &str) -> Option<String> {
    let words: Vec<&str> = transcript.split_whitespace().collect();

    for (i, word) in words.iter().enumerate() {
        let lower = word.to_lowercase();
        let lower = lower.trim_end_matches([':', '#']);
        if lower != "model" && lower != "serial" {
            continue;
        }

        let candidate = words[i + 1..]
            .iter()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
            .find(|w| !matches!(w.to_lowercase().as_str(), "" | "number" | "no" | "is"));

        if let Some(token) = candidate {
            if token.chars().any(|c| c.is_ascii_digit()) {
                return Some(token.to_uppercase());
            }
        }
    }

    None
}
