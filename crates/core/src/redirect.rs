use crate::intent::contains_any;

const THANK_YOU_PHRASES: &[&str] = &["thank you", "thanks", "thx", "appreciate"];

const SUPPORTED_TOPICS_WITH_LOCATION: &[&str] = &[
    "Creating day-by-day itineraries",
    "Budget planning",
    "Attraction recommendations",
    "Best time to visit",
    "Practical travel tips",
];

const SUPPORTED_TOPICS_GENERIC: &[&str] = &[
    "Itineraries and what to do",
    "Budget and costs",
    "Attractions and places to visit",
    "Best time to travel",
    "Travel logistics and tips",
];

/// Canned reply for a message the travel gate turned away.
pub fn redirect_message(location: Option<&str>, message: &str) -> String {
    let lower = message.trim().to_lowercase();
    let location = location.map(str::trim).filter(|name| !name.is_empty());

    if contains_any(&lower, THANK_YOU_PHRASES) {
        return match location {
            Some(name) => format!(
                "You're welcome! Feel free to ask me anything else about your {name} trip."
            ),
            None => {
                "You're welcome! Select a destination and I'll help you plan your trip.".to_string()
            }
        };
    }

    match location {
        Some(name) => format!(
            "I'm here to help you plan your {name} trip! What would you like to know?\n\nI can help with:\n{}\n\nWhat aspect of your {name} trip would you like help with?",
            bullet_list(SUPPORTED_TOPICS_WITH_LOCATION)
        ),
        None => format!(
            "I'm your travel planning assistant! Please select a destination first, then ask me about:\n\n{}\n\nWhich destination would you like to explore?",
            bullet_list(SUPPORTED_TOPICS_GENERIC)
        ),
    }
}

fn bullet_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
