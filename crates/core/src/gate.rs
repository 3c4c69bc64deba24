use crate::intent::contains_any;

const MIN_MESSAGE_CHARS: usize = 5;
const MIN_AMBIGUOUS_CHARS: usize = 8;

const CASUAL_PHRASES: &[&str] = &[
    "thank you",
    "thanks",
    "thx",
    "hello",
    "hi",
    "hey",
    "bye",
    "goodbye",
    "see you",
    "ok",
    "okay",
    "sure",
    "cool",
    "nice",
    "great",
    "awesome",
    "sorry",
    "please",
    "how are you",
    "what's up",
    "lol",
    "haha",
];

const TRAVEL_KEYWORDS: &[&str] = &[
    "trip",
    "visit",
    "travel",
    "plan",
    "itinerary",
    "day",
    "days",
    "budget",
    "cost",
    "attraction",
    "hotel",
    "restaurant",
    "food",
    "eat",
    "transport",
    "train",
    "flight",
    "taxi",
    "bus",
    "weather",
    "season",
    "when",
    "where",
    "what to do",
    "what to see",
    "best",
    "place",
    "places",
    "activity",
    "adventure",
    "accommodation",
    "stay",
    "tour",
    "guide",
    "explore",
    "discover",
    "temple",
    "museum",
    "beach",
    "mountain",
    "culture",
    "language",
    "schedule",
    "agenda",
    "things to do",
    "must see",
    "must-see",
];

/// Decides whether a message is worth a model call at all.
///
/// Travel keywords always admit, casual phrases without one are rejected, and
/// anything else long enough to be ambiguous is passed on.
pub fn is_travel_query(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    let length = lower.chars().count();

    if length < MIN_MESSAGE_CHARS {
        return false;
    }

    let casual = is_casual(&lower);
    let travel = has_travel_keyword(&lower);

    if casual && !travel {
        return false;
    }

    if travel {
        return true;
    }

    length >= MIN_AMBIGUOUS_CHARS
}

/// Whole-phrase match: the message is, starts with, or ends with a casual phrase.
pub fn is_casual(lower: &str) -> bool {
    CASUAL_PHRASES.iter().any(|phrase| {
        lower == *phrase
            || lower
                .strip_prefix(phrase)
                .is_some_and(|rest| rest.starts_with(' '))
            || lower
                .strip_suffix(phrase)
                .is_some_and(|rest| rest.ends_with(' '))
    })
}

pub fn has_travel_keyword(lower: &str) -> bool {
    contains_any(lower, TRAVEL_KEYWORDS)
}
