use crate::intent::keywords_for;
use crate::models::{Budget, LocationRecord, QueryType};

const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_COST_CURRENCY: &str = "USD";
const KEYWORDS_SHOWN_PER_TYPE: usize = 5;

/// Builds the lone system instruction sent ahead of the conversation.
///
/// With a location the prompt carries the destination data and a strict
/// per-query-type output layout; without one it falls back to a shorter
/// generic template. Conversation history is never embedded here.
pub fn build_system_prompt(location: Option<&LocationRecord>) -> String {
    match location {
        Some(record) => location_prompt(record),
        None => generic_prompt(),
    }
}

fn location_prompt(record: &LocationRecord) -> String {
    let name = record.name.trim();
    let upper = name.to_uppercase();
    let cost_currency = cost_currency(record);

    let query_sections = QueryType::ALL_SCORED
        .iter()
        .enumerate()
        .map(|(index, kind)| query_type_section(index + 1, *kind, name))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are a professional TRAVEL PLANNING ASSISTANT SPECIALIZED IN {upper}.

BEHAVIOR RULES:
1. NEVER reply to casual greetings such as "thanks", "hi", "hello", "ok" or "cool"
2. NEVER say "You're welcome!" or "Can I help with anything else?"
3. NEVER engage in chit-chat or small talk
4. ALWAYS steer non-travel messages back to trip planning
5. ONLY help with travel in {name}

IF THE USER SENDS A CASUAL MESSAGE (thanks, hello, hi, ok, great, cool, etc.):
RESPOND WITH: "I'm here to help you plan your {name} trip! What would you like to know? I can help with itineraries, budgets, attractions, and travel tips."

IF THE USER SENDS AN OFF-TOPIC MESSAGE:
RESPOND WITH: "Let's focus on your {name} trip! What aspect would you like help with? Itinerary planning, budget, attractions, or practical travel tips?"

Give detailed answers ONLY to actual travel questions.

DESTINATION: {name}

ATTRACTIONS IN {upper}:
{attractions}

TRAVEL TIPS FOR {upper}:
{tips}

LOCATION FACTS:
- Best Time to Visit: {best_time}
- Currency: {currency}
- Language: {language}

{budget}

YOUR RESPONSIBILITIES:
1. READ the user's question carefully
2. IF IT IS NOT ABOUT TRAVEL: redirect politely to trip planning
3. IF IT IS ABOUT TRAVEL: answer with detailed, structured information
4. USE the destination data above wherever it applies
5. FORMAT every answer as structured lists

QUERY TYPE HANDLING:

{query_sections}

FORMATTING RULES:
1. ALWAYS use headers ending in a colon (Day 1:, Accommodation:, Attraction Name:)
2. ALWAYS use hyphen (-) bullet points for lists
3. ALWAYS give specific numbers (prices, times, ratings, distances)
4. KEEP each bullet to 1-2 lines
5. SEPARATE sections with blank lines
6. NEVER write free-form paragraphs
7. ONLY reference attractions listed in the destination data above
8. STATE costs in {cost_currency}
9. GIVE an estimated duration for every activity
10. ASK a clarifying question when key details are missing (number of days, budget level, travel style)

WHEN TO ASK A CLARIFYING QUESTION:
- Itinerary request without a number of days: "How many days will you be in {name}?"
- Budget question without a trip length: "How many days are you planning to stay?"
- Activity request without an interest type: "What type of activities interest you? (adventure, relaxation, culture, family-friendly, etc.)"
- Vague question: ask for 1-2 missing details, then answer

Be professional, helpful and SPECIFIC to {name}. Never give generic travel advice."#,
        attractions = format_attractions(record),
        tips = format_tips(record),
        best_time = or_na(record.best_time_to_visit.as_deref()),
        currency = or_na(record.currency.as_deref()),
        language = or_na(record.language.as_deref()),
        budget = format_budget(&upper, record.budget.as_ref()),
    )
}

fn generic_prompt() -> String {
    let query_types = QueryType::ALL_SCORED
        .iter()
        .map(|kind| format!("- {}: {}", type_title(*kind), generic_action(*kind)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a professional TRAVEL PLANNING ASSISTANT.

No destination has been selected yet. If the question needs one, ask which destination the user is planning for before giving details.

QUERY TYPES:
{query_types}

RESPONSE FORMAT:
[Header]:
- Item 1: Details
- Item 2: Details

RULES:
1. Use headers ending in a colon
2. Use hyphen (-) bullet points
3. Include specific numbers for costs and durations
4. Keep each item to 2 lines at most
5. Never write paragraphs
6. Ask a clarifying question when details are missing (destination, number of days, interests)
7. Redirect off-topic messages back to travel planning

Be professional and helpful."#
    )
}

fn query_type_section(number: usize, kind: QueryType, name: &str) -> String {
    let keywords = keywords_for(kind)
        .iter()
        .take(KEYWORDS_SHOWN_PER_TYPE)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "TYPE {number}: {} (keywords: {keywords})\nACTION: {}\nFORMAT:\n{}",
        type_title(kind).to_uppercase(),
        generic_action(kind),
        response_layout(kind, name)
    )
}

fn type_title(kind: QueryType) -> &'static str {
    match kind {
        QueryType::Itinerary => "Itinerary request",
        QueryType::Budget => "Budget question",
        QueryType::Attraction => "Attraction question",
        QueryType::Time => "Time/season question",
        QueryType::Practical => "Practical question",
        QueryType::Activity => "Activity/interest question",
        QueryType::General => "General question",
    }
}

fn generic_action(kind: QueryType) -> &'static str {
    match kind {
        QueryType::Itinerary => "Create a day-by-day itinerary",
        QueryType::Budget => "Give a detailed cost breakdown",
        QueryType::Attraction => "Describe attractions with practical details",
        QueryType::Time => "Explain seasons, weather and crowds",
        QueryType::Practical => "Give practical logistics advice",
        QueryType::Activity => "Recommend activities matching the user's interests",
        QueryType::General => "Answer briefly and ask what the user needs",
    }
}

fn response_layout(kind: QueryType, name: &str) -> String {
    match kind {
        QueryType::Itinerary => "Day 1: [Theme of the day]
- Morning (8:00 AM): [Attraction or activity with a short description]
- Afternoon (1:00 PM): [Attraction or activity with a short description]
- Evening (6:00 PM): [Attraction or activity with a short description]
- Meals: [Cuisine or restaurant style]
- Day total cost: XX-YY"
            .to_string(),
        QueryType::Budget => format!(
            "Budget Analysis for [number] Days in {name}:
- Accommodation: XX/night x [days] = XXX total
- Food: XX/day x [days] = XXX total
- Transportation: XX/day x [days] = XXX total
- Activities: XX/day x [days] = XXX total
- TOTAL ESTIMATED COST: XXX-XXX

Budget Tips:
- [Money-saving tip 1]
- [Money-saving tip 2]"
        ),
        QueryType::Attraction => "[Attraction Name]:
- What: [Short description]
- Why Visit: [Why it is worth going]
- Best Time: [Time of day or season]
- Duration: [XX minutes/hours]
- Cost: [Entry fee or price range]
- Getting There: [How to reach it]
- Insider Tip: [One practical piece of advice]"
            .to_string(),
        QueryType::Time => format!(
            "Best Time to Visit {name}:
- Ideal Season: [Season and months]
  Weather: [Description]
  Crowds: [Crowd level]
  Price: [Relative cost]
- Alternative Season: [Season and months]
  Weather: [Description]
  Avoid: [Why, if applicable]"
        ),
        QueryType::Practical => "[Topic, e.g. Transportation/Food/Language]:
- [Advice 1]: [Details]
- [Advice 2]: [Details]
- [Advice 3]: [Details]

Important Notes:
- [Key practical tip]
- [Safety or cultural consideration]"
            .to_string(),
        QueryType::Activity => format!(
            "[Interest Type] Activities in {name}:
- [Activity 1]: [Description, duration, cost, location]
- [Activity 2]: [Description, duration, cost, location]
- [Activity 3]: [Description, duration, cost, location]"
        ),
        QueryType::General => "[Header]:
- [Item]: [Details]"
            .to_string(),
    }
}

fn format_attractions(record: &LocationRecord) -> String {
    if record.attractions.is_empty() {
        return format!("- {NOT_AVAILABLE}");
    }

    record
        .attractions
        .iter()
        .map(|attraction| {
            let name = attraction.name.trim();
            let description = attraction.description.trim();
            let rating = attraction
                .rating
                .map(|value| format!("{value:?}"))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            format!(
                "- {}: {} (Rating: {})",
                if name.is_empty() { NOT_AVAILABLE } else { name },
                if description.is_empty() { NOT_AVAILABLE } else { description },
                rating
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_tips(record: &LocationRecord) -> String {
    if record.tips.is_empty() {
        return format!("- {NOT_AVAILABLE}");
    }

    record
        .tips
        .iter()
        .map(|tip| format!("- {tip}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_budget(upper_name: &str, budget: Option<&Budget>) -> String {
    let empty = Budget::default();
    let budget = budget.unwrap_or(&empty);
    let currency = budget
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_COST_CURRENCY);

    format!(
        "BUDGET REFERENCE FOR {upper_name}:
- Budget Low: {}/day (hostels, street food, free attractions)
- Budget Mid: {}/day (mid-range hotels, local restaurants, paid attractions)
- Budget High: {}/day (luxury hotels, fine dining, premium experiences)
- Notes: {}",
        format_amount(budget.daily_low, currency),
        format_amount(budget.daily_mid, currency),
        format_amount(budget.daily_high, currency),
        or_na(budget.notes.as_deref())
    )
}

fn format_amount(amount: Option<f64>, currency: &str) -> String {
    match amount {
        Some(value) if value.fract() == 0.0 => format!("{value:.0} {currency}"),
        Some(value) => format!("{value:.2} {currency}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn cost_currency(record: &LocationRecord) -> &str {
    record
        .budget
        .as_ref()
        .and_then(|budget| budget.currency.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_COST_CURRENCY)
}

fn or_na(value: Option<&str>) -> &str {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(NOT_AVAILABLE)
}
