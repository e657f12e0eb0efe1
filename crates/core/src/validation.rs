//! Input validation.
//!
//! Holds the keyword-based relevance check for service descriptions and the format checks
//! applied to availability slots before they are stored.

use api_shared::DescriptionValidationRes;
use chrono::{NaiveDate, NaiveTime};

use crate::{CoreError, CoreResult};

const MIN_WORDS: usize = 3;

const VALID_MESSAGE: &str = "Got it! We'll find you the right professional.";
const TOO_SHORT_MESSAGE: &str = "Please provide more details about your issue.";
const GIBBERISH_MESSAGE: &str =
    "That doesn't look like a valid description. Please describe your issue clearly.";
const UNRELATED_MESSAGE: &str =
    "This doesn't seem related to the service. Please describe a specific issue.";

fn category_keywords(category_id: &str) -> &'static [&'static str] {
    match category_id {
        "plumbing" => &[
            "tap", "faucet", "leak", "leaking", "pipe", "drain", "clogged", "blocked", "sink",
            "toilet", "flush", "shower", "geyser", "heater", "water", "drip", "dripping",
            "valve", "tank", "pipeline", "sewage", "overflow", "bathroom", "kitchen", "washing",
            "basin", "mixer", "plumber", "plumbing", "fitting", "joint", "connection",
        ],
        "electrician" => &[
            "wire", "wiring", "switch", "socket", "plug", "light", "bulb", "fan", "circuit",
            "breaker", "mcb", "fuse", "short", "spark", "voltage", "inverter", "battery",
            "generator", "board", "panel", "earthing", "grounding", "electric", "electrical",
            "current", "power", "meter", "led", "tube", "chandelier", "dimmer",
        ],
        "cleaning" => &[
            "clean", "cleaning", "dust", "dirty", "stain", "wash", "mop", "sweep", "scrub",
            "deep", "carpet", "sofa", "upholstery", "kitchen", "bathroom", "floor", "tile",
            "window", "glass", "mattress", "curtain", "sanitize", "disinfect", "polish",
        ],
        "painting" => &[
            "paint", "painting", "wall", "ceiling", "color", "colour", "primer", "putty",
            "waterproof", "waterproofing", "crack", "peel", "peeling", "texture", "coat",
            "enamel", "distemper", "emulsion", "exterior", "interior", "damp", "seepage",
        ],
        "ac_repair" => &[
            "ac", "air", "conditioner", "conditioning", "cooling", "cool", "compressor", "gas",
            "refrigerant", "filter", "coil", "split", "window", "duct", "thermostat", "remote",
            "temperature", "frost", "ice", "freeze", "noise", "smell", "service", "servicing",
        ],
        "salon" => &[
            "hair", "haircut", "cut", "trim", "style", "styling", "color", "colour", "facial",
            "face", "skin", "makeup", "bridal", "spa", "massage", "nail", "manicure",
            "pedicure", "wax", "waxing", "threading", "bleach", "shave", "beard", "grooming",
        ],
        "pest_control" => &[
            "pest", "cockroach", "roach", "termite", "rat", "mice", "mouse", "mosquito", "ant",
            "ants", "bug", "bugs", "insect", "spider", "bed", "bedbug", "lizard", "snake", "bee",
            "wasp", "fly", "flies", "infestation", "fumigation", "spray",
        ],
        "carpentry" => &[
            "wood", "wooden", "furniture", "door", "cabinet", "shelf", "shelves", "table",
            "chair", "bed", "wardrobe", "drawer", "cupboard", "frame", "hinge", "lock", "handle",
            "polish", "laminate", "plywood", "carpenter", "carpentry", "assemble", "assembly",
            "dismantle", "repair",
        ],
        _ => &[],
    }
}

const GENERIC_KEYWORDS: &[&str] = &[
    "repair", "fix", "broken", "damage", "damaged", "replace", "install", "installation",
    "maintain", "maintenance", "service", "servicing", "check", "inspect", "inspection", "not",
    "working", "problem", "issue", "help", "need", "emergency", "urgent", "new", "old", "change",
    "setup", "fitting", "work",
];

/// Example description offered when a description is rejected.
pub fn example_for(category_id: &str) -> &'static str {
    match category_id {
        "plumbing" => "e.g., Kitchen tap is leaking and needs replacement",
        "electrician" => "e.g., Power socket not working in the bedroom",
        "cleaning" => "e.g., Need deep cleaning for 2BHK apartment",
        "painting" => "e.g., Walls have cracks and need repainting",
        "ac_repair" => "e.g., AC not cooling properly, needs gas refill",
        "salon" => "e.g., Need a haircut and facial at home",
        "pest_control" => "e.g., Cockroach infestation in kitchen area",
        "carpentry" => "e.g., Wardrobe door hinge is broken",
        _ => "e.g., Describe what needs to be fixed or serviced",
    }
}

/// Lowercased runs of ASCII letters.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|t| !t.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

fn is_gibberish(token: &str) -> bool {
    token.len() >= 4 && !token.contains(['a', 'e', 'i', 'o', 'u'])
}

fn rejected(category_id: &str, message: &str) -> DescriptionValidationRes {
    DescriptionValidationRes {
        is_valid: false,
        message: message.to_owned(),
        suggestion: Some(example_for(category_id).to_owned()),
    }
}

/// Decide whether `description` plausibly asks for a `category_id` service.
pub fn validate_description(category_id: &str, description: &str) -> DescriptionValidationRes {
    let tokens = tokenize(description);

    if tokens.len() < MIN_WORDS {
        return rejected(category_id, TOO_SHORT_MESSAGE);
    }

    let gibberish = tokens.iter().filter(|t| is_gibberish(t)).count();
    if gibberish * 2 > tokens.len() {
        return rejected(category_id, GIBBERISH_MESSAGE);
    }

    let category = category_keywords(category_id);
    let relevant = tokens
        .iter()
        .any(|t| category.contains(&t.as_str()) || GENERIC_KEYWORDS.contains(&t.as_str()));
    if !relevant {
        return rejected(category_id, UNRELATED_MESSAGE);
    }

    DescriptionValidationRes {
        is_valid: true,
        message: VALID_MESSAGE.to_owned(),
        suggestion: None,
    }
}

/// `YYYY-MM-DD` calendar date.
pub fn validate_slot_date(date: &str) -> CoreResult<()> {
    if date.len() != 10 || NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        return Err(CoreError::invalid(format!(
            "Invalid date '{date}', expected YYYY-MM-DD"
        )));
    }
    Ok(())
}

/// `HH:MM` 24-hour clock time.
pub fn parse_slot_time(time: &str) -> CoreResult<NaiveTime> {
    if time.len() != 5 {
        return Err(CoreError::invalid(format!(
            "Invalid time '{time}', expected HH:MM"
        )));
    }
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| CoreError::invalid(format!("Invalid time '{time}', expected HH:MM")))
}

/// Validate a complete slot window.
pub fn validate_slot(date: &str, start_time: &str, end_time: &str) -> CoreResult<()> {
    validate_slot_date(date)?;
    let start = parse_slot_time(start_time)?;
    let end = parse_slot_time(end_time)?;
    if start >= end {
        return Err(CoreError::invalid("start_time must be before end_time"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_relevant_description() {
        let res = validate_description("plumbing", "Kitchen tap is leaking badly");
        assert!(res.is_valid);
        assert_eq!(res.message, VALID_MESSAGE);
        assert!(res.suggestion.is_none());
    }

    #[test]
    fn generic_keywords_count_for_any_category() {
        assert!(validate_description("salon", "please help me today").is_valid);
    }

    #[test]
    fn short_descriptions_are_rejected_with_example() {
        let res = validate_description("electrician", "fan 123");
        assert!(!res.is_valid);
        assert_eq!(res.message, TOO_SHORT_MESSAGE);
        assert_eq!(
            res.suggestion.as_deref(),
            Some("e.g., Power socket not working in the bedroom")
        );
    }

    #[test]
    fn gibberish_is_rejected() {
        let res = validate_description("cleaning", "xkcd qwrt zzzz sink");
        assert!(!res.is_valid);
        assert_eq!(res.message, GIBBERISH_MESSAGE);
    }

    #[test]
    fn unrelated_text_is_rejected() {
        let res = validate_description("painting", "what a lovely sunny morning");
        assert!(!res.is_valid);
        assert_eq!(res.message, UNRELATED_MESSAGE);
    }

    #[test]
    fn unknown_category_uses_generic_example() {
        let res = validate_description("astrology", "stars are nice");
        assert_eq!(
            res.suggestion.as_deref(),
            Some("e.g., Describe what needs to be fixed or serviced")
        );
    }

    #[test]
    fn slot_formats() {
        assert!(validate_slot("2026-02-14", "09:00", "18:00").is_ok());
        assert!(validate_slot("2026-2-14", "09:00", "18:00").is_err());
        assert!(validate_slot("2026-02-30", "09:00", "18:00").is_err());
        assert!(validate_slot("2026-02-14", "9:00", "18:00").is_err());
        assert!(validate_slot("2026-02-14", "18:00", "09:00").is_err());
        assert!(validate_slot("2026-02-14", "10:00", "10:00").is_err());
    }
}
