//! Scoring professionals against a service request.
//!
//! The match score is a weighted blend of four 0..=100 components:
//! keyword relevance (40%), rating (25%), open availability (20%) and completed jobs (15%).

use std::collections::BTreeSet;

use api_shared::ProProfileRes;

const KEYWORD_WEIGHT: f64 = 0.40;
const RATING_WEIGHT: f64 = 0.25;
const AVAILABILITY_WEIGHT: f64 = 0.20;
const EXPERIENCE_WEIGHT: f64 = 0.15;

/// Rating component given to professionals without reviews.
const UNRATED_SCORE: f64 = 50.0;

const SERVICE_KEYWORDS: &[&str] = &[
    "leak", "pipe", "faucet", "drain", "tap", "sink", "toilet", "shower",
    "wire", "switch", "socket", "light", "fan", "circuit", "board", "mcb",
    "paint", "wall", "ceiling", "waterproof", "primer", "color",
    "clean", "deep", "kitchen", "bathroom", "floor", "carpet", "sofa",
    "ac", "cooling", "gas", "compressor", "filter", "split", "window",
    "pest", "cockroach", "termite", "rat", "mosquito", "bug",
    "wood", "furniture", "door", "cabinet", "shelf", "table",
    "hair", "facial", "makeup", "spa", "massage", "nail", "wax",
    "repair", "install", "fix", "replace", "maintain", "service",
    "urgent", "emergency", "quick", "fast", "today", "asap",
];

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "in", "on", "at", "to", "for", "and", "or", "i", "my",
    "can", "you",
];

/// Per-professional facts the score is computed from.
#[derive(Debug, Clone, Copy)]
pub struct MatchInput<'a> {
    /// Request description, or its title when the description is blank.
    pub request_text: &'a str,
    pub bio: Option<&'a str>,
    /// Unrounded average rating; `0.0` without reviews.
    pub avg_rating: f64,
    pub open_slots: i64,
    pub jobs_completed: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Weighted score rounded to one decimal.
    pub score: f64,
    pub reason: String,
}

fn words(text: &str) -> BTreeSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Keyword relevance of `bio` to `description` and up to three matched terms.
pub fn keyword_score(description: &str, bio: &str) -> (f64, Vec<String>) {
    if description.trim().is_empty() || bio.trim().is_empty() {
        return (0.0, Vec::new());
    }

    let desc_words = words(description);
    let bio_words = words(bio);
    let is_keyword = |w: &String| SERVICE_KEYWORDS.contains(&w.as_str());

    let desc_keywords: BTreeSet<&String> = desc_words.iter().filter(|w| is_keyword(w)).collect();
    let matched: BTreeSet<&String> = desc_keywords
        .iter()
        .copied()
        .filter(|w| bio_words.contains(*w))
        .collect();
    let direct_overlap: BTreeSet<&String> = desc_words
        .intersection(&bio_words)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect();

    let terms: Vec<String> = matched
        .union(&direct_overlap)
        .take(3)
        .map(|w| (*w).clone())
        .collect();

    if desc_keywords.is_empty() {
        let score = (direct_overlap.len() as f64 * 15.0).min(100.0);
        return (score, terms);
    }

    let score = (matched.len() as f64 / desc_keywords.len() as f64 * 100.0).min(100.0);
    (score, terms)
}

pub fn rating_score(avg_rating: f64) -> f64 {
    if avg_rating > 0.0 {
        avg_rating / 5.0 * 100.0
    } else {
        UNRATED_SCORE
    }
}

/// Three or more open slots earn the full component.
pub fn availability_score(open_slots: i64) -> f64 {
    (open_slots.max(0) as f64 * 33.0).min(100.0)
}

/// Five or more completed jobs earn the full component.
pub fn experience_score(jobs_completed: i64) -> f64 {
    (jobs_completed.max(0) as f64 * 20.0).min(100.0)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn score(input: &MatchInput<'_>) -> MatchOutcome {
    let (keyword, terms) = keyword_score(input.request_text, input.bio.unwrap_or_default());

    let total = keyword * KEYWORD_WEIGHT
        + rating_score(input.avg_rating) * RATING_WEIGHT
        + availability_score(input.open_slots) * AVAILABILITY_WEIGHT
        + experience_score(input.jobs_completed) * EXPERIENCE_WEIGHT;

    let mut reasons = Vec::new();
    if input.avg_rating > 0.0 {
        reasons.push(format!("⭐ {:.1} rated", input.avg_rating));
    }
    if input.jobs_completed > 0 {
        let plural = if input.jobs_completed > 1 { "s" } else { "" };
        reasons.push(format!("{} job{plural} done", input.jobs_completed));
    }
    if !terms.is_empty() {
        let shown: Vec<&str> = terms.iter().take(2).map(String::as_str).collect();
        reasons.push(format!("Expert in {}", shown.join(", ")));
    }
    if input.open_slots > 0 {
        reasons.push("Available now".to_owned());
    }
    if reasons.is_empty() {
        reasons.push("Category match".to_owned());
    }

    MatchOutcome {
        score: round1(total),
        reason: reasons.join(" · "),
    }
}

/// Order profiles by descending match score; ties keep their input order.
pub fn rank(profiles: &mut [ProProfileRes]) {
    profiles.sort_by(|a, b| {
        let a = a.match_score.unwrap_or_default();
        let b = b.match_score.unwrap_or_default();
        b.total_cmp(&a)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(text: &'a str, bio: Option<&'a str>) -> MatchInput<'a> {
        MatchInput {
            request_text: text,
            bio,
            avg_rating: 0.0,
            open_slots: 0,
            jobs_completed: 0,
        }
    }

    #[test]
    fn keyword_score_is_share_of_request_keywords_found_in_bio() {
        let (score, terms) = keyword_score(
            "kitchen sink leak needs repair",
            "Expert plumber: leak and sink repair",
        );
        // request keywords: kitchen, sink, leak, repair; bio has three of them
        assert!((score - 75.0).abs() < 1e-9);
        assert_eq!(terms, vec!["leak", "repair", "sink"]);
    }

    #[test]
    fn keyword_score_falls_back_to_direct_overlap() {
        let (score, terms) = keyword_score("my geyser is broken", "geyser broken specialist");
        assert!((score - 30.0).abs() < 1e-9);
        assert_eq!(terms, vec!["broken", "geyser"]);
    }

    #[test]
    fn keyword_score_ignores_stop_words_and_empty_bio() {
        assert_eq!(keyword_score("the geyser", "the best").0, 0.0);
        assert_eq!(keyword_score("leak", "").0, 0.0);
    }

    #[test]
    fn new_professional_scores_on_defaults_only() {
        let outcome = score(&input("paint my wall", None));
        // 50 rating default * 0.25
        assert_eq!(outcome.score, 12.5);
        assert_eq!(outcome.reason, "Category match");
    }

    #[test]
    fn components_are_capped() {
        assert_eq!(availability_score(10), 100.0);
        assert_eq!(availability_score(2), 66.0);
        assert_eq!(experience_score(9), 100.0);
        assert_eq!(experience_score(-3), 0.0);
        assert_eq!(rating_score(4.0), 80.0);
    }

    #[test]
    fn reason_lists_every_signal() {
        let outcome = score(&MatchInput {
            request_text: "leak under sink",
            bio: Some("fix any leak or sink fast"),
            avg_rating: 4.56,
            open_slots: 4,
            jobs_completed: 1,
        });
        assert_eq!(
            outcome.reason,
            "⭐ 4.6 rated · 1 job done · Expert in leak, sink · Available now"
        );
        // 100*0.4 + 91.2*0.25 + 100*0.2 + 20*0.15
        assert_eq!(outcome.score, 85.8);
    }

    #[test]
    fn plural_jobs() {
        let mut i = input("x", None);
        i.jobs_completed = 3;
        assert_eq!(score(&i).reason, "3 jobs done");
    }

    #[test]
    fn rank_sorts_descending() {
        let base = ProProfileRes {
            id: String::new(),
            email: None,
            full_name: String::new(),
            phone: String::new(),
            role: "pro".into(),
            service_category: None,
            bio: None,
            address: None,
            profile_photo: None,
            is_active: true,
            created_at: chrono::Utc::now(),
            rating: 0.0,
            jobs_completed: 0,
            reviews_count: 0,
            match_score: None,
            match_reason: None,
        };
        let mut profiles: Vec<ProProfileRes> = [("a", 10.0), ("b", 55.5), ("c", 30.0)]
            .into_iter()
            .map(|(id, s)| ProProfileRes {
                id: id.into(),
                match_score: Some(s),
                ..base.clone()
            })
            .collect();
        rank(&mut profiles);
        let ids: Vec<&str> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }
}
