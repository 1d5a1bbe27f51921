//! Keyword-triggered fallback replies for weather, time and jokes.
//!
//! Weather and time phrasings are keyed on the personality's display name,
//! not its id. A personality with any other name gets the generic phrasing.

use super::clock::Clock;
use crate::persona::Personality;
use rand::seq::SliceRandom;
use rand::RngCore;

const WEATHER_WORDS: &[&str] = &["weather", "rain", "sun", "temperature"];
const TIME_WORDS: &[&str] = &["time", "date", "day", "year"];
const JOKE_WORDS: &[&str] = &["joke", "funny", "laugh"];

const SARCASTIC: &str = "Sarcastic Assistant";
const PROFESSIONAL: &str = "Professional Assistant";

pub const JOKES: [&str; 5] = [
    "Why don't scientists trust atoms? Because they make up everything!",
    "Why did the scarecrow win an award? Because he was outstanding in his field!",
    "What do you call a fake noodle? An impasta!",
    "Why couldn't the bicycle stand up by itself? It was two tired!",
    "What do you call a bear with no teeth? A gummy bear!",
];

/// Which keyword group an utterance falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Weather,
    Time,
    Joke,
    Other,
}

pub fn classify(utterance: &str) -> Topic {
    let lowered = utterance.to_lowercase();
    let has_any = |words: &[&str]| words.iter().any(|w| lowered.contains(w));

    if has_any(WEATHER_WORDS) {
        Topic::Weather
    } else if has_any(TIME_WORDS) {
        Topic::Time
    } else if has_any(JOKE_WORDS) {
        Topic::Joke
    } else {
        Topic::Other
    }
}

pub fn respond(
    utterance: &str,
    personality: &Personality,
    clock: &dyn Clock,
    rng: &mut dyn RngCore,
) -> String {
    match classify(utterance) {
        Topic::Weather => weather_reply(&personality.name).to_string(),
        Topic::Time => time_reply(&personality.name, clock),
        Topic::Joke => JOKES
            .choose(rng)
            .map(|j| j.to_string())
            .unwrap_or_default(),
        // Always the first entry, unlike canned tags which pick at random
        Topic::Other => personality.default_response().to_string(),
    }
}

fn weather_reply(name: &str) -> &'static str {
    match name {
        SARCASTIC => "Oh, you want a weather report? Sorry, I left my meteorology degree in my other server.",
        PROFESSIONAL => "I do not have access to real-time weather data. You might consult a dedicated weather service.",
        _ => "I'm not connected to weather services, but I hope it's nice where you are!",
    }
}

fn time_reply(name: &str, clock: &dyn Clock) -> String {
    let now = clock.now();
    match name {
        SARCASTIC => format!(
            "It's {}. Do you have somewhere better to be?",
            now.format("%H:%M")
        ),
        PROFESSIONAL => format!(
            "The current time is {}.",
            now.format("%H:%M on %A, %B %d, %Y")
        ),
        _ => format!("It's currently {} on this lovely day!", now.format("%H:%M")),
    }
}
