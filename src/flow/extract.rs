//! Pattern-based extraction of beneficiary details from chat messages.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Messages at most this long (in characters) are never taken as an assistance request.
const MIN_REQUEST_CHARS: usize = 15;

/// Words that follow "I am" / "I'm" without being a name.
const NOT_A_NAME: &[&str] = &[
    "a", "an", "the", "not", "so", "very", "really", "just", "in", "at", "from", "with", "out",
    "here", "hungry", "starving", "pregnant", "lactating", "breastfeeding", "homeless",
    "unemployed", "alone", "sick", "looking", "trying", "having", "writing", "calling",
    "asking", "currently", "unable", "struggling", "worried", "scared", "okay", "ok", "fine",
    "good", "hello", "hi", "yes", "no", "thanks", "thank",
];

/// Words that end a captured name ("Maria and I need help" → "Maria").
const NAME_STOP_WORDS: &[&str] = &[
    "and", "but", "i", "im", "my", "me", "we", "from", "with", "who", "need", "needs",
    "looking", "here", "please", "years", "year", "aged", "age",
];

/// Longest name kept, in words.
const MAX_NAME_WORDS: usize = 4;

/// A beneficiary detail the conversation collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// The beneficiary's name.
    Name,
    /// The beneficiary's age in years.
    Age,
    /// Free-text description of the help needed.
    AssistanceRequest,
}

/// Details collected about the beneficiary so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    /// Name, once given.
    pub name: Option<String>,
    /// Age, once given.
    pub age: Option<u32>,
    /// What help is needed, once described.
    pub assistance_request: Option<String>,
}

impl Beneficiary {
    /// First field still unknown, in the order they are asked for.
    #[must_use]
    pub const fn missing(&self) -> Option<Field> {
        if self.name.is_none() {
            Some(Field::Name)
        } else if self.age.is_none() {
            Some(Field::Age)
        } else if self.assistance_request.is_none() {
            Some(Field::AssistanceRequest)
        } else {
            None
        }
    }

    /// Whether every field is known.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.missing().is_none()
    }
}

/// Regex heuristics filling a [`Beneficiary`] from free text.
pub struct BeneficiaryExtractor {
    name_patterns: Vec<Regex>,
    age_patterns: Vec<Regex>,
    identity_prefix: Regex,
    bare_name: Regex,
    bare_number: Regex,
}

impl BeneficiaryExtractor {
    /// Create a new extractor.
    ///
    /// # Errors
    /// Returns an error if any regex pattern is invalid.
    pub fn new() -> Result<Self, regex::Error> {
        const WORDS: &str = r"([a-z]+(?:[ \t]+[a-z]+)*)";

        Ok(Self {
            // "my name is X", "I'm X", "name is X", "I am X"
            name_patterns: vec![
                Regex::new(&format!(r"(?i)\bmy name is\s+{WORDS}"))?,
                Regex::new(&format!(r"(?i)\bi['’]?m\s+{WORDS}"))?,
                Regex::new(&format!(r"(?i)\bname is\s+{WORDS}"))?,
                Regex::new(&format!(r"(?i)\bi am\s+{WORDS}"))?,
            ],

            // "I'm 34 years old", "age is 34", "34 years old", "aged 34"
            age_patterns: vec![
                Regex::new(r"(?i)\bi['’]?m\s+(\d+)\s+years?\s+old\b")?,
                Regex::new(r"(?i)\bage is\s+(\d+)\b")?,
                Regex::new(r"(?i)\b(\d+)\s+years?\s+old\b")?,
                Regex::new(r"(?i)\baged\s+(\d+)\b")?,
            ],

            identity_prefix: Regex::new(r"(?i)^\s*(?:my name is|i['’]?m|i am|name is|age is|aged)\b")?,

            bare_name: Regex::new(r"(?i)^\s*([a-z]+(?:[ \t]+[a-z]+){0,3})\s*[.!]?\s*$")?,

            bare_number: Regex::new(r"^\s*(\d{1,3})\s*$")?,
        })
    }

    /// Fill the still-unknown fields of `beneficiary` from `message`.
    ///
    /// `awaiting` is the field the previous assistant turn asked for; it lets a
    /// bare answer ("Maria", "34") count as that field.
    pub fn update(&self, beneficiary: &mut Beneficiary, message: &str, awaiting: Option<Field>) {
        let name = self.find_name(message, awaiting);
        let age = self.find_age(message, awaiting);

        let states_identity = self.identity_prefix.is_match(message) && (name.is_some() || age.is_some());
        let answers_question = match awaiting {
            Some(Field::Name) => name.is_some(),
            Some(Field::Age) => age.is_some(),
            _ => false,
        };

        if beneficiary.name.is_none() {
            beneficiary.name = name;
        }
        if beneficiary.age.is_none() {
            beneficiary.age = age;
        }
        if beneficiary.assistance_request.is_none()
            && !states_identity
            && !answers_question
            && !self.bare_number.is_match(message)
        {
            beneficiary.assistance_request = request_text(message);
        }
    }

    /// Name stated in `message`, if any.
    #[must_use]
    pub fn find_name(&self, message: &str, awaiting: Option<Field>) -> Option<String> {
        let stated = self
            .name_patterns
            .iter()
            .filter_map(|pattern| pattern.captures(message))
            .find_map(|caps| caps.get(1).and_then(|m| clean_name(m.as_str())));

        stated.or_else(|| {
            if awaiting != Some(Field::Name) {
                return None;
            }
            self.bare_name
                .captures(message)
                .and_then(|caps| caps.get(1))
                .and_then(|m| clean_name(m.as_str()))
        })
    }

    /// Age stated in `message`, if any.
    #[must_use]
    pub fn find_age(&self, message: &str, awaiting: Option<Field>) -> Option<u32> {
        let stated = self
            .age_patterns
            .iter()
            .filter_map(|pattern| pattern.captures(message))
            .find_map(|caps| caps.get(1).and_then(|m| m.as_str().parse().ok()));

        stated.or_else(|| {
            if awaiting != Some(Field::Age) {
                return None;
            }
            self.bare_number
                .captures(message)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok())
        })
    }
}

/// Keep the leading name words, dropping filler and trailing clauses.
fn clean_name(raw: &str) -> Option<String> {
    let words: Vec<&str> = raw
        .split_whitespace()
        .take_while(|w| !NAME_STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .take(MAX_NAME_WORDS)
        .collect();

    let first = words.first()?;
    if NOT_A_NAME.contains(&first.to_lowercase().as_str()) {
        return None;
    }
    Some(words.join(" "))
}

fn request_text(message: &str) -> Option<String> {
    let trimmed = message.trim();
    (trimmed.chars().count() > MIN_REQUEST_CHARS).then(|| trimmed.to_string())
}
