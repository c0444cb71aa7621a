//! Per-field validation rules.
//!
//! Every rule is a pure function: it takes the candidate value and returns
//! the normalized value or the violated constraint.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::errors::ValidationError;
use crate::models::{Condition, Console, ConsoleInput, Consoles, Rating};

const TITLE_LEN: (usize, usize) = (2, 59);
const GENRE_LEN: (usize, usize) = (2, 24);
const STORE_NAME_LEN: (usize, usize) = (2, 39);
const MAX_STOCK: i64 = 100;

/// `start:00-end:00` once all whitespace is removed.
static HOURS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):00-(\d{1,2}):00$").expect("invalid hours regex"));

fn validate_length(
    field: &'static str,
    value: &str,
    (min, max): (usize, usize),
) -> Result<String, ValidationError> {
    let value = value.trim();
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::Length { field, min, max });
    }
    Ok(value.to_string())
}

pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    validate_length("title", title, TITLE_LEN)
}

pub fn validate_rating(rating: &str) -> Result<Rating, ValidationError> {
    let normalized = rating.trim().to_uppercase();
    Rating::ALL
        .into_iter()
        .find(|r| r.as_str() == normalized)
        .ok_or(ValidationError::InvalidVariant {
            field: "rating",
            value: rating.to_string(),
            allowed: "E, T, M",
        })
}

pub fn validate_console(console: &str) -> Result<Console, ValidationError> {
    let trimmed = console.trim();
    Console::ALL
        .into_iter()
        .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
        .ok_or(ValidationError::InvalidVariant {
            field: "console",
            value: console.to_string(),
            allowed: "PlayStation, Xbox, PC, Nintendo Switch",
        })
}

/// Accepts a single console or a list of them; the shape is kept.
pub fn validate_consoles(input: &ConsoleInput) -> Result<Consoles, ValidationError> {
    match input {
        ConsoleInput::One(value) => validate_console(value).map(Consoles::One),
        ConsoleInput::Many(values) => {
            if values.is_empty() {
                return Err(ValidationError::Empty { field: "console" });
            }
            let mut consoles = Vec::with_capacity(values.len());
            for value in values {
                let console = validate_console(value)?;
                if !consoles.contains(&console) {
                    consoles.push(console);
                }
            }
            Ok(Consoles::Many(consoles))
        }
    }
}

pub fn validate_genre(genre: &str) -> Result<String, ValidationError> {
    validate_length("genre", genre, GENRE_LEN)
}

pub fn validate_image(image: &str) -> Result<String, ValidationError> {
    let image = image.trim();
    if image.is_empty() {
        return Err(ValidationError::Empty { field: "image" });
    }
    Ok(image.to_string())
}

pub fn validate_store_name(name: &str) -> Result<String, ValidationError> {
    validate_length("name", name, STORE_NAME_LEN)
}

pub fn validate_location(location: &str) -> Result<String, ValidationError> {
    let location = location.trim();
    let has_letter = location.chars().any(char::is_alphabetic);
    let has_digit = location.chars().any(char::is_numeric);
    if !has_letter || !has_digit {
        return Err(ValidationError::InvalidFormat {
            field: "location",
            reason: "must contain at least one letter and one number",
        });
    }
    Ok(location.to_string())
}

/// Parses `"H:00 - H:00"` (spacing is not significant) and renders it back in
/// canonical form.
pub fn validate_hours(hours: &str) -> Result<String, ValidationError> {
    const FORMAT: ValidationError = ValidationError::InvalidFormat {
        field: "hours",
        reason: "must be formatted as 'H:00 - H:00' with hours between 0 and 23",
    };

    let compact: String = hours.chars().filter(|c| !c.is_whitespace()).collect();
    let caps = HOURS_RE.captures(&compact).ok_or(FORMAT)?;

    let mut bounds = [0u8; 2];
    for (slot, idx) in bounds.iter_mut().zip([1, 2]) {
        let hour: u8 = caps[idx].parse().map_err(|_| FORMAT)?;
        if hour > 23 {
            return Err(FORMAT);
        }
        *slot = hour;
    }

    Ok(format!("{}:00 - {}:00", bounds[0], bounds[1]))
}

pub fn validate_price(price: Decimal) -> Result<Decimal, ValidationError> {
    if price < Decimal::ZERO {
        return Err(ValidationError::Negative { field: "price" });
    }
    Ok(price)
}

pub fn validate_stock(stock: i64) -> Result<i32, ValidationError> {
    if !(0..=MAX_STOCK).contains(&stock) {
        return Err(ValidationError::OutOfRange {
            field: "stock",
            min: 0,
            max: MAX_STOCK,
        });
    }
    Ok(stock as i32)
}

pub fn validate_condition(condition: &str) -> Result<Condition, ValidationError> {
    let trimmed = condition.trim();
    let mut chars = trimmed.chars();
    let titled: String = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    };

    Condition::ALL
        .into_iter()
        .find(|c| c.as_str() == titled)
        .ok_or(ValidationError::InvalidVariant {
            field: "condition",
            value: condition.to_string(),
            allowed: "New, Used",
        })
}

/// Foreign keys are positive integers that fit the `SERIAL` id columns.
pub fn validate_foreign_key(field: &'static str, id: i64) -> Result<i32, ValidationError> {
    if id <= 0 {
        return Err(ValidationError::NotPositive { field });
    }
    i32::try_from(id).map_err(|_| ValidationError::OutOfRange {
        field,
        min: 1,
        max: i32::MAX as i64,
    })
}

/// Substring used by the genre, name and location filters.
pub fn validate_search_term(field: &'static str, term: &str) -> Result<String, ValidationError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(term.to_string())
}
