use lazy_static::lazy_static;
use regex::Regex;
use crate::core::library::{LibraryError, LibraryResult};
use crate::utils::date::parse_day;

lazy_static! {
    static ref FULL_NAME_RE: Regex = Regex::new(r"^[\p{L}\s.'-]+$").expect("valid full name regex");
    static ref PHONE_RE: Regex = Regex::new(r"^0\d{9,10}$").expect("valid phone regex");
    static ref EMAIL_RE: Regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex");
}

fn invalid(message: &str) -> LibraryError {
    LibraryError::validation(message, Some("400".to_string()))
}

pub fn validate_full_name(name: &str) -> LibraryResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid("full name is required"));
    }
    let len = trimmed.chars().count();
    if len < 2 {
        return Err(invalid("full name must have at least 2 characters"));
    }
    if len > 150 {
        return Err(invalid("full name must not exceed 150 characters"));
    }
    if !FULL_NAME_RE.is_match(trimmed) {
        return Err(invalid("full name may only contain letters and spaces"));
    }
    Ok(())
}

// Separators (space, dash, dot) are ignored; blank is accepted.
pub fn validate_phone(phone: Option<&str>) -> LibraryResult<()> {
    let Some(phone) = phone.filter(|p| !p.trim().is_empty()) else {
        return Ok(());
    };
    let digits: String = phone.chars().filter(|c| !matches!(c, ' ' | '-' | '.')).collect();
    if !PHONE_RE.is_match(digits.as_str()) {
        return Err(invalid("phone must have 10-11 digits and start with 0"));
    }
    Ok(())
}

pub fn validate_email(email: Option<&str>) -> LibraryResult<()> {
    let Some(email) = email.filter(|e| !e.trim().is_empty()) else {
        return Ok(());
    };
    if !EMAIL_RE.is_match(email) {
        return Err(invalid(format!("invalid email {}", email).as_str()));
    }
    if email.chars().count() > 100 {
        return Err(invalid("email must not exceed 100 characters"));
    }
    Ok(())
}

pub fn validate_address(address: Option<&str>) -> LibraryResult<()> {
    max_len(address, 255, "address")
}

pub fn validate_date(value: Option<&str>, field_name: &str) -> LibraryResult<()> {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => parse_day(v, field_name).map(|_| ()),
        None => Ok(()),
    }
}

pub fn validate_date_range(start: Option<&str>, end: Option<&str>) -> LibraryResult<()> {
    match (start.filter(|s| !s.is_empty()), end.filter(|e| !e.is_empty())) {
        (Some(start), Some(end)) => {
            let start = parse_day(start, "card_start")?;
            let end = parse_day(end, "card_end")?;
            if start > end {
                return Err(invalid("card_start must not be after card_end"));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

pub fn validate_reputation_score(score: i64) -> LibraryResult<()> {
    if !(0..=100).contains(&score) {
        return Err(invalid(format!("reputation score must be between 0 and 100, got {}", score).as_str()));
    }
    Ok(())
}

pub fn validate_required_name(name: &str, field_name: &str) -> LibraryResult<()> {
    if name.trim().is_empty() {
        return Err(invalid(format!("{} is required", field_name).as_str()));
    }
    max_len(Some(name), 255, field_name)
}

pub fn validate_title(title: &str) -> LibraryResult<()> {
    validate_required_name(title, "title")
}

pub fn validate_isbn(isbn: Option<&str>) -> LibraryResult<()> {
    max_len(isbn, 20, "isbn")
}

pub fn validate_barcode(barcode: Option<&str>) -> LibraryResult<()> {
    max_len(barcode, 50, "barcode")
}

pub fn validate_publish_year(year: Option<i64>, current_year: i32) -> LibraryResult<()> {
    if let Some(year) = year {
        let max_year = current_year as i64 + 1;
        if year < 1000 || year > max_year {
            return Err(invalid(format!("publish year must be between 1000 and {}", max_year).as_str()));
        }
    }
    Ok(())
}

pub fn validate_price(price: Option<f64>) -> LibraryResult<()> {
    match price {
        Some(p) if !(p >= 0.0) => Err(invalid("price must not be negative")),
        _ => Ok(()),
    }
}

pub fn validate_quantity(quantity: i64) -> LibraryResult<()> {
    if quantity < 1 {
        return Err(invalid(format!("quantity must be at least 1, got {}", quantity).as_str()));
    }
    Ok(())
}

pub fn validate_inventory(total_quantity: i64, available_quantity: i64) -> LibraryResult<()> {
    if total_quantity < 0 || available_quantity < 0 {
        return Err(invalid("quantities must not be negative"));
    }
    if available_quantity > total_quantity {
        return Err(invalid(format!("available quantity {} exceeds total quantity {}",
                                   available_quantity, total_quantity).as_str()));
    }
    Ok(())
}

pub fn validate_amount(amount: f64) -> LibraryResult<()> {
    if !(amount >= 0.0) {
        return Err(invalid("penalty amount must not be negative"));
    }
    Ok(())
}

fn max_len(value: Option<&str>, max: usize, field_name: &str) -> LibraryResult<()> {
    if let Some(v) = value {
        if v.chars().count() > max {
            return Err(invalid(format!("{} must not exceed {} characters", field_name, max).as_str()));
        }
    }
    Ok(())
}
