// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing resources, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate a record ID (positive integer). `kind` names the record in messages.
pub fn validate_id(id_str: &str, kind: &str) -> Result<i64, String> {
    id_str.trim().parse::<i64>()
        .map_err(|_| format!("Invalid {} ID: '{}'. ID must be a number.", kind, id_str))
        .and_then(|id| {
            if id > 0 {
                Ok(id)
            } else {
                Err(format!("Invalid {} ID: {}. ID must be positive.", kind, id))
            }
        })
}

/// Validate a stage position (1-based)
pub fn validate_stage_order(order_str: &str) -> Result<i64, String> {
    order_str.trim().parse::<i64>()
        .map_err(|_| format!("Invalid stage number: '{}'. Stage must be a number.", order_str))
        .and_then(|order| {
            if order >= 1 {
                Ok(order)
            } else {
                Err(format!("Invalid stage number: {}. Stages are numbered from 1.", order))
            }
        })
}

/// Validate a 1..5 star rating
pub fn validate_rating(rating_str: &str) -> Result<i64, String> {
    match rating_str.trim().parse::<i64>() {
        Ok(r) if (1..=5).contains(&r) => Ok(r),
        _ => Err(format!("Invalid rating: '{}'. Rating must be 1 to 5.", rating_str)),
    }
}

/// Parse a money or area amount. Accepts a decimal comma and spaces as
/// thousands separators ("150 000,50").
pub fn parse_amount(value: &str, field_name: &str) -> Result<f64, String> {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(format!("Invalid {}: '{}'. Expected a non-negative number.", field_name, value)),
    }
}
