// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request payloads with field-keyed validation.
//!
//! Validation runs in full on every submission; any error blocks the
//! request before an identity-provider or database call is issued.

use serde::Deserialize;
use std::borrow::Cow;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

/// Minimum age for registration.
const MIN_AGE_YEARS: i32 = 18;

/// Registration payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 1, message = "First Name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last Name is required"))]
    pub last_name: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Invalid Email")
    )]
    pub email: String,
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters"),
        custom(function = contains_symbol)
    )]
    pub password: String,
    #[validate(must_match(other = password, message = "Passwords do not match"))]
    pub confirm_password: String,
    #[validate(
        length(min = 1, message = "Birth Date is required"),
        custom(function = adult_birth_date)
    )]
    pub birth_date: String,
    #[validate(custom(function = terms_accepted))]
    #[serde(default)]
    pub accept_terms: bool,
}

/// Profile edit payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileUpdateForm {
    #[validate(length(min = 1, message = "First Name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last Name is required"))]
    pub last_name: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Invalid Email")
    )]
    pub email: String,
    #[validate(
        length(min = 1, message = "Birth Date is required"),
        custom(function = adult_birth_date)
    )]
    pub birth_date: String,
}

fn contains_symbol(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() || password.chars().any(|c| !c.is_alphanumeric()) {
        return Ok(());
    }
    Err(ValidationError::new("symbol")
        .with_message(Cow::Borrowed("Password must contain at least one symbol")))
}

/// Calendar-year age check, matching the web client's arithmetic.
fn adult_birth_date(birth_date: &str) -> Result<(), ValidationError> {
    use chrono::Datelike;

    if birth_date.is_empty() {
        return Ok(());
    }
    let Ok(date) = chrono::NaiveDate::parse_from_str(birth_date, "%Y-%m-%d") else {
        return Err(ValidationError::new("birth_date")
            .with_message(Cow::Borrowed("Birth Date must be a valid date")));
    };
    if chrono::Utc::now().year() - date.year() < MIN_AGE_YEARS {
        return Err(ValidationError::new("age")
            .with_message(Cow::Borrowed("You must be at least 18 years old")));
    }
    Ok(())
}

fn terms_accepted(accepted: &bool) -> Result<(), ValidationError> {
    if *accepted {
        return Ok(());
    }
    Err(ValidationError::new("accept_terms")
        .with_message(Cow::Borrowed("You must accept the terms and conditions")))
}

/// Flat create/edit payload.
///
/// Numeric fields arrive as text inputs and must parse as numbers before
/// submission is accepted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FlatForm {
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Street Name is required"))]
    pub street_name: String,
    #[validate(length(min = 1, message = "Street Number is required"))]
    pub street_number: String,
    #[validate(length(min = 1, message = "Rent Price is required"))]
    pub rent_price: String,
    #[validate(length(min = 1, message = "Area Size is required"))]
    pub area_size: String,
    #[validate(length(min = 1, message = "Year Built is required"))]
    pub year_built: String,
    #[validate(length(min = 1, message = "Date Available is required"))]
    pub date_available: String,
    #[serde(default)]
    pub has_ac: bool,
}

/// A fully validated and parsed flat submission.
#[derive(Debug, Clone)]
pub struct FlatInput {
    pub city: String,
    pub street_name: String,
    pub street_number: u32,
    pub rent_price: f64,
    pub area_size: f64,
    pub year_built: u32,
    pub date_available: String,
    pub has_ac: bool,
}

impl FlatForm {
    /// Run the required-field checks and parse the numeric fields.
    pub fn validate_and_parse(&self) -> Result<FlatInput, ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        let street_number =
            parse_number::<u32>(&mut errors, "street_number", &self.street_number);
        let rent_price = parse_number::<f64>(&mut errors, "rent_price", &self.rent_price);
        let area_size = parse_number::<f64>(&mut errors, "area_size", &self.area_size);
        let year_built = parse_number::<u32>(&mut errors, "year_built", &self.year_built);

        if let (Some(street_number), Some(rent_price), Some(area_size), Some(year_built)) =
            (street_number, rent_price, area_size, year_built)
        {
            if errors.is_empty() {
                return Ok(FlatInput {
                    city: self.city.trim().to_string(),
                    street_name: self.street_name.trim().to_string(),
                    street_number,
                    rent_price,
                    area_size,
                    year_built,
                    date_available: self.date_available.trim().to_string(),
                    has_ac: self.has_ac,
                });
            }
        }
        Err(errors)
    }
}

/// Parse a numeric text field, recording a field-keyed error on failure.
/// Empty input is left to the required-field validator.
fn parse_number<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
) -> Option<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.add(
                field,
                ValidationError::new("number")
                    .with_message(Cow::Borrowed("Must be a number")),
            );
            None
        }
    }
}
