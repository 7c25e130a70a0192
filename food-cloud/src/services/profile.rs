//! Customer profile updates

use shared::error::AppError;
use shared::models::{ProfileUpdate, ProfileWrite};
use validator::ValidateEmail;

/// Required fields with the labels used in the error message, in form order
const REQUIRED_FIELDS: &[(&str, &str)] = &[
    ("firstname", "First Name"),
    ("lastname", "Last Name"),
    ("country", "Country / Region"),
    ("street_address", "Street Address"),
    ("postcode", "Postcode / ZIP"),
    ("city", "Town / City"),
    ("contact_email", "Contact Email Address"),
    ("phone", "Phone"),
];

fn field<'a>(update: &'a ProfileUpdate, key: &str) -> Option<&'a str> {
    let value = match key {
        "firstname" => &update.firstname,
        "lastname" => &update.lastname,
        "country" => &update.country,
        "street_address" => &update.street_address,
        "postcode" => &update.postcode,
        "city" => &update.city,
        "contact_email" => &update.contact_email,
        "phone" => &update.phone,
        _ => return None,
    };
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `A is required`, `A, and B is required`, `A, B, and C is required`
fn missing_message(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [only] => format!("{only} is required"),
        [rest @ .., last] => format!("{}, and {last} is required", rest.join(", ")),
    }
}

/// Resolve a full replacement write. All missing required fields are reported
/// together; optional text fields not sent are cleared.
pub fn resolve_update(update: &ProfileUpdate) -> Result<ProfileWrite, AppError> {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .filter(|(key, _)| field(update, key).is_none())
        .map(|(_, label)| *label)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::validation(missing_message(&missing)));
    }

    let required = |key: &str| field(update, key).unwrap_or_default().to_string();
    let optional = |value: &Option<String>| value.as_deref().map(str::trim).unwrap_or_default().to_string();

    let contact_email = required("contact_email").to_lowercase();
    if !contact_email.validate_email() {
        return Err(AppError::validation("Valid contact email is required"));
    }

    Ok(ProfileWrite {
        firstname: required("firstname"),
        lastname: required("lastname"),
        companyname: optional(&update.companyname),
        country: required("country"),
        street_address: required("street_address"),
        address_line2: optional(&update.address_line2),
        postcode: required("postcode"),
        city: required("city"),
        contact_email,
        phone: required("phone"),
        ship_to_different_address: update.ship_to_different_address.unwrap_or(false),
        order_notes: optional(&update.order_notes),
    })
}
