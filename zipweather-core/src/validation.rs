//! ZIP code checks used both for live input formatting and before submission.

/// True iff `zip` is exactly five ASCII digits and not `00000`.
pub fn is_valid_zip(zip: &str) -> bool {
    zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit()) && zip != "00000"
}

/// Strip everything but digits and keep at most five of them.
///
/// This formats input as it is typed; it does not make the result valid.
pub fn normalize_zip_input(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).take(5).collect()
}

/// Message explaining why `zip` was rejected by [`is_valid_zip`].
pub fn zip_error_message(zip: &str) -> &'static str {
    if zip.is_empty() {
        return "Please enter a zip code";
    }
    if zip.chars().count() < 5 {
        return "Zip code must be 5 digits";
    }
    if !zip.chars().all(|c| c.is_ascii_digit()) {
        return "Zip code must contain only numbers";
    }
    if zip == "00000" {
        return "Please enter a valid zip code";
    }
    "Invalid zip code"
}
