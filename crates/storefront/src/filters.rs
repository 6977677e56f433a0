//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Chooses the singular or plural noun for a count.
///
/// Usage in templates: `{{ count|pluralize("item", "items") }}`
#[askama::filter_fn]
pub fn pluralize(
    count: impl Display,
    _env: &dyn askama::Values,
    singular: &str,
    plural: &str,
) -> askama::Result<String> {
    let count = count.to_string();
    Ok(if count == "1" { singular } else { plural }.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use askama::Template;

    use crate::filters;

    #[derive(Template)]
    #[template(source = "{{ count }} {{ count|pluralize(\"item\", \"items\") }}", ext = "txt")]
    struct Counted {
        count: u64,
    }

    #[derive(Template)]
    #[template(source = "{{ \"\"|current_year }}", ext = "txt")]
    struct Year;

    #[test]
    fn test_pluralize() {
        assert_eq!(Counted { count: 1 }.render().unwrap(), "1 item");
        assert_eq!(Counted { count: 0 }.render().unwrap(), "0 items");
        assert_eq!(Counted { count: 12 }.render().unwrap(), "12 items");
    }

    #[test]
    fn test_current_year_is_plausible() {
        let year: i32 = Year.render().unwrap().parse().unwrap();
        assert!(year >= 2024);
    }
}
