//! Label/value scraping over recognised text.

use regex::RegexBuilder;
use std::collections::BTreeMap;

/// Find `<field>: value` style lines in `text`.
///
/// The text is lower-cased before matching, so returned values are
/// lower-case too. Fields without a match are left out.
pub fn match_fields(text: &str, fields: &[String]) -> BTreeMap<String, String> {
    let haystack = text.to_lowercase();
    let mut found = BTreeMap::new();

    for field in fields {
        let label = regex::escape(&field.to_lowercase());
        let patterns = [
            format!(r"{label}[:\s]+([^\n]+)"),
            format!(r"{label}\s*:?\s*([^\n]+)"),
        ];

        for pattern in &patterns {
            let Ok(re) = RegexBuilder::new(pattern).case_insensitive(true).build() else {
                continue;
            };
            if let Some(value) = re.captures(&haystack).and_then(|c| c.get(1)) {
                found.insert(field.clone(), value.as_str().trim().to_string());
                break;
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn matches_label_value_lines() {
        let text = "INVOICE\nTotal: $42.00\nDate 2024-01-05\n";
        let got = match_fields(text, &fields(&["Total", "Date", "Vendor"]));
        assert_eq!(got.get("Total").map(String::as_str), Some("$42.00"));
        assert_eq!(got.get("Date").map(String::as_str), Some("2024-01-05"));
        assert!(!got.contains_key("Vendor"));
    }

    #[test]
    fn values_come_back_lower_cased() {
        let got = match_fields("Name: ADA Lovelace", &fields(&["name"]));
        assert_eq!(got["name"], "ada lovelace");
    }

    #[test]
    fn field_names_are_literal() {
        let got = match_fields("amount (usd): 12\n", &fields(&["Amount (USD)", "a.b"]));
        assert_eq!(got["Amount (USD)"], "12");
        assert!(!got.contains_key("a.b"));
    }

    #[test]
    fn label_glued_to_value_uses_second_pattern() {
        let got = match_fields("ref#A17", &fields(&["ref#"]));
        assert_eq!(got["ref#"], "a17");
    }
}
