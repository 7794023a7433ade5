// Phone number handling. Lead deduplication and the messaging provider both
// key on a bare digit string, so normalization lives in one place.

/// Strips every non-digit character. This is the canonical form stored in
/// `leads.phone_digits` and compared during bulk-import deduplication.
pub fn digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalizes a number to the provider's country-code convention (91).
/// A bare 10-digit subscriber number gets the prefix; a leading trunk `0`
/// is dropped first.
pub fn to_dispatch_format(raw: &str) -> String {
    let mut d = digits(raw);
    if d.len() == 11 && d.starts_with('0') {
        d.remove(0);
    }
    if d.len() == 10 {
        return format!("91{}", d);
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_strips_formatting() {
        assert_eq!(digits("+91 98765-43210"), "919876543210");
        assert_eq!(digits("(011) 2345 6789"), "01123456789");
        assert_eq!(digits("abc"), "");
    }

    #[test]
    fn dispatch_format_prefixes_country_code() {
        assert_eq!(to_dispatch_format("9876543210"), "919876543210");
        assert_eq!(to_dispatch_format("098765 43210"), "919876543210");
    }

    #[test]
    fn dispatch_format_keeps_already_prefixed_numbers() {
        assert_eq!(to_dispatch_format("+919999999999"), "919999999999");
    }

    #[test]
    fn dispatch_format_leaves_odd_lengths_alone() {
        assert_eq!(to_dispatch_format("12345"), "12345");
    }
}
