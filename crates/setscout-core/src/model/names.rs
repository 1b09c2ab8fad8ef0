/// Canonical lookup id for a display name: lower-case ASCII alphanumerics only.
///
/// `"Heavy-Duty Boots"` and `"heavydutyboots"` map to the same id.
pub fn to_id(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Compares two display names by their canonical ids.
pub fn same_id(left: &str, right: &str) -> bool {
    let mut a = left
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase());
    let mut b = right
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase());
    loop {
        match (a.next(), b.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x == y => continue,
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_case() {
        assert_eq!(to_id("Heavy-Duty Boots"), "heavydutyboots");
        assert_eq!(to_id("U-turn"), "uturn");
        assert_eq!(to_id("King's Rock"), "kingsrock");
    }

    #[test]
    fn same_id_ignores_formatting() {
        assert!(same_id("Ogerpon-Wellspring", "ogerpon wellspring"));
        assert!(!same_id("Choice Band", "Choice Scarf"));
        assert!(!same_id("Leftovers", "Leftover"));
    }
}
