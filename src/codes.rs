pub const HEADQUARTERS_SUFFIX: &str = "XXX";

const INSTITUTION_PREFIX_LEN: usize = 8;
const MAX_CODE_LEN: usize = 11;

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub fn normalize_country_code(code: &str) -> Option<String> {
    let trimmed = code.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|ch| ch.is_ascii_alphabetic()) {
        Some(trimmed.to_uppercase())
    } else {
        None
    }
}

pub fn is_valid_swift_code(code: &str) -> bool {
    (INSTITUTION_PREFIX_LEN..=MAX_CODE_LEN).contains(&code.len())
        && code.chars().all(|ch| ch.is_ascii_alphanumeric())
}

pub fn is_headquarters_code(code: &str) -> bool {
    code.ends_with(HEADQUARTERS_SUFFIX)
}

/// Code of the head office a branch belongs to; empty for a head office.
///
/// Callers validate the code first, so it always has at least eight
/// characters here.
pub fn headquarters_code_for(code: &str) -> String {
    if is_headquarters_code(code) {
        return String::new();
    }
    let prefix = code.get(..INSTITUTION_PREFIX_LEN).unwrap_or(code);
    format!("{prefix}{HEADQUARTERS_SUFFIX}")
}

/// Country embedded in positions 5-6 of a BIC.
pub fn bic_country_code(code: &str) -> Option<String> {
    code.get(4..6).and_then(normalize_country_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_xxx_marks_a_head_office() {
        for code in ["ZZBANKXXX", "AAAABBCCXXX", "BCHICLRMXXX"] {
            assert!(is_headquarters_code(code));
            assert_eq!(headquarters_code_for(code), "");
        }
    }

    #[test]
    fn branches_point_at_their_eight_char_prefix() {
        assert!(!is_headquarters_code("ZZBANK001"));
        assert_eq!(headquarters_code_for("ZZBANK001"), "ZZBANK00XXX");
        assert_eq!(headquarters_code_for("AAAABBCC123"), "AAAABBCCXXX");
        assert_eq!(headquarters_code_for("AAAABBCC"), "AAAABBCCXXX");
    }

    #[test]
    fn swift_code_shape() {
        assert!(is_valid_swift_code("AAAABBCC"));
        assert!(is_valid_swift_code("AAAABBCC123"));
        assert!(!is_valid_swift_code("AAAABBC"));
        assert!(!is_valid_swift_code("AAAABBCC1234"));
        assert!(!is_valid_swift_code("AAAA BBCC"));
        assert!(!is_valid_swift_code(""));
    }

    #[test]
    fn country_codes_are_upper_cased() {
        assert_eq!(normalize_country_code(" pl "), Some("PL".to_string()));
        assert_eq!(normalize_country_code("P1"), None);
        assert_eq!(normalize_country_code("POL"), None);
        assert_eq!(bic_country_code("BREXPLPWXXX"), Some("PL".to_string()));
        assert_eq!(bic_country_code("ABC"), None);
    }
}
