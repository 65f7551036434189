//! Team identifiers shared by the document and billing APIs.

/// Longest team id accepted from a request path.
pub const MAX_TEAM_ID_LEN: usize = 64;

/// Non-empty, at most 64 characters of ASCII letters, digits, `-` or `_`.
pub fn is_valid_team_id(team_id: &str) -> bool {
    !team_id.is_empty()
        && team_id.len() <= MAX_TEAM_ID_LEN
        && team_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_ids() {
        assert!(is_valid_team_id("team_1"));
        assert!(is_valid_team_id("clx-9a8b7c"));
        assert!(is_valid_team_id(&"a".repeat(MAX_TEAM_ID_LEN)));

        assert!(!is_valid_team_id(""));
        assert!(!is_valid_team_id("team 1"));
        assert!(!is_valid_team_id("../etc"));
        assert!(!is_valid_team_id(&"a".repeat(MAX_TEAM_ID_LEN + 1)));
    }
}
