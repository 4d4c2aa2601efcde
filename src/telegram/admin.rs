//! Admin allow-list

/// Check `user_id` against an explicit admin id. A zero id allows nobody.
pub fn is_allowed(user_id: i64, admin_id: i64) -> bool {
    admin_id != 0 && user_id == admin_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_allowed() {
        assert!(is_allowed(7, 7));
        assert!(!is_allowed(8, 7));
        assert!(!is_allowed(0, 0));
    }
}
