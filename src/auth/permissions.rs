/*!
 * # Permissions Module
 *
 * Permission strings are `resource:action` or `resource:subject:action`.
 * A grant ending in `:*` covers every permission below that prefix, and the
 * bare `*` grant covers everything.
 */

/// Common permission string constants for compile-time safety
pub mod consts {
    /// Global wildcard
    pub const ALL: &str = "*";

    pub const REPORTS_ALL: &str = "reports:*";
    pub const REPORTS_VETERINARY_READ: &str = "reports:veterinary:read";
    pub const REPORTS_TRAINING_READ: &str = "reports:training:read";
    pub const REPORTS_FEEDING_READ: &str = "reports:feeding:read";
    pub const REPORTS_CHECKUP_READ: &str = "reports:checkup:read";

    /// Required on top of the read permission for file exports (PDF)
    pub const REPORTS_EXPORT: &str = "reports:export";
}

/// Returns true when `granted` covers `required`.
///
/// Wildcards only match on a segment boundary, so `reports:*` covers
/// `reports:feeding:read` but `report*` is just an unknown literal.
pub fn permission_matches(granted: &str, required: &str) -> bool {
    let granted = granted.trim();

    if granted == consts::ALL || granted == required {
        return true;
    }

    match granted.strip_suffix(":*") {
        Some(prefix) if !prefix.is_empty() => required
            .strip_prefix(prefix)
            .map(|rest| rest.starts_with(':'))
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("*", "reports:veterinary:read" => true; "global wildcard")]
    #[test_case("reports:*", "reports:veterinary:read" => true; "resource wildcard")]
    #[test_case("reports:*", "reports:export" => true; "resource wildcard covers export")]
    #[test_case("reports:training:*", "reports:training:read" => true; "subject wildcard")]
    #[test_case("reports:training:*", "reports:feeding:read" => false; "subject wildcard other subject")]
    #[test_case("reports:feeding:read", "reports:feeding:read" => true; "exact")]
    #[test_case("reports:feeding:read", "reports:checkup:read" => false; "exact mismatch")]
    #[test_case("report:*", "reports:feeding:read" => false; "prefix must end on a segment")]
    #[test_case(":*", "reports:feeding:read" => false; "empty prefix")]
    fn wildcard_matching(granted: &str, required: &str) -> bool {
        permission_matches(granted, required)
    }
}
