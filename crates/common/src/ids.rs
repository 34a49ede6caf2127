//! Opaque UUID-shaped identifiers (§3: "Identifiers are opaque strings").

use uuid::Uuid;

/// Generate a new opaque identifier.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_unique_uuid_shaped_ids() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
