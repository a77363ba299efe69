use std::collections::BTreeMap;

use serde_json::Value;

/// Decoded permission map of a role: permission name -> enabled.
///
/// Stored as a JSONB object. Values are booleans going forward; the decoder
/// also accepts the legacy "1"/"0" strings found in imported rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(BTreeMap<String, bool>);

impl PermissionSet {
    /// Strict decode for the write path: `None` means the payload is not a
    /// well-formed name->flag object and must be rejected outright.
    pub fn try_from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let mut out = BTreeMap::new();
        for (name, flag) in map {
            let enabled = match flag {
                Value::Bool(b) => *b,
                Value::String(s) if s == "1" => true,
                Value::String(s) if s == "0" => false,
                _ => return None,
            };
            out.insert(name.clone(), enabled);
        }
        Some(Self(out))
    }

    /// Lenient decode for the check path: a malformed blob yields the empty
    /// set. Malformed stored permissions must never grant access.
    pub fn from_value(value: &Value) -> Self {
        Self::try_from_value(value).unwrap_or_default()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(name, enabled)| (name.clone(), Value::Bool(*enabled)))
                .collect(),
        )
    }

    pub fn allows(&self, permission: &str) -> bool {
        self.0.get(permission).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_boolean_flags() {
        let set = PermissionSet::from_value(&json!({
            "can_manage_all_projects": true,
            "can_manage_roles": false,
        }));
        assert!(set.allows("can_manage_all_projects"));
        assert!(!set.allows("can_manage_roles"));
        assert!(!set.allows("never_mentioned"));
    }

    #[test]
    fn decodes_legacy_string_flags() {
        let set = PermissionSet::from_value(&json!({
            "can_view_reports": "1",
            "can_delete_clients": "0",
        }));
        assert!(set.allows("can_view_reports"));
        assert!(!set.allows("can_delete_clients"));
    }

    #[test]
    fn malformed_blob_fails_closed() {
        // Not an object at all
        assert!(PermissionSet::from_value(&json!("oops")).is_empty());
        assert!(PermissionSet::from_value(&json!([1, 2, 3])).is_empty());
        // Object with a non-flag value poisons the whole blob
        let set = PermissionSet::from_value(&json!({
            "can_view_reports": "1",
            "can_delete_clients": 17,
        }));
        assert!(set.is_empty());
        assert!(!set.allows("can_view_reports"));
    }

    #[test]
    fn strict_decode_rejects_malformed() {
        assert!(PermissionSet::try_from_value(&json!({"x": "2"})).is_none());
        assert!(PermissionSet::try_from_value(&json!(null)).is_none());
        assert!(PermissionSet::try_from_value(&json!({})).is_some());
    }

    #[test]
    fn store_and_read_back_is_lossless() {
        let original = json!({"a": "1", "b": false, "c": true});
        let stored = PermissionSet::from_value(&original).to_value();
        let read_back = PermissionSet::from_value(&stored);
        assert!(read_back.allows("a"));
        assert!(!read_back.allows("b"));
        assert!(read_back.allows("c"));
        assert_eq!(read_back, PermissionSet::from_value(&original));
    }
}
