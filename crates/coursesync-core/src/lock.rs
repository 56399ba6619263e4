//! Lock status shared by lockable course content

use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::db::{bool_from_int, bool_value, text_value};
use crate::error::DecodeError;
use crate::payload::Payload;

/// Whether the current user may open a piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockStatus {
    /// `locked_for_user`, false when absent
    pub locked_for_user: bool,
    /// `lock_explanation`, passed through as-is
    pub lock_explanation: Option<String>,
    /// `lock_info.can_view`, true when absent
    pub can_view: bool,
}

impl Default for LockStatus {
    fn default() -> Self {
        Self {
            locked_for_user: false,
            lock_explanation: None,
            can_view: true,
        }
    }
}

impl LockStatus {
    /// Column names, in the order [`LockStatus::push_values`] writes them.
    pub const COLUMNS: [&'static str; 3] = ["locked_for_user", "lock_explanation", "can_view"];

    /// Read the three lock keys, each with its own default.
    ///
    /// Missing keys (including a missing `lock_info` object) resolve to the
    /// defaults; only a present key of the wrong type fails.
    pub fn from_payload(payload: &Payload) -> Result<Self, DecodeError> {
        Ok(Self {
            locked_for_user: payload.optional_bool("locked_for_user")?.unwrap_or(false),
            lock_explanation: payload.optional_str("lock_explanation")?,
            can_view: payload.optional_bool("lock_info.can_view")?.unwrap_or(true),
        })
    }

    /// True when the content can be opened right now.
    pub const fn is_accessible(&self) -> bool {
        self.can_view && !self.locked_for_user
    }

    pub(crate) fn from_row(row: &Row<'_>, start: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            locked_for_user: bool_from_int(row.get(start)?),
            lock_explanation: row.get(start + 1)?,
            can_view: bool_from_int(row.get(start + 2)?),
        })
    }

    pub(crate) fn push_values(&self, values: &mut Vec<Value>) {
        values.push(bool_value(self.locked_for_user));
        values.push(text_value(self.lock_explanation.as_deref()));
        values.push(bool_value(self.can_view));
    }
}

/// Content that carries a [`LockStatus`].
pub trait Lockable {
    fn lock_status(&self) -> &LockStatus;

    fn set_lock_status(&mut self, status: LockStatus);

    /// Re-read the lock keys from `payload`; on error the status is unchanged.
    ///
    /// `payload` is whichever object carries the keys: the record itself for
    /// assignments and pages, `content_details` for module items.
    fn update_lock_status(&mut self, payload: &Payload) -> Result<(), DecodeError> {
        let status = LockStatus::from_payload(payload)?;
        self.set_lock_status(status);
        Ok(())
    }

    fn is_locked(&self) -> bool {
        !self.lock_status().is_accessible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> Payload {
        Payload::try_from(value).unwrap()
    }

    #[test]
    fn test_defaults_when_keys_absent() {
        let status = LockStatus::from_payload(&payload(json!({"id": "1"}))).unwrap();
        assert!(!status.locked_for_user);
        assert_eq!(status.lock_explanation, None);
        assert!(status.can_view);
        assert_eq!(status, LockStatus::default());
    }

    #[test]
    fn test_reads_present_keys() {
        let status = LockStatus::from_payload(&payload(json!({
            "locked_for_user": true,
            "lock_explanation": "Locked until Monday",
            "lock_info": {"can_view": false}
        })))
        .unwrap();

        assert!(status.locked_for_user);
        assert_eq!(status.lock_explanation.as_deref(), Some("Locked until Monday"));
        assert!(!status.can_view);
    }

    #[test]
    fn test_lock_info_without_can_view_defaults_true() {
        let status =
            LockStatus::from_payload(&payload(json!({"lock_info": {"unlock_at": null}}))).unwrap();
        assert!(status.can_view);
    }

    #[test]
    fn test_null_keys_resolve_to_defaults() {
        let status = LockStatus::from_payload(&payload(json!({
            "locked_for_user": null,
            "lock_explanation": null,
            "lock_info": null
        })))
        .unwrap();
        assert_eq!(status, LockStatus::default());
    }

    #[test]
    fn test_empty_explanation_is_kept_distinct_from_absent() {
        let status =
            LockStatus::from_payload(&payload(json!({"lock_explanation": ""}))).unwrap();
        assert_eq!(status.lock_explanation.as_deref(), Some(""));
    }

    #[test]
    fn test_type_mismatch_on_present_key() {
        assert!(LockStatus::from_payload(&payload(json!({"locked_for_user": "yes"}))).is_err());
        assert!(LockStatus::from_payload(&payload(json!({"lock_explanation": 3}))).is_err());
        assert!(
            LockStatus::from_payload(&payload(json!({"lock_info": {"can_view": 1}}))).is_err()
        );
        assert!(LockStatus::from_payload(&payload(json!({"lock_info": []}))).is_err());
    }

    #[test]
    fn test_accessible_needs_view_and_no_lock() {
        assert!(LockStatus::default().is_accessible());
        let hidden = LockStatus {
            can_view: false,
            ..LockStatus::default()
        };
        assert!(!hidden.is_accessible());
        let locked = LockStatus {
            locked_for_user: true,
            ..LockStatus::default()
        };
        assert!(!locked.is_accessible());
    }

    struct Gate(LockStatus);

    impl Lockable for Gate {
        fn lock_status(&self) -> &LockStatus {
            &self.0
        }

        fn set_lock_status(&mut self, status: LockStatus) {
            self.0 = status;
        }
    }

    #[test]
    fn test_update_lock_status_keeps_old_value_on_error() {
        let mut gate = Gate(LockStatus::default());
        gate.update_lock_status(&payload(json!({"locked_for_user": true})))
            .unwrap();
        assert!(gate.is_locked());

        assert!(gate
            .update_lock_status(&payload(json!({"locked_for_user": "no"})))
            .is_err());
        assert!(gate.lock_status().locked_for_user);
    }
}
