//! crates/wordshelf_core/src/gate.rs
//!
//! The ownership gate: every operation that touches user-owned data goes
//! through these two checks instead of repeating them inline.

use uuid::Uuid;

use crate::domain::{LibraryEntry, Word};
use crate::ports::{PortError, PortResult};

/// Entities exclusively owned by a single user.
pub trait Owned {
    /// Noun used in `NotFound` errors, e.g. "word".
    const KIND: &'static str;

    fn owner(&self) -> Uuid;
}

impl Owned for LibraryEntry {
    const KIND: &'static str = "Library entry";

    fn owner(&self) -> Uuid {
        self.user_id
    }
}

impl Owned for Word {
    const KIND: &'static str = "Word";

    fn owner(&self) -> Uuid {
        self.user_id
    }
}

/// Resolve the caller identity, failing with `Unauthenticated` when the
/// identity provider produced none.
pub fn require_caller(caller: Option<Uuid>) -> PortResult<Uuid> {
    caller.ok_or(PortError::Unauthenticated)
}

/// Verify that `entity` exists and belongs to `caller`.
///
/// A missing entity and one owned by somebody else produce the identical
/// `NotFound`, so a caller can never learn whether a foreign id exists.
pub fn ensure_owner<T: Owned>(entity: Option<T>, caller: Uuid) -> PortResult<T> {
    match entity {
        Some(entity) if entity.owner() == caller => Ok(entity),
        _ => Err(PortError::NotFound(T::KIND.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::ReadingStatus;

    fn entry_owned_by(user_id: Uuid) -> LibraryEntry {
        LibraryEntry {
            id: Uuid::new_v4(),
            user_id,
            book_id: Uuid::new_v4(),
            status: ReadingStatus::Reading,
            notes: None,
            words_count: 0,
            started_at: None,
            finished_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn require_caller_rejects_anonymous() {
        assert!(matches!(
            require_caller(None),
            Err(PortError::Unauthenticated)
        ));
        let id = Uuid::new_v4();
        assert_eq!(require_caller(Some(id)).unwrap(), id);
    }

    #[test]
    fn missing_and_foreign_entities_are_indistinguishable() {
        let caller = Uuid::new_v4();
        let missing = ensure_owner::<LibraryEntry>(None, caller).unwrap_err();
        let foreign = ensure_owner(Some(entry_owned_by(Uuid::new_v4())), caller).unwrap_err();
        assert_eq!(missing.to_string(), foreign.to_string());
    }

    #[test]
    fn owner_passes_the_gate() {
        let caller = Uuid::new_v4();
        let entry = entry_owned_by(caller);
        let id = entry.id;
        assert_eq!(ensure_owner(Some(entry), caller).unwrap().id, id);
    }
}
