//! crates/wordshelf_core/src/counters.rs
//!
//! The counter-consistency engine. Every denormalized counter in the
//! schema (`User.stats`, `Book.stats`, `LibraryEntry.words_count`,
//! `Word.likes_count`) is mutated here and nowhere else, inside the same
//! transaction as the primary write.
//!
//! Decrements clamp at zero. A clamp that actually engages means some
//! counter drifted from the true referent count, so it is logged rather
//! than silently absorbed.

use tracing::warn;

use crate::domain::{BookStats, UserStats};

fn bump(value: u32) -> u32 {
    value.saturating_add(1)
}

fn clamped_sub(value: u32, delta: u32, counter: &'static str) -> u32 {
    match value.checked_sub(delta) {
        Some(remaining) => remaining,
        None => {
            warn!(counter, value, delta, "counter decrement clamped at zero");
            0
        }
    }
}

// --- Library entry added / removed ---

pub fn user_entry_added(stats: &mut UserStats) {
    stats.books_count = bump(stats.books_count);
}

pub fn book_entry_added(stats: &mut BookStats) {
    stats.readers_count = bump(stats.readers_count);
}

/// Entry removal also deletes its words, so the user's word counter drops
/// by the cascade size.
pub fn user_entry_removed(stats: &mut UserStats, words_removed: u32) {
    stats.books_count = clamped_sub(stats.books_count, 1, "user.books_count");
    stats.words_count = clamped_sub(stats.words_count, words_removed, "user.words_count");
}

pub fn book_entry_removed(stats: &mut BookStats, words_removed: u32) {
    stats.readers_count = clamped_sub(stats.readers_count, 1, "book.readers_count");
    stats.words_count = clamped_sub(stats.words_count, words_removed, "book.words_count");
}

// --- Word added / removed ---

pub fn user_word_added(stats: &mut UserStats) {
    stats.words_count = bump(stats.words_count);
}

pub fn book_word_added(stats: &mut BookStats) {
    stats.words_count = bump(stats.words_count);
}

pub fn entry_word_added(words_count: &mut u32) {
    *words_count = bump(*words_count);
}

pub fn user_word_removed(stats: &mut UserStats) {
    stats.words_count = clamped_sub(stats.words_count, 1, "user.words_count");
}

pub fn book_word_removed(stats: &mut BookStats) {
    stats.words_count = clamped_sub(stats.words_count, 1, "book.words_count");
}

pub fn entry_word_removed(words_count: &mut u32) {
    *words_count = clamped_sub(*words_count, 1, "entry.words_count");
}

// --- Likes ---

pub fn word_liked(likes_count: &mut u32) {
    *likes_count = bump(*likes_count);
}

pub fn word_unliked(likes_count: &mut u32) {
    *likes_count = clamped_sub(*likes_count, 1, "word.likes_count");
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn entry_removal_applies_both_deltas() {
        let mut user = UserStats {
            books_count: 3,
            words_count: 10,
            current_streak: 2,
        };
        user_entry_removed(&mut user, 4);
        assert_eq!(user.books_count, 2);
        assert_eq!(user.words_count, 6);
        // streak is not a referent counter and must stay untouched
        assert_eq!(user.current_streak, 2);

        let mut book = BookStats {
            readers_count: 1,
            words_count: 4,
        };
        book_entry_removed(&mut book, 4);
        assert_eq!(book.readers_count, 0);
        assert_eq!(book.words_count, 0);
    }

    #[test]
    fn over_decrement_clamps_at_zero() {
        let mut book = BookStats::default();
        book_entry_removed(&mut book, 7);
        assert_eq!(book.readers_count, 0);
        assert_eq!(book.words_count, 0);

        let mut likes = 0u32;
        word_unliked(&mut likes);
        assert_eq!(likes, 0);
    }

    proptest! {
        #[test]
        fn clamped_sub_never_goes_negative(value in 0u32..1_000_000, delta in 0u32..1_000_000) {
            let result = clamped_sub(value, delta, "test");
            prop_assert!(result <= value);
            if delta <= value {
                prop_assert_eq!(result, value - delta);
            } else {
                prop_assert_eq!(result, 0);
            }
        }

        #[test]
        fn add_then_remove_is_identity_above_zero(start in 1u32..1_000_000) {
            let mut count = start;
            entry_word_added(&mut count);
            entry_word_removed(&mut count);
            prop_assert_eq!(count, start);
        }
    }
}
