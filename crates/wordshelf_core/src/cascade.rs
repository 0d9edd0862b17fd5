//! crates/wordshelf_core/src/cascade.rs
//!
//! Cascade-delete policy for the ownership graph, declared once per
//! relationship: a word owns its likes, a library entry owns its words.
//! Deleting a parent walks its dependents depth-first, dependents first,
//! so the store never holds a row pointing at a missing parent.
//!
//! Only rows are deleted here. The matching counter adjustments are
//! applied by the caller through `counters`, using the returned cascade
//! size.

use uuid::Uuid;

use crate::ports::{PortResult, StoreTx};

/// Delete a word together with every like attached to it.
pub async fn delete_word(tx: &mut dyn StoreTx, word_id: Uuid) -> PortResult<()> {
    tx.delete_likes_for_word(word_id).await?;
    tx.delete_word(word_id).await?;
    Ok(())
}

/// Delete a library entry together with its full word/like subtree.
/// Returns the number of words that were deleted.
pub async fn delete_entry(tx: &mut dyn StoreTx, entry_id: Uuid) -> PortResult<u32> {
    let words = tx.list_words_for_entry(entry_id, None).await?;
    for word in &words {
        delete_word(tx, word.id).await?;
    }
    tx.delete_entry(entry_id).await?;
    Ok(words.len() as u32)
}
