use std::collections::HashSet;

use crate::core::error::MatchError;
use crate::core::matcher::{require_role, Matchmaker};
use crate::models::{Principal, RecipientRecord, Role, Wishlist, WishlistItem};

/// One empty wishlist per child, numbered from 1
pub fn empty_wishlists(kid_count: u32) -> Vec<Wishlist> {
    (1..=kid_count)
        .map(|child_id| Wishlist {
            child_id,
            items: Vec::new(),
        })
        .collect()
}

fn child_mut(wishlists: &mut [Wishlist], child_id: u32) -> Result<&mut Wishlist, MatchError> {
    wishlists
        .iter_mut()
        .find(|wishlist| wishlist.child_id == child_id)
        .ok_or_else(|| MatchError::Validation(format!("no wishlist for child {}", child_id)))
}

/// Append an item to the end of a child's list
pub fn append_item(wishlists: &mut [Wishlist], child_id: u32, item: WishlistItem) -> Result<(), MatchError> {
    child_mut(wishlists, child_id)?.items.push(item);
    Ok(())
}

/// Replace the item at `index` in a child's list
pub fn edit_item(
    wishlists: &mut [Wishlist],
    child_id: u32,
    index: usize,
    item: WishlistItem,
) -> Result<(), MatchError> {
    let wishlist = child_mut(wishlists, child_id)?;
    let len = wishlist.items.len();
    let slot = wishlist.items.get_mut(index).ok_or_else(|| {
        MatchError::Validation(format!(
            "item {} out of range for child {} ({} items)",
            index, child_id, len
        ))
    })?;
    *slot = item;
    Ok(())
}

/// Child ids must be unique and within `1..=kid_count`
pub fn validate_wishlists(wishlists: &[Wishlist], kid_count: u32) -> Result<(), MatchError> {
    let mut seen = HashSet::new();
    for wishlist in wishlists {
        if wishlist.child_id == 0 || wishlist.child_id > kid_count {
            return Err(MatchError::Validation(format!(
                "child {} outside 1..={}",
                wishlist.child_id, kid_count
            )));
        }
        if !seen.insert(wishlist.child_id) {
            return Err(MatchError::Validation(format!(
                "duplicate wishlist for child {}",
                wishlist.child_id
            )));
        }
    }
    Ok(())
}

impl Matchmaker {
    /// Load the caller's own approved record
    async fn approved_own_record(&self, principal: &Principal) -> Result<RecipientRecord, MatchError> {
        require_role(principal, Role::Recipient)?;
        let record = self.store().get_by_id(&principal.id).await?;
        if !record.approved {
            return Err(MatchError::NotApproved(record.id));
        }
        Ok(record)
    }

    /// The caller's wishlists, created empty on first access
    pub async fn wishlists(&self, principal: &Principal) -> Result<Vec<Wishlist>, MatchError> {
        let record = self.approved_own_record(principal).await?;
        if let Some(wishlists) = record.wishlists {
            return Ok(wishlists);
        }

        let empty = empty_wishlists(record.kid_count);
        if self.store().initialize_wishlists(&record.id, &empty).await? {
            tracing::debug!("Initialized {} wishlists for {}", empty.len(), record.id);
            return Ok(empty);
        }

        // Someone else initialized them between the read and the write
        let record = self.store().get_by_id(&record.id).await?;
        Ok(record.wishlists.unwrap_or(empty))
    }

    pub async fn append_item(
        &self,
        principal: &Principal,
        child_id: u32,
        item: WishlistItem,
    ) -> Result<Vec<Wishlist>, MatchError> {
        let record = self.approved_own_record(principal).await?;
        let mut wishlists = record
            .wishlists
            .unwrap_or_else(|| empty_wishlists(record.kid_count));

        append_item(&mut wishlists, child_id, item)?;
        self.store().overwrite_wishlists(&record.id, &wishlists).await?;

        Ok(wishlists)
    }

    pub async fn edit_item(
        &self,
        principal: &Principal,
        child_id: u32,
        index: usize,
        item: WishlistItem,
    ) -> Result<Vec<Wishlist>, MatchError> {
        let record = self.approved_own_record(principal).await?;
        let mut wishlists = record
            .wishlists
            .unwrap_or_else(|| empty_wishlists(record.kid_count));

        edit_item(&mut wishlists, child_id, index, item)?;
        self.store().overwrite_wishlists(&record.id, &wishlists).await?;

        Ok(wishlists)
    }

    /// Replace all of the caller's wishlists; the last save wins
    pub async fn save_wishlists(
        &self,
        principal: &Principal,
        wishlists: Vec<Wishlist>,
    ) -> Result<Vec<Wishlist>, MatchError> {
        let record = self.approved_own_record(principal).await?;
        validate_wishlists(&wishlists, record.kid_count)?;

        self.store().overwrite_wishlists(&record.id, &wishlists).await?;
        tracing::info!("Saved {} wishlists for {}", wishlists.len(), record.id);

        Ok(wishlists)
    }
}
