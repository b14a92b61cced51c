//! Sibling ordering for the content tree.
//!
//! Sections within a course, lessons within a section and exercises within
//! a lesson all keep a contiguous 0-based order index. One generic utility
//! backs all three containers.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{LearnError, LearnResult};

/// Accessors for members of an ordered sibling collection.
pub trait Ordered {
    fn id(&self) -> Uuid;
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

/// Reassign contiguous 0-based indices, preserving relative order.
///
/// Used after a single-element removal so the remaining siblings close the
/// gap left behind.
pub fn reindex<T: Ordered>(items: &mut [T]) {
    for (idx, item) in items.iter_mut().enumerate() {
        item.set_order(idx as u32);
    }
}

/// Apply a caller-supplied full permutation of member ids.
///
/// The id list must contain exactly the current members. Validation happens
/// before any index is touched, so a rejected call leaves the collection
/// unchanged.
pub fn apply_order<T: Ordered>(items: &mut [T], ids: &[Uuid]) -> LearnResult<()> {
    if ids.len() != items.len() {
        return Err(LearnError::Validation(format!(
            "Reorder expects {} ids, got {}",
            items.len(),
            ids.len()
        )));
    }

    let mut positions: HashMap<Uuid, u32> = HashMap::with_capacity(ids.len());
    for (idx, id) in ids.iter().enumerate() {
        if !items.iter().any(|item| item.id() == *id) {
            return Err(LearnError::Validation(format!(
                "Unknown id in reorder list: {}",
                id
            )));
        }
        if positions.insert(*id, idx as u32).is_some() {
            return Err(LearnError::Validation(format!(
                "Duplicate id in reorder list: {}",
                id
            )));
        }
    }

    // Count, membership and uniqueness all hold, so this is a bijection.
    for item in items.iter_mut() {
        item.set_order(positions[&item.id()]);
    }
    items.sort_by_key(|item| item.order());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Member {
        id: Uuid,
        order: u32,
    }

    impl Ordered for Member {
        fn id(&self) -> Uuid {
            self.id
        }
        fn order(&self) -> u32 {
            self.order
        }
        fn set_order(&mut self, order: u32) {
            self.order = order;
        }
    }

    fn members(n: usize) -> Vec<Member> {
        (0..n)
            .map(|i| Member {
                id: Uuid::new_v4(),
                order: i as u32,
            })
            .collect()
    }

    fn orders(items: &[Member]) -> Vec<u32> {
        items.iter().map(|m| m.order).collect()
    }

    #[test]
    fn apply_order_reorders_and_keeps_indices_contiguous() {
        let mut items = members(3);
        let ids = vec![items[2].id, items[0].id, items[1].id];
        apply_order(&mut items, &ids).unwrap();
        let reordered: Vec<Uuid> = items.iter().map(|m| m.id).collect();
        assert_eq!(reordered, ids);
        assert_eq!(orders(&items), vec![0, 1, 2]);
    }

    #[test]
    fn apply_order_rejects_count_mismatch() {
        let mut items = members(3);
        let ids = vec![items[0].id, items[1].id];
        let err = apply_order(&mut items, &ids).unwrap_err();
        assert!(matches!(err, LearnError::Validation(_)));
        assert!(err.to_string().contains("expects 3 ids, got 2"));
        // original order untouched
        assert_eq!(orders(&items), vec![0, 1, 2]);
    }

    #[test]
    fn apply_order_rejects_unknown_id() {
        let mut items = members(2);
        let stranger = Uuid::new_v4();
        let ids = vec![items[0].id, stranger];
        let err = apply_order(&mut items, &ids).unwrap_err();
        assert!(err.to_string().contains(&stranger.to_string()));
    }

    #[test]
    fn apply_order_rejects_duplicate_id() {
        let mut items = members(2);
        let ids = vec![items[0].id, items[0].id];
        let err = apply_order(&mut items, &ids).unwrap_err();
        assert!(err.to_string().contains("Duplicate id"));
    }

    #[test]
    fn reindex_closes_gaps_after_removal() {
        let mut items = members(4);
        items.remove(1);
        reindex(&mut items);
        assert_eq!(orders(&items), vec![0, 1, 2]);
    }
}
