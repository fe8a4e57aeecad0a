use crate::error::VaultError;
use crate::types::{PrincipalId, MAX_OWNERS};
use std::collections::HashMap;

/// The set of controlling identities.
///
/// Owners are held in an ordered vector with a reverse index for O(1)
/// membership tests. Removal swaps the last element into the freed slot and
/// truncates, so the relative ordering of the remaining owners is not
/// preserved across removals.
#[derive(Debug, Clone)]
pub struct OwnerRegistry {
    ordered: Vec<PrincipalId>,
    index: HashMap<PrincipalId, usize>,
}

impl OwnerRegistry {
    /// Build a registry from an initial owner list.
    ///
    /// Rejects an empty list, null identities, duplicates, and lists larger
    /// than [`MAX_OWNERS`].
    pub fn new(owners: Vec<PrincipalId>) -> Result<Self, VaultError> {
        if owners.is_empty() {
            return Err(VaultError::EmptyOwnerSet);
        }

        let mut registry = Self {
            ordered: Vec::with_capacity(owners.len()),
            index: HashMap::with_capacity(owners.len()),
        };
        for owner in owners {
            registry.add(owner)?;
        }
        Ok(registry)
    }

    pub fn contains(&self, owner: &PrincipalId) -> bool {
        self.index.contains_key(owner)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Current owners in registry order.
    pub fn owners(&self) -> &[PrincipalId] {
        &self.ordered
    }

    pub(crate) fn add(&mut self, owner: PrincipalId) -> Result<(), VaultError> {
        if owner.is_null() {
            return Err(VaultError::NullPrincipal);
        }
        if self.index.contains_key(&owner) {
            return Err(VaultError::DuplicateOwner { owner });
        }
        if self.ordered.len() >= MAX_OWNERS {
            return Err(VaultError::OwnerLimitReached { max: MAX_OWNERS });
        }

        self.index.insert(owner.clone(), self.ordered.len());
        self.ordered.push(owner);
        Ok(())
    }

    pub(crate) fn remove(&mut self, owner: &PrincipalId) -> Result<(), VaultError> {
        let slot = match self.index.remove(owner) {
            Some(slot) => slot,
            None => {
                return Err(VaultError::UnknownOwner {
                    owner: owner.clone(),
                })
            }
        };

        self.ordered.swap_remove(slot);
        if let Some(moved) = self.ordered.get(slot) {
            self.index.insert(moved.clone(), slot);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<PrincipalId> {
        names.iter().map(|n| PrincipalId::new(*n)).collect()
    }

    #[test]
    fn rejects_empty_null_and_duplicate_owners() {
        assert!(matches!(
            OwnerRegistry::new(vec![]),
            Err(VaultError::EmptyOwnerSet)
        ));
        assert!(matches!(
            OwnerRegistry::new(ids(&["a", ""])),
            Err(VaultError::NullPrincipal)
        ));
        assert!(matches!(
            OwnerRegistry::new(ids(&["a", "a"])),
            Err(VaultError::DuplicateOwner { .. })
        ));
    }

    #[test]
    fn enforces_owner_cap() {
        let many: Vec<PrincipalId> = (0..MAX_OWNERS)
            .map(|n| PrincipalId::new(format!("owner-{n}")))
            .collect();
        let mut registry = OwnerRegistry::new(many).expect("cap-sized set is valid");
        assert_eq!(registry.len(), MAX_OWNERS);

        let err = registry.add(PrincipalId::new("one-too-many")).unwrap_err();
        assert!(matches!(err, VaultError::OwnerLimitReached { .. }));
    }

    #[test]
    fn swap_remove_keeps_index_consistent() {
        let mut registry = OwnerRegistry::new(ids(&["a", "b", "c", "d"])).unwrap();
        registry.remove(&PrincipalId::new("b")).unwrap();

        // "d" took b's slot; ordering is not stable, membership is.
        assert_eq!(registry.len(), 3);
        assert!(registry.contains(&PrincipalId::new("a")));
        assert!(!registry.contains(&PrincipalId::new("b")));
        assert!(registry.contains(&PrincipalId::new("c")));
        assert!(registry.contains(&PrincipalId::new("d")));
        assert_eq!(registry.owners()[1], PrincipalId::new("d"));

        registry.remove(&PrincipalId::new("d")).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&PrincipalId::new("c")));
    }

    #[test]
    fn removing_non_member_fails() {
        let mut registry = OwnerRegistry::new(ids(&["a"])).unwrap();
        assert!(matches!(
            registry.remove(&PrincipalId::new("ghost")),
            Err(VaultError::UnknownOwner { .. })
        ));
    }
}
