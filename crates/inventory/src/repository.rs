//! Product storage contract and its in-memory implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use stockline_core::{DomainError, DomainResult, ProductId};
use stockline_products::{Product, ProductKind};

/// Mutation applied to a stored product through [`ProductRepository::update`].
pub type ProductMutation<'a> = &'a mut dyn FnMut(&mut Product) -> DomainResult<()>;

/// Keyed product store. At most one product per id.
///
/// Every read hands out snapshots (clones); nothing returned lets a caller
/// reach into the store. All writes go through `add`, `remove` or `update`.
pub trait ProductRepository: Send + Sync {
    /// Store a product. Fails with `DuplicateKey` if the id is taken.
    fn add(&self, product: Product) -> DomainResult<()>;

    /// Delete a product and return it. Fails with `NotFound` if absent.
    fn remove(&self, id: &ProductId) -> DomainResult<Product>;

    fn find_by_id(&self, id: &ProductId) -> Option<Product>;

    /// Case-insensitive name search, ordered by id. A blank fragment matches nothing.
    fn find_by_name_contains(&self, fragment: &str) -> Vec<Product>;

    /// All products, ordered by id.
    fn all_products(&self) -> Vec<Product>;

    /// Products of one variant, ordered by id.
    fn by_kind(&self, kind: ProductKind) -> Vec<Product>;

    fn count(&self) -> usize;

    fn contains(&self, id: &ProductId) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Run `mutation` against the stored product under the store's exclusive
    /// lock and return the resulting snapshot.
    ///
    /// The mutation is all-or-nothing: if it fails, the stored product is
    /// unchanged. Fails with `NotFound` if the id is absent.
    fn update(&self, id: &ProductId, mutation: ProductMutation<'_>) -> DomainResult<Product>;
}

impl<S> ProductRepository for Arc<S>
where
    S: ProductRepository + ?Sized,
{
    fn add(&self, product: Product) -> DomainResult<()> {
        (**self).add(product)
    }

    fn remove(&self, id: &ProductId) -> DomainResult<Product> {
        (**self).remove(id)
    }

    fn find_by_id(&self, id: &ProductId) -> Option<Product> {
        (**self).find_by_id(id)
    }

    fn find_by_name_contains(&self, fragment: &str) -> Vec<Product> {
        (**self).find_by_name_contains(fragment)
    }

    fn all_products(&self) -> Vec<Product> {
        (**self).all_products()
    }

    fn by_kind(&self, kind: ProductKind) -> Vec<Product> {
        (**self).by_kind(kind)
    }

    fn count(&self) -> usize {
        (**self).count()
    }

    fn contains(&self, id: &ProductId) -> bool {
        (**self).contains(id)
    }

    fn update(&self, id: &ProductId, mutation: ProductMutation<'_>) -> DomainResult<Product> {
        (**self).update(id, mutation)
    }
}

/// In-memory product store for tests/dev.
///
/// One `RwLock` guards the whole map, so `update` serializes every
/// check-then-mutate sequence against the same repository. Reads recover
/// from a poisoned lock (writes commit atomically, so the map is never
/// half-updated); writes report it as a storage failure.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    inner: RwLock<BTreeMap<ProductId, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot<F>(&self, keep: F) -> Vec<Product>
    where
        F: Fn(&Product) -> bool,
    {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.values().filter(|&p| keep(p)).cloned().collect()
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn add(&self, product: Product) -> DomainResult<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::storage("lock poisoned"))?;

        let id = product.id().clone();
        if map.contains_key(&id) {
            return Err(DomainError::DuplicateKey(id));
        }
        map.insert(id, product);
        Ok(())
    }

    fn remove(&self, id: &ProductId) -> DomainResult<Product> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::storage("lock poisoned"))?;

        map.remove(id).ok_or_else(|| DomainError::not_found(id))
    }

    fn find_by_id(&self, id: &ProductId) -> Option<Product> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(id).cloned()
    }

    fn find_by_name_contains(&self, fragment: &str) -> Vec<Product> {
        if fragment.trim().is_empty() {
            return vec![];
        }
        let needle = fragment.to_lowercase();
        self.snapshot(|p| p.name().to_lowercase().contains(&needle))
    }

    fn all_products(&self) -> Vec<Product> {
        self.snapshot(|_| true)
    }

    fn by_kind(&self, kind: ProductKind) -> Vec<Product> {
        self.snapshot(|p| p.kind() == kind)
    }

    fn count(&self) -> usize {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.len()
    }

    fn contains(&self, id: &ProductId) -> bool {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.contains_key(id)
    }

    fn update(&self, id: &ProductId, mutation: ProductMutation<'_>) -> DomainResult<Product> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::storage("lock poisoned"))?;

        let stored = map.get_mut(id).ok_or_else(|| DomainError::not_found(id))?;

        // Mutate a copy and commit only on success.
        let mut draft = stored.clone();
        mutation(&mut draft)?;
        *stored = draft.clone();
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockline_products::{DigitalProduct, PhysicalProduct, ProductCore, ShippingRates};

    fn pid(raw: &str) -> ProductId {
        ProductId::new(raw).unwrap()
    }

    fn physical(id: &str, name: &str, stock: i64) -> Product {
        let core = ProductCore::new(id, name, 10.0, stock).unwrap();
        PhysicalProduct::new(core, 1.0, "10x10x10 cm", ShippingRates::flat(0.5))
            .unwrap()
            .into()
    }

    fn digital(id: &str, name: &str) -> Product {
        let core = ProductCore::new(id, name, 5.0, 50).unwrap();
        DigitalProduct::new(core, 2.0, "PDF", "https://dl.example")
            .unwrap()
            .into()
    }

    #[test]
    fn duplicate_add_keeps_the_first_product() {
        let repo = InMemoryProductRepository::new();
        repo.add(physical("F01", "Laptop", 10)).unwrap();

        let err = repo.add(physical("F01", "Impostor", 1)).unwrap_err();
        assert_eq!(err, DomainError::DuplicateKey(pid("F01")));
        assert_eq!(repo.count(), 1);
        assert_eq!(repo.find_by_id(&pid("F01")).unwrap().name(), "Laptop");
    }

    #[test]
    fn remove_then_lookup_is_absent() {
        let repo = InMemoryProductRepository::new();
        repo.add(physical("F01", "Laptop", 10)).unwrap();

        let removed = repo.remove(&pid("F01")).unwrap();
        assert_eq!(removed.name(), "Laptop");
        assert!(repo.find_by_id(&pid("F01")).is_none());
        assert!(!repo.contains(&pid("F01")));
        assert_eq!(repo.remove(&pid("F01")).unwrap_err(), DomainError::NotFound(pid("F01")));
    }

    #[test]
    fn name_search_is_case_insensitive_and_ordered() {
        let repo = InMemoryProductRepository::new();
        repo.add(physical("F02", "Office Chair", 3)).unwrap();
        repo.add(physical("F01", "Gaming CHAIR", 2)).unwrap();
        repo.add(digital("D01", "Chess eBook")).unwrap();

        let ids: Vec<String> = repo
            .find_by_name_contains("chair")
            .iter()
            .map(|p| p.id().to_string())
            .collect();
        assert_eq!(ids, vec!["F01", "F02"]);

        assert!(repo.find_by_name_contains("sofa").is_empty());
        assert!(repo.find_by_name_contains("  ").is_empty());
    }

    #[test]
    fn name_search_matches_the_fragment_as_given() {
        let repo = InMemoryProductRepository::new();
        repo.add(digital("D01", "Clean Code eBook")).unwrap();

        assert_eq!(repo.find_by_name_contains("EBOOK").len(), 1);
        assert_eq!(repo.find_by_name_contains("code eb").len(), 1);
        assert!(repo.find_by_name_contains("ebook ").is_empty());
        assert!(repo.find_by_name_contains(" clean").is_empty());
    }

    #[test]
    fn kind_filter_and_snapshots() {
        let repo = InMemoryProductRepository::new();
        repo.add(physical("F01", "Laptop", 10)).unwrap();
        repo.add(digital("D01", "eBook")).unwrap();
        repo.add(digital("D02", "Album")).unwrap();

        assert_eq!(repo.by_kind(ProductKind::Physical).len(), 1);
        assert_eq!(repo.by_kind(ProductKind::Digital).len(), 2);
        assert_eq!(repo.all_products().len(), 3);

        // Mutating a snapshot leaves the store untouched.
        let mut snapshot = repo.find_by_id(&pid("F01")).unwrap();
        snapshot.adjust_stock(-10).unwrap();
        assert_eq!(repo.find_by_id(&pid("F01")).unwrap().stock(), 10);
    }

    #[test]
    fn update_commits_successful_mutations() {
        let repo = InMemoryProductRepository::new();
        repo.add(physical("F01", "Laptop", 10)).unwrap();

        let updated = repo
            .update(&pid("F01"), &mut |p| p.adjust_stock(-3).map(|_| ()))
            .unwrap();
        assert_eq!(updated.stock(), 7);
        assert_eq!(repo.find_by_id(&pid("F01")).unwrap().stock(), 7);
    }

    #[test]
    fn failed_update_leaves_product_unchanged() {
        let repo = InMemoryProductRepository::new();
        repo.add(physical("F01", "Laptop", 10)).unwrap();

        let err = repo
            .update(&pid("F01"), &mut |p| {
                p.adjust_stock(-4)?;
                p.adjust_stock(-20)?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));
        assert_eq!(repo.find_by_id(&pid("F01")).unwrap().stock(), 10);
    }

    #[test]
    fn update_of_missing_product_is_not_found() {
        let repo = InMemoryProductRepository::new();
        let err = repo.update(&pid("X"), &mut |_| Ok(())).unwrap_err();
        assert_eq!(err, DomainError::NotFound(pid("X")));
    }

    #[test]
    fn shared_through_arc() {
        let repo = Arc::new(InMemoryProductRepository::new());
        let handle = Arc::clone(&repo);
        handle.add(digital("D01", "eBook")).unwrap();
        assert_eq!(repo.count(), 1);
    }
}
