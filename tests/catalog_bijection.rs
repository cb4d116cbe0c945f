use mesh_exchange::catalog::entity::EntityId;
use mesh_exchange::catalog::{EntityCatalog, EntityKind};
use mesh_exchange::exchange_error::MeshExchangeError;
use proptest::prelude::*;
use std::collections::HashSet;

proptest! {
    /// For any list of distinct ids, resolve_index(L[i]) == i + 1 and the
    /// mapping is injective.
    #[test]
    fn id_index_bijection(raw_ids in proptest::collection::hash_set(any::<i64>(), 0..64)) {
        let ids: Vec<EntityId> = raw_ids.into_iter().map(EntityId::new).collect();
        let mut catalog = EntityCatalog::default();
        catalog
            .define_entities(EntityKind::ElementBlock, &ids, ids.len())
            .expect("define");
        let mut seen = HashSet::new();
        for (i, &id) in ids.iter().enumerate() {
            let index = catalog
                .resolve_index(EntityKind::ElementBlock, id)
                .expect("resolve");
            prop_assert_eq!(index, i + 1);
            prop_assert!(seen.insert(index), "index {} mapped twice", index);
        }
        catalog.validate_invariants().expect("invariants");
    }

    /// Any list with at least one repeated id is rejected and leaves the
    /// kind empty.
    #[test]
    fn duplicate_ids_rejected(raw_ids in proptest::collection::vec(-8i64..8, 2..32)) {
        let distinct: HashSet<i64> = raw_ids.iter().copied().collect();
        prop_assume!(distinct.len() < raw_ids.len());
        let ids: Vec<EntityId> = raw_ids.into_iter().map(EntityId::new).collect();
        let mut catalog = EntityCatalog::default();
        let err = catalog
            .define_entities(EntityKind::NodeSet, &ids, ids.len())
            .unwrap_err();
        let is_dup = matches!(err, MeshExchangeError::DuplicateEntityId { .. });
        prop_assert!(is_dup);
        prop_assert_eq!(catalog.count(EntityKind::NodeSet), 0);
    }
}

#[test]
fn unknown_id_fails_hard() {
    let mut catalog = EntityCatalog::default();
    catalog
        .define_entities(EntityKind::SideSet, &[EntityId::new(3)], 1)
        .expect("define");
    let err = catalog
        .resolve_index(EntityKind::SideSet, EntityId::new(4))
        .unwrap_err();
    assert_eq!(
        err,
        MeshExchangeError::UnknownEntityId {
            kind: EntityKind::SideSet,
            id: EntityId::new(4)
        }
    );
}
