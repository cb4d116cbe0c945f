use mesh_exchange::prelude::*;

fn store_with_side_set() -> Store<MemoryBackend> {
    let mut store =
        Store::create_with(MemoryBackend::new(), CreateOptions::default()).expect("create");
    store
        .initialize(InitParams {
            num_dim: 3,
            num_nodes: 8,
            num_elem: 2,
            num_elem_blk: 1,
            num_side_sets: 1,
            num_node_sets: 1,
            ..Default::default()
        })
        .expect("initialize");
    store
        .put_set_params(
            EntityKind::SideSet,
            EntityId::new(5),
            SetParams {
                entry_count: 2,
                dist_factor_count: 7,
            },
        )
        .expect("side set params");
    store
}

#[test]
fn dist_factor_length_is_sum_of_side_node_counts() {
    let mut store = store_with_side_set();
    store
        .put_side_set(EntityId::new(5), &[1, 2], &[1, 4])
        .expect("membership");
    // Side A touches 3 nodes, side B touches 4.
    store
        .put_side_set_node_counts(EntityId::new(5), &[3, 4])
        .expect("node counts");

    let err = store
        .put_dist_factors(EntityKind::SideSet, EntityId::new(5), &[1.0, 1.0])
        .unwrap_err();
    assert_eq!(
        err,
        MeshExchangeError::ShapeMismatch {
            context: "distribution factors",
            expected: 7,
            found: 2
        }
    );
    let err = store
        .put_dist_factors(EntityKind::SideSet, EntityId::new(5), &[1.0; 6])
        .unwrap_err();
    assert!(matches!(err, MeshExchangeError::ShapeMismatch { .. }));
    store
        .put_dist_factors(EntityKind::SideSet, EntityId::new(5), &[0.5; 7])
        .expect("factors");
    assert_eq!(
        store
            .get_dist_factors(EntityKind::SideSet, EntityId::new(5))
            .expect("read"),
        vec![0.5; 7]
    );
}

#[test]
fn empty_dist_factors_mean_no_weighting() {
    let mut store = store_with_side_set();
    store
        .put_side_set_node_counts(EntityId::new(5), &[3, 4])
        .expect("node counts");
    store
        .put_dist_factors(EntityKind::SideSet, EntityId::new(5), &[])
        .expect("empty is a sentinel");
    assert!(store
        .get_dist_factors(EntityKind::SideSet, EntityId::new(5))
        .expect("read")
        .is_empty());
}

#[test]
fn side_set_membership_is_parallel_pairs() {
    let mut store = store_with_side_set();
    let err = store
        .put_side_set(EntityId::new(5), &[1, 2], &[1])
        .unwrap_err();
    assert!(matches!(err, MeshExchangeError::ShapeMismatch { .. }));
    store
        .put_side_set(EntityId::new(5), &[1, 2], &[3, 6])
        .expect("membership");
    let (elements, sides) = store.get_side_set(EntityId::new(5)).expect("read");
    assert_eq!(elements, vec![1, 2]);
    assert_eq!(sides, vec![3, 6]);
}

#[test]
fn puts_before_definition_fail() {
    let mut store = store_with_side_set();
    let err = store
        .put_set(EntityKind::NodeSet, EntityId::new(9), &[1, 2])
        .unwrap_err();
    assert_eq!(
        err,
        MeshExchangeError::EntityNotDefined {
            kind: EntityKind::NodeSet,
            id: EntityId::new(9)
        }
    );
    let err = store
        .put_connectivity(EntityKind::ElementBlock, EntityId::new(1), &[1, 2, 3, 4])
        .unwrap_err();
    assert_eq!(
        err,
        MeshExchangeError::EntityNotDefined {
            kind: EntityKind::ElementBlock,
            id: EntityId::new(1)
        }
    );
}

#[test]
fn node_set_dist_factors_use_declared_count() {
    let mut store = store_with_side_set();
    store
        .put_set_params(
            EntityKind::NodeSet,
            EntityId::new(2),
            SetParams {
                entry_count: 3,
                dist_factor_count: 3,
            },
        )
        .expect("params");
    store
        .put_set(EntityKind::NodeSet, EntityId::new(2), &[2, 4, 6])
        .expect("members");
    let err = store
        .put_dist_factors(EntityKind::NodeSet, EntityId::new(2), &[1.0, 2.0])
        .unwrap_err();
    assert!(matches!(err, MeshExchangeError::ShapeMismatch { .. }));
    store
        .put_dist_factors(EntityKind::NodeSet, EntityId::new(2), &[1.0, 2.0, 3.0])
        .expect("factors");
}

#[test]
fn all_set_params_in_index_order() {
    let mut store = store_with_side_set();
    store
        .put_set_params(
            EntityKind::NodeSet,
            EntityId::new(2),
            SetParams {
                entry_count: 3,
                dist_factor_count: 0,
            },
        )
        .expect("params");
    let all = store
        .get_all_set_params(EntityKind::SideSet)
        .expect("side sets");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].0, EntityId::new(5));
    assert_eq!(all[0].1.entry_count, 2);
    let all = store.get_all_set_params(EntityKind::NodeSet).expect("node sets");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].1.dist_factor_count, 0);
}
