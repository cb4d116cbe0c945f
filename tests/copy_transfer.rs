use mesh_exchange::prelude::*;

/// Source store: one TRI3 block with one attribute, a node set, two time
/// steps, one element variable, one global variable, and a nodal variable.
fn build_source(backend: MemoryBackend) -> Store<MemoryBackend> {
    let mut store = Store::create_with(
        backend,
        CreateOptions {
            title: "copy source".into(),
            ..Default::default()
        },
    )
    .expect("create");
    store
        .initialize(InitParams {
            num_dim: 2,
            num_nodes: 3,
            num_elem: 1,
            num_elem_blk: 1,
            num_node_sets: 1,
            ..Default::default()
        })
        .expect("initialize");
    store
        .put_element_block(
            EntityId::new(1),
            BlockParams {
                topology: "TRI3".into(),
                entry_count: 1,
                nodes_per_entry: 3,
                attribute_count: 1,
            },
        )
        .expect("block");
    store
        .put_connectivity(EntityKind::ElementBlock, EntityId::new(1), &[1, 2, 3])
        .expect("connectivity");
    store
        .put_attribute_names(EntityKind::ElementBlock, EntityId::new(1), &["thickness"])
        .expect("attr names");
    store
        .put_attributes(EntityKind::ElementBlock, EntityId::new(1), &[0.125])
        .expect("attrs");
    store
        .set_name(EntityKind::ElementBlock, EntityId::new(1), "skin")
        .expect("name");
    store
        .put_coords(&[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0], &[])
        .expect("coords");
    store
        .put_set_params(
            EntityKind::NodeSet,
            EntityId::new(4),
            SetParams {
                entry_count: 2,
                dist_factor_count: 2,
            },
        )
        .expect("set params");
    store
        .put_set(EntityKind::NodeSet, EntityId::new(4), &[1, 3])
        .expect("set members");
    store
        .put_dist_factors(EntityKind::NodeSet, EntityId::new(4), &[0.5, 0.5])
        .expect("factors");
    store
        .put_qa_records(&[QaRecord::new("source", "1.0", "2026-08-06", "09:00:00")])
        .expect("qa");

    store
        .set_variable_count(EntityKind::ElementBlock, 1)
        .expect("elem vars");
    store
        .set_variable_name(EntityKind::ElementBlock, 1, "stress")
        .expect("elem var name");
    store.set_variable_count(EntityKind::Global, 1).expect("global vars");
    store
        .set_variable_name(EntityKind::Global, 1, "energy")
        .expect("global var name");
    store.set_variable_count(EntityKind::Nodal, 1).expect("nodal vars");
    store
        .set_variable_name(EntityKind::Nodal, 1, "temp")
        .expect("nodal var name");

    for (step, time) in [(1usize, 0.0f64), (2, 0.5)] {
        store.append_time(time).expect("time");
        store
            .put_variable_values(
                EntityKind::ElementBlock,
                EntityId::new(1),
                1,
                step,
                &[10.0 * step as f64],
            )
            .expect("elem value");
        store
            .put_global_values(step, &[100.0 * step as f64])
            .expect("global value");
        store
            .put_nodal_values(1, step, &[0.1, 0.2, 0.3])
            .expect("nodal value");
    }
    store
}

#[test]
fn copy_without_transient_reproduces_mesh_only() {
    let source = build_source(MemoryBackend::new());
    let dest_backend = MemoryBackend::new();
    let dest = copy_store(&source, dest_backend.clone(), &CopyOptions::default())
        .expect("copy");
    assert_eq!(dest.title(), "copy source");
    assert_eq!(
        dest.get_connectivity(EntityKind::ElementBlock, EntityId::new(1))
            .expect("connectivity"),
        vec![1, 2, 3]
    );
    assert_eq!(
        dest.name(EntityKind::ElementBlock, EntityId::new(1))
            .expect("name"),
        "skin"
    );
    assert_eq!(
        dest.get_dist_factors(EntityKind::NodeSet, EntityId::new(4))
            .expect("factors"),
        vec![0.5, 0.5]
    );
    assert_eq!(dest.get_qa_records().len(), 1);
    // Transient state was not replayed.
    assert_eq!(dest.num_times(), 0);
    assert_eq!(dest.variable_count(EntityKind::ElementBlock), 0);

    // The destination round-trips on its own backend.
    dest.close().expect("close");
    let reopened = Store::open_with(dest_backend, OpenMode::Read).expect("reopen");
    assert_eq!(reopened.num_nodes(), 3);
}

#[test]
fn copy_with_transient_replays_steps_and_values() {
    let source = build_source(MemoryBackend::new());
    let dest = copy_store(
        &source,
        MemoryBackend::new(),
        &CopyOptions {
            include_transient: true,
            ..Default::default()
        },
    )
    .expect("copy");
    assert_eq!(dest.num_times(), 2);
    assert_eq!(dest.times(), &[0.0, 0.5]);
    assert_eq!(
        dest.get_variable_values(EntityKind::ElementBlock, EntityId::new(1), 1, 2)
            .expect("elem value"),
        vec![20.0]
    );
    assert_eq!(dest.get_global_values(1).expect("globals"), vec![100.0]);
    assert_eq!(
        dest.get_nodal_values(1, 1).expect("nodal"),
        vec![0.1, 0.2, 0.3]
    );
    assert_eq!(
        dest.variable_names(EntityKind::ElementBlock),
        vec!["stress".to_string()]
    );
}

#[test]
fn schema_additions_default_fill_new_variables() {
    let source = build_source(MemoryBackend::new());
    let dest = copy_store(
        &source,
        MemoryBackend::new(),
        &CopyOptions {
            include_transient: true,
            additions: SchemaAdditions {
                global_variables: vec!["dummy_global".into()],
                nodal_variables: vec!["dummy_nodal".into()],
                element_variables: vec!["damage".into()],
                element_attributes: vec![(EntityId::new(1), "offset".into())],
            },
        },
    )
    .expect("copy");

    // Variable families grew by the added names, appended at the end.
    assert_eq!(
        dest.variable_names(EntityKind::ElementBlock),
        vec!["stress".to_string(), "damage".to_string()]
    );
    assert_eq!(
        dest.variable_names(EntityKind::Global),
        vec!["energy".to_string(), "dummy_global".to_string()]
    );

    // Added variables are zero-filled for every pre-existing step.
    for step in 1..=2 {
        assert_eq!(
            dest.get_variable_values(EntityKind::ElementBlock, EntityId::new(1), 2, step)
                .expect("added elem var"),
            vec![0.0]
        );
        assert_eq!(
            dest.get_variable_values(EntityKind::Global, EntityId::new(0), 2, step)
                .expect("added global var"),
            vec![0.0]
        );
        assert_eq!(
            dest.get_nodal_values(2, step).expect("added nodal var"),
            vec![0.0, 0.0, 0.0]
        );
    }
    // Copied values are untouched.
    assert_eq!(
        dest.get_variable_values(EntityKind::ElementBlock, EntityId::new(1), 1, 1)
            .expect("copied value"),
        vec![10.0]
    );

    // The block gained an attribute column, zero-filled.
    let params = dest
        .block_params(EntityKind::ElementBlock, EntityId::new(1))
        .expect("params");
    assert_eq!(params.attribute_count, 2);
    assert_eq!(
        dest.get_attribute_names(EntityKind::ElementBlock, EntityId::new(1))
            .expect("attr names"),
        vec!["thickness".to_string(), "offset".to_string()]
    );
    assert_eq!(
        dest.get_attribute_values(EntityKind::ElementBlock, EntityId::new(1), "thickness")
            .expect("old column"),
        vec![0.125]
    );
    assert_eq!(
        dest.get_attribute_values(EntityKind::ElementBlock, EntityId::new(1), "offset")
            .expect("new column"),
        vec![0.0]
    );

    // Truth table covers the widened family.
    assert_eq!(
        dest.get_truth_table(EntityKind::ElementBlock).len(),
        dest.declared_count(EntityKind::ElementBlock) * 2
    );
}

#[test]
fn copy_refuses_existing_destination() {
    let source = build_source(MemoryBackend::new());
    let dest_backend = MemoryBackend::new();
    let dest = copy_store(&source, dest_backend.clone(), &CopyOptions::default())
        .expect("first copy");
    dest.close().expect("close");
    let err = copy_store(&source, dest_backend, &CopyOptions::default()).unwrap_err();
    assert!(matches!(err, MeshExchangeError::FileExists(_)));
}

#[test]
fn copy_preserves_partial_truth_tables() {
    let backend = MemoryBackend::new();
    let mut source = Store::create_with(backend, CreateOptions::default()).expect("create");
    source
        .initialize(InitParams {
            num_dim: 2,
            num_nodes: 4,
            num_elem: 2,
            num_elem_blk: 2,
            ..Default::default()
        })
        .expect("initialize");
    for id in [1, 2] {
        source
            .put_element_block(
                EntityId::new(id),
                BlockParams {
                    topology: "TRI3".into(),
                    entry_count: 1,
                    nodes_per_entry: 3,
                    attribute_count: 0,
                },
            )
            .expect("block");
    }
    source
        .set_variable_count(EntityKind::ElementBlock, 2)
        .expect("count");
    source
        .set_truth_table(EntityKind::ElementBlock, &[true, false, false, true])
        .expect("table");
    source.append_time(0.0).expect("time");
    source
        .put_variable_values(EntityKind::ElementBlock, EntityId::new(1), 1, 1, &[5.0])
        .expect("value");

    let dest = copy_store(
        &source,
        MemoryBackend::new(),
        &CopyOptions {
            include_transient: true,
            ..Default::default()
        },
    )
    .expect("copy");
    assert_eq!(
        dest.get_truth_table(EntityKind::ElementBlock),
        vec![true, false, false, true]
    );
    let err = dest
        .get_variable_values(EntityKind::ElementBlock, EntityId::new(1), 2, 1)
        .unwrap_err();
    assert!(matches!(err, MeshExchangeError::UndefinedCell { .. }));
    assert_eq!(
        dest.get_variable_values(EntityKind::ElementBlock, EntityId::new(1), 1, 1)
            .expect("copied"),
        vec![5.0]
    );
}
