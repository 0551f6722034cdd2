use super::*;

fn pod_history() -> Vec<AuditEvent> {
    vec![
        pod_create(TEST_NAMESPACE, TEST_POD, TEST_IMAGE, 0),
        pod_binding(TEST_NAMESPACE, TEST_POD, TEST_NODE, 5),
        pod_delete(TEST_NAMESPACE, TEST_POD, 30),
    ]
    .into_iter()
    .map(RecordBuilder::build)
    .collect()
}

#[rstest]
fn test_replay_pod_in_any_order(test_dispatcher: Dispatcher) {
    let id = Identity::namespaced(TEST_NAMESPACE, TEST_POD);

    for records in permutations(&pod_history()) {
        let replayed = replay(&test_dispatcher, &PodLifecycle, &id, &records);

        assert_eq!(replayed.matched, 3);
        let Some(Snapshot::Pod(pod)) = replayed.snapshot else { panic!("expected a pod snapshot") };
        assert_eq!(pod.creation_time, Some(ts(0)));
        assert_eq!(pod.bind_time, Some(ts(5)));
        assert_eq!(pod.node_name.as_deref(), Some(TEST_NODE));
        assert_eq!(pod.deletion_time, Some(ts(30)));
        assert_some!(pod.pod);
    }
}

#[rstest]
fn test_replay_no_matching_events(test_dispatcher: Dispatcher) {
    let id = Identity::namespaced("elsewhere", TEST_POD);
    let replayed = replay(&test_dispatcher, &PodLifecycle, &id, &pod_history());

    assert_eq!(replayed.matched, 0);
    assert_none!(replayed.snapshot);
    assert_eq!(replayed.stats.events, 3);
}

#[rstest]
fn test_replay_only_bound_has_no_body(test_dispatcher: Dispatcher) {
    let id = Identity::namespaced(TEST_NAMESPACE, TEST_POD);
    let records = vec![pod_binding(TEST_NAMESPACE, TEST_POD, TEST_NODE, 5).build()];
    let replayed = replay(&test_dispatcher, &PodLifecycle, &id, &records);

    let snapshot = replayed.snapshot.unwrap();
    assert_eq!(snapshot.identity(), &id);
    assert_none!(snapshot.object());
}

#[rstest]
fn test_replay_node_ignores_same_named_pod(test_dispatcher: Dispatcher) {
    let id = Identity::cluster_scoped(TEST_NODE);
    let records = vec![
        node_create(TEST_NODE, "m5.large", 0).build(),
        pod_create(TEST_NAMESPACE, TEST_NODE, TEST_IMAGE, 1).build(),
    ];
    let replayed = replay(&test_dispatcher, &NodeLifecycle, &id, &records);

    assert_eq!(replayed.matched, 1);
    let object = replayed.snapshot.unwrap().object().unwrap();
    assert_eq!(object["kind"], "Node");
}
