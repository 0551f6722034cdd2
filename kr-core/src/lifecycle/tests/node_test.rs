use super::*;

fn node_of(snapshot: &Snapshot) -> &NodeSnapshot {
    match snapshot {
        Snapshot::Node(n) => n,
        Snapshot::Pod(_) => panic!("expected a node snapshot"),
    }
}

fn instance_type_of(snapshot: &NodeSnapshot) -> &str {
    snapshot.node.as_ref().unwrap().metadata.labels.as_ref().unwrap()["node.kubernetes.io/instance-type"].as_str()
}

#[rstest]
fn test_classify_node_create() {
    let record = node_create(TEST_NODE, "m5.large", 0).build();
    let event = NodeLifecycle.classify(&record).unwrap().unwrap();

    assert_eq!(event.kind, EventKind::Node(NodeEvent::Created));
    assert_eq!(event.identity, Identity::cluster_scoped(TEST_NODE));
    let Some(TrackedObject::Node(node)) = event.object else { panic!("expected a node body") };
    assert_none!(node.metadata.managed_fields);
}

#[rstest]
fn test_classify_node_create_identity_falls_back_to_ref() {
    let mut body = node_body(TEST_NODE, "m5.large");
    body["metadata"].as_object_mut().unwrap().remove("name");
    let record = node_create(TEST_NODE, "m5.large", 0).response(body).build();
    let event = NodeLifecycle.classify(&record).unwrap().unwrap();

    assert_eq!(event.identity, Identity::cluster_scoped(TEST_NODE));
}

#[rstest]
fn test_classify_node_delete() {
    let record = node_delete(TEST_NODE, 40).build();
    let event = NodeLifecycle.classify(&record).unwrap().unwrap();

    assert_eq!(event.kind, EventKind::Node(NodeEvent::Deleted));
    assert_eq!(event.identity, Identity::cluster_scoped(TEST_NODE));
    assert_none!(event.object);
}

#[rstest]
#[case::get("get")]
#[case::patch("patch")]
#[case::list("list")]
fn test_classify_node_other_verbs(#[case] verb: &str) {
    let record = RecordBuilder::new(verb, "nodes", "", TEST_NODE, 0).build();

    assert_none!(NodeLifecycle.classify(&record).unwrap());
}

#[rstest]
fn test_classify_node_update_without_body() {
    let record = RecordBuilder::new("update", "nodes", "", TEST_NODE, 0).build();

    assert!(matches!(NodeLifecycle.classify(&record), Err(ClassifyError::MissingField("responseObject"))));
}

#[rstest]
fn test_coalesce_node_lifecycle() {
    let events = classify_all(vec![
        node_create(TEST_NODE, "m5.large", 0),
        node_update(TEST_NODE, "m5.xlarge", 10),
        node_update(TEST_NODE, "m5.2xlarge", 20),
        node_delete(TEST_NODE, 90),
        node_create("node-8", "c5.large", 95),
    ]);

    let expected = NodeLifecycle.coalesce(&Identity::cluster_scoped(TEST_NODE), &events);
    for permutation in permutations(&events[..4]) {
        let mut shuffled = permutation;
        shuffled.push(events[4].clone());
        assert_eq!(NodeLifecycle.coalesce(&Identity::cluster_scoped(TEST_NODE), &shuffled), expected);
    }

    let node = node_of(&expected);
    assert_eq!(node.creation_time, Some(ts(0)));
    assert_eq!(node.last_updated_time, Some(ts(20)));
    assert_eq!(node.deletion_time, Some(ts(90)));
    assert_eq!(instance_type_of(node), "m5.2xlarge");
}

#[rstest]
fn test_coalesce_node_ignores_pod_events() {
    // A pod whose identity collides with the node's name must not leak into the node snapshot
    let events = classify_all(vec![node_create(TEST_NODE, "m5.large", 0), pod_delete("", TEST_NODE, 5)]);
    let snapshot = NodeLifecycle.coalesce(&Identity::cluster_scoped(TEST_NODE), &events);

    assert_none!(node_of(&snapshot).deletion_time);
}
