use super::*;

#[rstest]
#[case::namespaced(Identity::namespaced("kube-system", "coredns-5d78c9869d-8sx2k"), "kube-system/coredns-5d78c9869d-8sx2k")]
#[case::empty_namespace(Identity::namespaced("", "node-7"), "node-7")]
#[case::cluster_scoped(Identity::cluster_scoped("node-7"), "node-7")]
fn test_identity_display(#[case] id: Identity, #[case] expected: &str) {
    assert_eq!(id.to_string(), expected);
}

#[rstest]
fn test_identity_from_obj() {
    let pod: corev1::Pod = serde_json::from_value(pod_body(TEST_NAMESPACE, TEST_POD, TEST_IMAGE)).unwrap();
    let node: corev1::Node = serde_json::from_value(node_body(TEST_NODE, "m5.large")).unwrap();

    assert_eq!(Identity::from_obj(&pod), Identity::namespaced(TEST_NAMESPACE, TEST_POD));
    assert_eq!(Identity::from_obj(&node), Identity::cluster_scoped(TEST_NODE));
}

#[rstest]
fn test_identity_is_empty() {
    assert!(Identity::default().is_empty());
    assert!(Identity::namespaced(TEST_NAMESPACE, "").is_empty());
    assert!(!Identity::cluster_scoped(TEST_NODE).is_empty());
}
