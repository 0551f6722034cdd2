mod identity_test;

use k8s_openapi::api::core::v1 as corev1;
use rstest::*;

use super::*;
use crate::testutils::*;

#[rstest]
fn test_sanitize_obj() {
    let mut pod: corev1::Pod = serde_json::from_value(pod_body(TEST_NAMESPACE, TEST_POD, TEST_IMAGE)).unwrap();
    sanitize_obj(&mut pod);

    assert_eq!(pod.metadata.managed_fields, None);
    let annotations = pod.metadata.annotations.unwrap();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations["team"], "platform");
}

#[rstest]
fn test_sanitize_obj_drops_empty_annotations() {
    let mut body = pod_body(TEST_NAMESPACE, TEST_POD, TEST_IMAGE);
    body["metadata"]["annotations"].as_object_mut().unwrap().remove("team");
    let mut pod: corev1::Pod = serde_json::from_value(body).unwrap();
    sanitize_obj(&mut pod);

    assert_eq!(pod.metadata.annotations, None);
}
