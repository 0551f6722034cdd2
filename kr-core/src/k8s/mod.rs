mod identity;

pub use identity::Identity;
use kube::Resource;

pub const LAST_APPLIED_CONFIG_ANNOTATION_KEY: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// Remove server- and client-managed bookkeeping from an object body; none of it says anything
/// about the object's lifecycle, and managed fields in particular dwarf the rest of the object.
pub fn sanitize_obj<K: Resource>(obj: &mut K) {
    let meta = obj.meta_mut();
    meta.managed_fields = None;

    if let Some(annotations) = meta.annotations.as_mut() {
        annotations.remove(LAST_APPLIED_CONFIG_ANNOTATION_KEY);
        if annotations.is_empty() {
            meta.annotations = None;
        }
    }
}

#[cfg(test)]
mod tests;
