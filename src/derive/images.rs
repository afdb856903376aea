use crate::models::k8s::Pod;

/// Images of the pod's regular containers, in declaration order.
pub fn pod_images(pod: &Pod) -> Vec<String> {
    pod.spec.containers.iter().map(|c| c.image.clone()).collect()
}

/// Tag component of an image reference for the cluster-wide image summary.
///
/// Only a colon in the last path segment counts as a tag separator, so a
/// registry port (`registry:5000/app`) leaves the reference untouched, as
/// does a digest reference.
pub fn image_tag(image: &str) -> &str {
    let last_segment = image.rsplit('/').next().unwrap_or(image);
    if last_segment.contains('@') {
        return image;
    }
    match last_segment.split_once(':') {
        Some((_, tag)) if !tag.is_empty() => tag,
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::k8s::Container;

    #[test]
    fn test_image_tag() {
        assert_eq!(image_tag("myrepo.io/app:v1.2"), "v1.2");
        assert_eq!(image_tag("nginx:1.25"), "1.25");
        assert_eq!(image_tag("app"), "app");
        assert_eq!(image_tag("myrepo.io:5000/app"), "myrepo.io:5000/app");
        assert_eq!(image_tag("myrepo.io:5000/team/app:latest"), "latest");
        assert_eq!(image_tag("app:"), "app:");
        assert_eq!(image_tag(""), "");
    }

    #[test]
    fn test_digest_reference_unchanged() {
        let img = "ghcr.io/org/app@sha256:0123abcd";
        assert_eq!(image_tag(img), img);
    }

    #[test]
    fn test_pod_images_in_order() {
        let mut pod = Pod::default();
        for image in ["web:1", "sidecar:2"] {
            pod.spec.containers.push(Container {
                image: image.to_string(),
                ..Default::default()
            });
        }
        assert_eq!(pod_images(&pod), vec!["web:1", "sidecar:2"]);
    }
}
