use std::collections::BTreeMap;

use log::debug;

use crate::alert::resource::Resource;

/// The outcome of resolving a `slack://tag/<name>` destination against a set of resources.
#[derive(Debug, PartialEq)]
pub enum TagResolution<'a> {
    /// Each channel named by the tag, along with the resources that named it.
    Found(BTreeMap<String, Vec<&'a Resource>>),
    NotFound,
}

/// Resolves the channels named by the tag `tag_name` on each resource.
///
/// A resource with duplicate tags contributes the value of the last one, and blank values are
/// ignored.
pub fn resolve_tag_channels<'a>(tag_name: &str, resources: &'a [Resource]) -> TagResolution<'a> {
    let mut channels = BTreeMap::<String, Vec<&'a Resource>>::new();
    for resource in resources {
        let channel = resource.tag_value(tag_name).map(str::trim).unwrap_or("");
        if !channel.is_empty() {
            channels.entry(channel.to_string()).or_default().push(resource);
        }
    }
    if channels.is_empty() {
        debug!("No {} tag found in resource.", tag_name);
        TagResolution::NotFound
    } else {
        debug!("Generating message for specified Slack channel.");
        TagResolution::Found(channels)
    }
}

#[cfg(test)]
mod tests {
    use log::Level;

    use crate::{
        alert::resource::ResourceTag,
        slack::test_support::{assert_logged, capture_logs, count_logged},
    };

    use super::*;

    fn tagged(tags: &[(&str, &str)]) -> Resource {
        let mut resource = Resource::default();
        for (key, value) in tags {
            resource.push_tag(ResourceTag::new(key, value));
        }
        resource
    }

    #[test]
    fn not_found_when_no_resource_has_the_tag() {
        let resources = vec![tagged(&[("Owner", "venkman")]), Resource::default()];
        let resolution = resolve_tag_channels("SlackChannel", &resources);
        assert!(matches!(resolution, TagResolution::NotFound))
    }

    #[test]
    fn not_found_when_there_are_no_resources() {
        assert_eq!(resolve_tag_channels("SlackChannel", &[]), TagResolution::NotFound)
    }

    #[test]
    fn found_groups_resources_by_channel() {
        let resources = vec![
            tagged(&[("SlackChannel", "tag-channel")]),
            tagged(&[("Owner", "venkman")]),
            tagged(&[("SlackChannel", "tag-channel")]),
            tagged(&[("SlackChannel", "other-channel")]),
        ];
        let TagResolution::Found(channels) = resolve_tag_channels("SlackChannel", &resources)
        else {
            panic!("Tag should be found")
        };
        assert_eq!(
            channels.keys().collect::<Vec<_>>(),
            vec!["other-channel", "tag-channel"]
        );
        assert_eq!(channels["tag-channel"], vec![&resources[0], &resources[2]])
    }

    #[test]
    fn last_appended_duplicate_wins() {
        let resources = vec![tagged(&[
            ("SlackChannel", "stale-channel"),
            ("SlackChannel", "tag-channel"),
        ])];
        let TagResolution::Found(channels) = resolve_tag_channels("SlackChannel", &resources)
        else {
            panic!("Tag should be found")
        };
        assert_eq!(channels.keys().collect::<Vec<_>>(), vec!["tag-channel"])
    }

    #[test]
    fn not_found_is_logged_once() {
        capture_logs();
        resolve_tag_channels("SlackChannel", &[Resource::default(), Resource::default()]);
        assert_eq!(
            count_logged(Level::Debug, "No SlackChannel tag found in resource."),
            1
        );
        assert_eq!(
            count_logged(Level::Debug, "Generating message for specified Slack channel."),
            0
        );
    }

    #[test]
    fn found_is_logged() {
        capture_logs();
        let resources = vec![tagged(&[("SlackChannel", "tag-channel")])];
        resolve_tag_channels("SlackChannel", &resources);
        assert_logged(Level::Debug, "Generating message for specified Slack channel.");
        assert_eq!(
            count_logged(Level::Debug, "No SlackChannel tag found in resource."),
            0
        );
    }

    #[test]
    fn blank_tag_values_are_ignored() {
        let resources = vec![tagged(&[("SlackChannel", "  ")])];
        assert_eq!(resolve_tag_channels("SlackChannel", &resources), TagResolution::NotFound)
    }
}
