use serde::{Deserialize, Serialize};

use super::resource::Resource;

/// The Slack template used when an action does not name one.
pub const DEFAULT_SLACK_TEMPLATE: &str = "slack_default";

/// The notify action that produced an alert.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone, Default)]
pub struct AlertAction {
    #[serde(default)]
    to: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slack_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    violation_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action_desc: Option<String>,
}

impl AlertAction {
    pub fn to(&self) -> &[String] {
        &self.to
    }

    pub fn slack_template(&self) -> &str {
        self.slack_template
            .as_deref()
            .unwrap_or(DEFAULT_SLACK_TEMPLATE)
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn violation_desc(&self) -> Option<&str> {
        self.violation_desc.as_deref()
    }

    pub fn action_desc(&self) -> Option<&str> {
        self.action_desc.as_deref()
    }
}

/// An action declared on a policy.
///
/// Policies may list actions as bare names (`"delete"`) or as objects, and only the object form
/// can carry its own `to` list.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum PolicyAction {
    Named(String),
    Definition {
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        action_type: Option<String>,
        #[serde(default)]
        to: Vec<String>,
    },
}

impl PolicyAction {
    pub fn to(&self) -> &[String] {
        match self {
            Self::Named(_) => &[],
            Self::Definition { to, .. } => to,
        }
    }
}

/// The policy whose violation is being reported.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone, Default)]
pub struct AlertPolicy {
    name: String,
    #[serde(default)]
    resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    actions: Vec<PolicyAction>,
}

impl AlertPolicy {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resource type the policy runs against (eg. `ebs`).
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn actions(&self) -> &[PolicyAction] {
        &self.actions
    }
}

/// A policy-violation alert waiting to be delivered to Slack.
#[derive(Debug, PartialEq, Deserialize, Serialize, Clone, Default)]
pub struct AlertMessage {
    #[serde(default)]
    account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    region: Option<String>,
    #[serde(default)]
    action: AlertAction,
    #[serde(default)]
    policy: AlertPolicy,
    #[serde(default)]
    resources: Vec<Resource>,
}

impl AlertMessage {
    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn action(&self) -> &AlertAction {
        &self.action
    }

    pub fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Every raw destination named by this alert, the notify action's list first.
    pub fn raw_destinations(&self) -> impl Iterator<Item = &str> {
        self.action
            .to()
            .iter()
            .chain(self.policy.actions().iter().flat_map(|a| a.to().iter()))
            .map(|s| s.as_str())
    }
}

#[cfg(test)]
impl AlertMessage {
    /// An alert for an unattached EBS volume, delivered to `test-channel`.
    pub fn for_testing() -> Self {
        serde_json::from_value(serde_json::json!({
            "account": "core-services-dev",
            "account_id": "000000000000",
            "region": "us-east-1",
            "action": {
                "type": "notify",
                "to": ["test-channel"],
                "subject": "EBS - Unattached volume marked for deletion",
                "violation_desc": "Unattached EBS volumes are marked for deletion after 15 days."
            },
            "policy": {
                "name": "ebs-mark-unattached-deletion",
                "resource": "ebs",
                "actions": [
                    {"type": "mark-for-op", "op": "delete", "days": 15},
                    {"type": "notify", "to": ["test-channel"]}
                ]
            },
            "resources": [{
                "VolumeId": "vol-01a0e6ea6b89f0099",
                "Size": 8,
                "State": "available",
                "Tags": [{"Key": "Owner", "Value": "spengler@ghostbusters.example.com"}]
            }]
        }))
        .unwrap()
    }

    pub fn set_destinations(&mut self, destinations: &[&str]) {
        let to = destinations.iter().map(|d| d.to_string()).collect::<Vec<_>>();
        self.action.to = to.clone();
        for action in self.policy.actions.iter_mut() {
            if let PolicyAction::Definition { to: action_to, .. } = action {
                if !action_to.is_empty() {
                    *action_to = to.clone();
                }
            }
        }
    }

    pub fn resources_mut(&mut self) -> &mut Vec<Resource> {
        &mut self.resources
    }
}
