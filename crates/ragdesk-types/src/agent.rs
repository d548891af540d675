//! Assistant profile selected from the registered sources.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Flavor of assistant presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentProfile {
    #[default]
    Default,
    NodeJs,
    JavaScript,
}

impl AgentProfile {
    pub fn display_name(self) -> &'static str {
        match self {
            AgentProfile::Default => "AI Assistant",
            AgentProfile::NodeJs => "Node.js Assistant",
            AgentProfile::JavaScript => "JavaScript Assistant",
        }
    }

    /// Pick a profile from source labels, or `None` if nothing matches.
    ///
    /// Node keywords win over JavaScript keywords.
    pub fn detect<'a>(labels: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let text = labels
            .into_iter()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        if ["node", "npm", "express"].iter().any(|k| text.contains(k)) {
            Some(AgentProfile::NodeJs)
        } else if ["javascript", "react", "vue", "js"]
            .iter()
            .any(|k| text.contains(k))
        {
            Some(AgentProfile::JavaScript)
        } else {
            None
        }
    }
}

impl fmt::Display for AgentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_node() {
        let labels = ["Express routing guide.pdf", "notes.md"];
        assert_eq!(AgentProfile::detect(labels), Some(AgentProfile::NodeJs));
    }

    #[test]
    fn test_detect_javascript() {
        let labels = ["https://react.dev/learn"];
        assert_eq!(AgentProfile::detect(labels), Some(AgentProfile::JavaScript));
    }

    #[test]
    fn test_node_wins_over_javascript() {
        // "node.js" contains both "node" and "js".
        assert_eq!(AgentProfile::detect(["node.js handbook"]), Some(AgentProfile::NodeJs));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(AgentProfile::detect(["quarterly report.pdf"]), None);
        assert_eq!(AgentProfile::detect(std::iter::empty()), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(AgentProfile::default().to_string(), "AI Assistant");
        assert_eq!(AgentProfile::NodeJs.display_name(), "Node.js Assistant");
    }
}
