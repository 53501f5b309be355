//! Configuration documents for creating jobs and nodes.
//!
//! Jobs are created from an XML `config.xml` document; [`JobConfig`] renders a
//! freestyle project with optional string parameters and a single shell step.
//! Nodes are created from a JSON form; [`NodeConfig`] renders a permanent agent
//! description.

use serde::Serialize;
use serde_json::{json, Value};

/// A string parameter of a parameterized job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobParameter {
    /// Parameter name, required.
    pub name: String,
    /// Help text shown in the build form.
    pub description: Option<String>,
    /// Default value.
    pub default: Option<String>,
}

impl JobParameter {
    /// Parameter with no description or default.
    pub fn new(name: impl Into<String>) -> Self {
        JobParameter {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Freestyle project template.
///
/// # Examples
///
/// ```
/// use jenkins_async::protocol::{JobConfig, JobParameter};
///
/// let xml = JobConfig::new()
///     .with_description("nightly")
///     .with_parameter(JobParameter::new("arg").with_default("1"))
///     .with_command("echo $arg")
///     .to_xml();
///
/// assert!(xml.contains("<name>arg</name>"));
/// assert!(xml.contains("<command>echo $arg</command>"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobConfig {
    /// Job description.
    pub description: Option<String>,
    /// String parameters.
    pub parameters: Vec<JobParameter>,
    /// Shell commands, joined into one shell step.
    pub commands: Vec<String>,
}

impl JobConfig {
    /// Empty project: no description, parameters or commands.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a string parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: JobParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Add a shell command line.
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    /// Render the `config.xml` document.
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version='1.1' encoding='UTF-8'?>\n<project>\n");
        xml.push_str("  <actions/>\n");
        push_element(&mut xml, 1, "description", self.description.as_deref());
        xml.push_str("  <keepDependencies>false</keepDependencies>\n");

        if self.parameters.is_empty() {
            xml.push_str("  <properties/>\n");
        } else {
            xml.push_str("  <properties>\n");
            xml.push_str("    <hudson.model.ParametersDefinitionProperty>\n");
            xml.push_str("      <parameterDefinitions>\n");
            for parameter in &self.parameters {
                xml.push_str("        <hudson.model.StringParameterDefinition>\n");
                push_element(&mut xml, 5, "name", Some(&parameter.name));
                push_element(&mut xml, 5, "description", parameter.description.as_deref());
                push_element(&mut xml, 5, "defaultValue", parameter.default.as_deref());
                xml.push_str("        </hudson.model.StringParameterDefinition>\n");
            }
            xml.push_str("      </parameterDefinitions>\n");
            xml.push_str("    </hudson.model.ParametersDefinitionProperty>\n");
            xml.push_str("  </properties>\n");
        }

        xml.push_str("  <scm class=\"hudson.scm.NullSCM\"/>\n");
        xml.push_str("  <canRoam>true</canRoam>\n");
        xml.push_str("  <disabled>false</disabled>\n");
        xml.push_str("  <blockBuildWhenDownstreamBuilding>false</blockBuildWhenDownstreamBuilding>\n");
        xml.push_str("  <blockBuildWhenUpstreamBuilding>false</blockBuildWhenUpstreamBuilding>\n");
        xml.push_str("  <triggers/>\n");
        xml.push_str("  <concurrentBuild>false</concurrentBuild>\n");
        xml.push_str("  <builders>\n    <hudson.tasks.Shell>\n");
        let commands = self.commands.join("\n");
        push_element(&mut xml, 3, "command", Some(&commands));
        xml.push_str("    </hudson.tasks.Shell>\n  </builders>\n");
        xml.push_str("  <publishers/>\n");
        xml.push_str("  <buildWrappers/>\n");
        xml.push_str("</project>\n");
        xml
    }
}

fn push_element(xml: &mut String, depth: usize, tag: &str, text: Option<&str>) {
    let indent = "  ".repeat(depth);
    match text {
        Some(text) if !text.is_empty() => {
            xml.push_str(&format!("{}<{}>{}</{}>\n", indent, tag, escape_xml(text), tag));
        }
        _ => xml.push_str(&format!("{}<{}/>\n", indent, tag)),
    }
}

/// Escape text for use inside an XML element or attribute.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Agent launch mode as Jenkins names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeMode {
    /// Use this node as much as possible.
    #[serde(rename = "NORMAL")]
    Normal,
    /// Only build jobs with label expressions matching this node.
    #[serde(rename = "EXCLUSIVE")]
    Exclusive,
}

/// Permanent agent description submitted to `/computer/doCreateItem`.
///
/// # Examples
///
/// ```
/// use jenkins_async::protocol::NodeConfig;
///
/// let config = NodeConfig::new("agent-1").with_executors(4).with_labels("linux docker");
/// let json = config.to_json();
/// assert_eq!(json["name"], "agent-1");
/// assert_eq!(json["numExecutors"], 4);
/// assert_eq!(json["type"], "hudson.slaves.DumbSlave");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    /// Node name.
    pub name: String,
    /// Free-form description.
    pub node_description: String,
    /// Executor slots.
    pub num_executors: u32,
    /// Remote root directory on the agent.
    #[serde(rename = "remoteFS")]
    pub remote_fs: String,
    /// Space-separated labels.
    pub label_string: String,
    /// Scheduling mode.
    pub mode: NodeMode,
    /// Node implementation class.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Extra fields merged into the form (launcher, retention strategy, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl NodeConfig {
    /// Node implementation used when none is given.
    pub const DEFAULT_TYPE: &'static str = "hudson.slaves.DumbSlave";

    /// Inbound (JNLP) agent with two executors and an always-on retention strategy.
    pub fn new(name: impl Into<String>) -> Self {
        let mut extra = serde_json::Map::new();
        extra.insert(
            "retentionStrategy".into(),
            json!({ "stapler-class": "hudson.slaves.RetentionStrategy$Always" }),
        );
        extra.insert("nodeProperties".into(), json!({ "stapler-class-bag": "true" }));
        extra.insert(
            "launcher".into(),
            json!({ "stapler-class": "hudson.slaves.JNLPLauncher" }),
        );

        NodeConfig {
            name: name.into(),
            node_description: String::new(),
            num_executors: 2,
            remote_fs: "/tmp".into(),
            label_string: String::new(),
            mode: NodeMode::Normal,
            node_type: Self::DEFAULT_TYPE.into(),
            extra,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.node_description = description.into();
        self
    }

    /// Set the executor count.
    #[must_use]
    pub fn with_executors(mut self, executors: u32) -> Self {
        self.num_executors = executors;
        self
    }

    /// Set the remote root directory.
    #[must_use]
    pub fn with_remote_fs(mut self, remote_fs: impl Into<String>) -> Self {
        self.remote_fs = remote_fs.into();
        self
    }

    /// Set the labels.
    #[must_use]
    pub fn with_labels(mut self, labels: impl Into<String>) -> Self {
        self.label_string = labels.into();
        self
    }

    /// Set the scheduling mode.
    #[must_use]
    pub fn with_mode(mut self, mode: NodeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the node implementation class.
    #[must_use]
    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = node_type.into();
        self
    }

    /// Set or replace an extra form field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Form JSON as submitted to Jenkins.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
