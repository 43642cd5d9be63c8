use {
    crate::error::Error,
    ldseal_protocol::{Password, PasswordError},
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// Metadata field holding the document master password.
///
/// It seals presenter notes and the embedded password manifest and is never
/// written to the output.
pub const MASTER_PASSWORD_META: &str = "master-password";

/// Document tree as produced by the markup parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Node {
    /// Plain text, escaped on output.
    Text { text: String },
    /// HTML fragment already rendered by the converter, written as is.
    Html { html: String },
    Element {
        tag: String,
        #[serde(default)]
        classes: Vec<String>,
        #[serde(default)]
        children: Vec<Node>,
    },
    Exercise {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        line: Option<u32>,
        #[serde(default)]
        children: Vec<Node>,
    },
    Solution {
        #[serde(default)]
        password: Option<Password>,
        #[serde(default)]
        line: Option<u32>,
        #[serde(default)]
        children: Vec<Node>,
    },
    PresenterNote {
        #[serde(default)]
        line: Option<u32>,
        #[serde(default)]
        children: Vec<Node>,
    },
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_valid_class(class: &str) -> bool {
    !class.is_empty()
        && class
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Node {
    #[must_use]
    #[inline]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Text { .. } | Self::Html { .. } => &[],
            Self::Element { children, .. }
            | Self::Exercise { children, .. }
            | Self::Solution { children, .. }
            | Self::PresenterNote { children, .. } => children,
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if let Self::Element { tag, classes, .. } = self {
            if !is_valid_name(tag) {
                return Err(Error::Configuration(format!("invalid element tag `{tag}`")));
            }
            if let Some(class) = classes.iter().find(|class| !is_valid_class(class)) {
                return Err(Error::Configuration(format!(
                    "invalid class `{class}` on element `{tag}`"
                )));
            }
        }
        self.children().iter().try_for_each(Node::validate)
    }
}

impl Document {
    /// Master password from the document metadata, if any.
    #[inline]
    pub fn master_password(&self) -> Result<Option<Password>, PasswordError> {
        self.meta
            .get(MASTER_PASSWORD_META)
            .map(|value| value.parse())
            .transpose()
    }

    /// Checks values that are written into the output without escaping.
    ///
    /// Runs before anything is rendered.
    #[inline]
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(name) = self.meta.keys().find(|name| !is_valid_name(name)) {
            return Err(Error::Configuration(format!("invalid meta name `{name}`")));
        }
        if let Some(language) = &self.language {
            if !is_valid_name(language) {
                return Err(Error::Configuration(format!(
                    "invalid language `{language}`"
                )));
            }
        }
        self.body.iter().try_for_each(Node::validate)
    }
}
