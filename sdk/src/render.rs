//! HTML output for a [`Document`].
//!
//! The body is rendered in one depth-first walk. Solutions and presenter notes
//! render their children into a buffer of their own; that buffer is sealed and
//! only the envelope is written to the parent output.

use {
    crate::{
        document::{Document, MASTER_PASSWORD_META, Node},
        error::Error,
        manifest::PasswordManifest,
        tracker::BlockTracker,
    },
    html_escape::{encode_double_quoted_attribute, encode_text},
    ldseal_protocol::{CipherEnvelope, MANIFEST_META_NAME},
    tracing::{debug, warn},
};

const FORMAT_VERSION: &str = "LD2 0.1";

enum LdAsset {
    Stylesheet(&'static str),
    Script(&'static str),
}

/// LectureDoc files linked from every page, relative to `ld_path`, in load order.
const LD_ASSETS: &[LdAsset] = &[
    LdAsset::Stylesheet("normalize.css"),
    LdAsset::Script("ld-animations.js"),
    LdAsset::Script("ld-help.js"),
    LdAsset::Script("ld-core.js"),
    LdAsset::Stylesheet("ld.css"),
    LdAsset::Stylesheet("themes/DHBW/theme.css"),
];

/// Meta names produced by the renderer itself.
const RESERVED_META: &[&str] = &[
    MASTER_PASSWORD_META,
    MANIFEST_META_NAME,
    "version",
    "viewport",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    /// Location of the LectureDoc scripts and stylesheets, relative to the page.
    pub ld_path: String,
    /// Used unless the document specifies its own language.
    pub language: String,
}

impl Default for RenderSettings {
    #[inline]
    fn default() -> Self {
        Self {
            ld_path: "ld".into(),
            language: "en".into(),
        }
    }
}

#[derive(Debug)]
pub struct RenderedDocument {
    pub html: String,
    pub manifest: PasswordManifest,
}

/// State of one rendering walk.
struct BodyRenderer {
    tracker: BlockTracker,
}

impl BodyRenderer {
    fn render_nodes(&mut self, nodes: &[Node], out: &mut String) -> Result<(), Error> {
        nodes.iter().try_for_each(|node| self.render_node(node, out))
    }

    fn render_node(&mut self, node: &Node, out: &mut String) -> Result<(), Error> {
        match node {
            Node::Text { text } => out.push_str(&encode_text(text)),
            Node::Html { html } => out.push_str(html),
            Node::Element {
                tag,
                classes,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                if !classes.is_empty() {
                    out.push_str(" class=\"");
                    out.push_str(&classes.join(" "));
                    out.push('"');
                }
                out.push('>');
                self.render_nodes(children, out)?;
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            Node::Exercise {
                title,
                line,
                children,
            } => {
                let label = self
                    .tracker
                    .enter_exercise(title.as_deref())
                    .map_err(|err| err.at_line(*line))?;
                out.push_str("<section class=\"ld-exercise\" data-exercise-label=\"");
                out.push_str(&encode_double_quoted_attribute(&label));
                out.push_str("\">");
                if let Some(title) = title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                    out.push_str("<p class=\"ld-exercise-title\">");
                    out.push_str(&encode_text(title));
                    out.push_str("</p>");
                }
                self.render_nodes(children, out)
                    .map_err(|err| err.at_line(*line))?;
                self.tracker
                    .exit_exercise()
                    .map_err(|err| err.at_line(*line))?;
                out.push_str("</section>");
            }
            Node::Solution {
                password,
                line,
                children,
            } => {
                self.tracker
                    .enter_solution(password.clone())
                    .map_err(|err| err.at_line(*line))?;
                let mut plaintext = String::new();
                self.render_nodes(children, &mut plaintext)
                    .map_err(|err| err.at_line(*line))?;
                let envelope = self
                    .tracker
                    .exit_solution(&plaintext)
                    .map_err(|err| err.at_line(*line))?;
                push_sealed(out, "div", "ld-exercise-solution", &envelope);
            }
            Node::PresenterNote { line, children } => {
                self.tracker
                    .enter_note()
                    .map_err(|err| err.at_line(*line))?;
                let mut plaintext = String::new();
                self.render_nodes(children, &mut plaintext)
                    .map_err(|err| err.at_line(*line))?;
                let envelope = self
                    .tracker
                    .exit_note(&plaintext)
                    .map_err(|err| err.at_line(*line))?;
                push_sealed(out, "aside", "ld-presenter-note", &envelope);
            }
        }
        Ok(())
    }
}

fn push_sealed(out: &mut String, tag: &str, class: &str, envelope: &CipherEnvelope) {
    out.push('<');
    out.push_str(tag);
    out.push_str(" class=\"");
    out.push_str(class);
    out.push_str(" ld-encrypted\">");
    out.push_str(&envelope.to_string());
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn push_meta(out: &mut String, name: &str, content: &str) {
    out.push_str("<meta name=\"");
    out.push_str(&encode_double_quoted_attribute(name));
    out.push_str("\" content=\"");
    out.push_str(&encode_double_quoted_attribute(content));
    out.push_str("\" />\n");
}

fn page(
    document: &Document,
    settings: &RenderSettings,
    body: &str,
    manifest: Option<&CipherEnvelope>,
) -> String {
    let language = document.language.as_deref().unwrap_or(&settings.language);
    let ld_path = encode_double_quoted_attribute(&settings.ld_path);

    let mut out = String::with_capacity(body.len().saturating_add(1024));
    out.push_str("<!DOCTYPE html>\n<html lang=\"");
    out.push_str(&encode_double_quoted_attribute(language));
    out.push_str("\">\n<head>\n<meta charset=\"utf-8\" />\n");
    push_meta(
        &mut out,
        "viewport",
        "width=device-width, initial-scale=1.0, user-scalable=no",
    );
    push_meta(&mut out, "version", FORMAT_VERSION);
    for (name, content) in &document.meta {
        if RESERVED_META.contains(&name.as_str()) {
            if name != MASTER_PASSWORD_META {
                warn!(%name, "ignoring reserved meta entry");
            }
            continue;
        }
        push_meta(&mut out, name, content);
    }
    if let Some(envelope) = manifest {
        push_meta(&mut out, MANIFEST_META_NAME, &envelope.to_string());
    }
    if let Some(title) = &document.title {
        out.push_str("<title>");
        out.push_str(&encode_text(title));
        out.push_str("</title>\n");
    }
    for asset in LD_ASSETS {
        match asset {
            LdAsset::Stylesheet(file) => {
                out.push_str("<link rel=\"stylesheet\" href=\"");
                out.push_str(&ld_path);
                out.push('/');
                out.push_str(file);
                out.push_str("\" type=\"text/css\" />\n");
            }
            LdAsset::Script(file) => {
                out.push_str("<script src=\"");
                out.push_str(&ld_path);
                out.push('/');
                out.push_str(file);
                out.push_str("\" type=\"text/javascript\"></script>\n");
            }
        }
    }
    out.push_str("</head>\n<body>\n<div class=\"ld-slide\" id=\"slide0\">\n");
    out.push_str(body);
    out.push_str("\n</div>\n</body>\n</html>\n");
    out
}

/// Renders the whole page and collects the passwords of all sealed solutions.
///
/// Nothing is returned if any block rule is violated, so callers never see a
/// partially sealed page.
#[inline]
pub fn render_document(
    document: &Document,
    settings: &RenderSettings,
) -> Result<RenderedDocument, Error> {
    document.validate()?;
    let mut renderer = BodyRenderer {
        tracker: BlockTracker::new(document.master_password()?),
    };
    let mut body = String::new();
    renderer.render_nodes(&document.body, &mut body)?;
    let manifest = renderer.tracker.finish()?;
    let embedded = manifest.embedded_envelope()?;
    if embedded.is_none() && !manifest.is_empty() {
        debug!("no master password, password manifest is not embedded");
    }
    Ok(RenderedDocument {
        html: page(document, settings, &body, embedded.as_ref()),
        manifest,
    })
}
