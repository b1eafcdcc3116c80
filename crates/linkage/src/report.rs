//! Standalone HTML cross-reference report.
//!
//! One column per reported dataset, one row per authority cluster, each
//! value coloured by the canonical category its type resolves to.

use quick_xml::escape::escape;

use crate::config::LinkageConfig;
use crate::model::{AuthorityCluster, LinkageResult, TypeAliasTable, TRAILING_KEY};

const SCRIPTS: &[&str] = &[
    "https://cdnjs.cloudflare.com/ajax/libs/jquery/3.0.0-beta1/jquery.min.js",
    "https://cdnjs.cloudflare.com/ajax/libs/floatthead/1.4.0/jquery.floatThead.min.js",
];

const STYLESHEET: &str = "https://govuk-elements.herokuapp.com/public/stylesheets/elements-page.css";

const STYLE: &str = "
        a { color: inherit; }
        table th, table td { font-size: 17px; }
        .city-corporation      { color: #d53880; }
        .council-area          { color: #f47738; }
        .district              { color: #006435; }
        .london-borough        { color: #912b88; }
        .metropolitan-district { color: #85994b; }
        .two-tier-county       { color: #B10E1E; }
        .unitary-authority     { color: #2b8cc4; }
        .other                 { color: #6F777B; }
      ";

const HEADER_STYLE: &str = "background: lightgrey;";

/// Class for a value whose record carries no type at all.
const UNTYPED_CLASS: &str = "unknown";

/// CSS class of a canonical category: lower-cased, first space → `-`,
/// `other` when blank or unresolved.
pub fn css_class(category: Option<&str>) -> String {
    let lowered = category.unwrap_or("").to_lowercase();
    if lowered.trim().is_empty() {
        return "other".into();
    }
    lowered.replacen(' ', "-", 1)
}

/// One rendered cell entry: text, CSS class, optional link target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CellValue {
    pub text: String,
    pub class: String,
    pub href: Option<String>,
}

/// Sorted, de-duplicated entries a cluster shows under one dataset.
pub fn cell_values(
    cluster: &AuthorityCluster<'_>,
    tag: &str,
    aliases: &TypeAliasTable,
    link_field: Option<&str>,
) -> Vec<CellValue> {
    let mut values: Vec<CellValue> = cluster
        .members_of(tag)
        .map(|r| {
            let mut text = r.id().to_string();
            if r.id() != r.name() {
                text.push_str(" | ");
                text.push_str(r.name());
            }
            let class = match r.local_type() {
                Some(t) => {
                    text.push_str(" | ");
                    text.push_str(t);
                    css_class(aliases.get(tag, t))
                }
                None => UNTYPED_CLASS.to_string(),
            };
            let href = link_field
                .and_then(|f| r.field(f))
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string);
            CellValue { text, class, href }
        })
        .collect();
    values.sort();
    values.dedup();
    values
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Minimal indenting markup writer; all text and attribute values escaped.
struct Markup {
    out: String,
    depth: usize,
}

impl Markup {
    fn new() -> Self {
        Self { out: String::from("<!DOCTYPE html>\n"), depth: 0 }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }

    fn start_tag(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.out.push('<');
        self.out.push_str(tag);
        for (k, v) in attrs {
            self.out.push(' ');
            self.out.push_str(k);
            self.out.push_str("=\"");
            self.out.push_str(&escape(*v));
            self.out.push('"');
        }
        self.out.push('>');
    }

    fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.indent();
        self.start_tag(tag, attrs);
        self.out.push('\n');
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    /// Element with text content (possibly empty) on one line.
    fn text(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) {
        self.indent();
        self.start_tag(tag, attrs);
        self.out.push_str(&escape(text));
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    /// `<outer><inner>text</inner></outer>` on one line.
    fn nested_text(&mut self, outer: &str, inner: &str, text: &str) {
        self.indent();
        self.start_tag(outer, &[]);
        self.start_tag(inner, &[]);
        self.out.push_str(&escape(text));
        for tag in [inner, outer] {
            self.out.push_str("</");
            self.out.push_str(tag);
            self.out.push('>');
        }
        self.out.push('\n');
    }

    /// Element without an end tag.
    fn void(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.indent();
        self.start_tag(tag, attrs);
        self.out.push('\n');
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Render the full report document.
pub fn render_html(config: &LinkageConfig, result: &LinkageResult<'_>) -> String {
    let columns: Vec<(String, Option<&str>)> = config
        .reported()
        .map(|d| (d.tag(), d.link_field.as_deref()))
        .collect();

    let mut m = Markup::new();
    m.open("html", &[]);

    m.open("head", &[]);
    m.void("meta", &[("http-equiv", "content-type"), ("content", "text/html; charset=utf-8")]);
    for &src in SCRIPTS {
        m.text("script", &[("src", src), ("type", "text/javascript")], "");
    }
    m.void("link", &[("href", STYLESHEET), ("rel", "stylesheet"), ("type", "text/css")]);
    m.text("style", &[("type", "text/css")], STYLE);
    m.close("head");

    m.open("body", &[]);
    m.open("table", &[]);

    m.open("thead", &[]);
    m.open("tr", &[]);
    m.text("th", &[("style", HEADER_STYLE)], "");
    for (tag, _) in &columns {
        m.text("th", &[("style", HEADER_STYLE)], tag);
    }
    m.close("tr");
    m.close("thead");

    m.open("tbody", &[]);
    write_vocabulary_row(&mut m, &columns, &result.aliases);
    for cluster in result.clusters.presentation_order(TRAILING_KEY) {
        write_cluster_row(&mut m, &columns, cluster, &result.aliases);
    }
    m.close("tbody");

    m.close("table");
    m.text(
        "script",
        &[("type", "text/javascript")],
        "$(\"table\").floatThead({position: \"fixed\"});",
    );
    m.close("body");
    m.close("html");
    m.finish()
}

/// First body row: each dataset's type labels, coloured by category.
fn write_vocabulary_row(m: &mut Markup, columns: &[(String, Option<&str>)], aliases: &TypeAliasTable) {
    m.open("tr", &[]);
    m.text("td", &[], "");
    for (tag, _) in columns {
        match aliases.dataset(tag) {
            Some(types) => {
                let mut labels: Vec<(&String, &String)> = types.iter().collect();
                labels.sort_by_key(|(label, _)| label.to_lowercase());
                m.open("td", &[]);
                m.open("ul", &[]);
                for (label, category) in labels {
                    let class = css_class(Some(category));
                    m.text("li", &[("class", class.as_str())], label);
                }
                m.close("ul");
                m.close("td");
            }
            None => m.text("td", &[], ""),
        }
    }
    m.close("tr");
}

fn write_cluster_row(
    m: &mut Markup,
    columns: &[(String, Option<&str>)],
    cluster: &AuthorityCluster<'_>,
    aliases: &TypeAliasTable,
) {
    m.open("tr", &[]);
    m.nested_text("td", "b", &cluster.canonical_key);
    for (tag, link_field) in columns {
        m.open("td", &[]);
        m.open("ul", &[]);
        for value in cell_values(cluster, tag, aliases, *link_field) {
            match value.href {
                Some(ref href) => {
                    m.open("li", &[("class", value.class.as_str())]);
                    m.text("a", &[("href", href.as_str()), ("rel", "external")], &value.text);
                    m.close("li");
                }
                None => m.text("li", &[("class", value.class.as_str())], &value.text),
            }
        }
        m.close("ul");
        m.close("td");
    }
    m.close("tr");
}
