// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Markdown rendering for loaded documentation trees.
//!
//! This module walks an [`Element`] tree and emits Markdown. Every element is
//! classified into a [`Kind`], and each kind has one fixed output shape that
//! is filled with attribute values and the recursively rendered children.
//!
//! # Output Format
//!
//! The rendered Markdown includes:
//! - A `## <assembly> ##` heading
//! - `## Fields`, `## Methods` and `## Events` sections
//! - A `### <member name>` heading per member, followed by its documentation
//! - Inline `[text](cref)` links for cross-references
//!
//! Elements outside the recognized set render as nothing, together with
//! everything inside them.
//!
//! # Example
//!
//! ```
//! use xmldoc2md::parser::parse_document;
//! use xmldoc2md::renderer::render_document;
//!
//! let root = parse_document(
//!     r#"<doc><assembly><name>Lib</name></assembly><members>
//!     <member name="M:Lib.Foo"><summary>Does X</summary></member>
//!     </members></doc>"#,
//! )
//! .unwrap();
//!
//! let markdown = render_document(&root).unwrap();
//!
//! assert!(markdown.starts_with("## Lib ##"));
//! assert!(markdown.contains("### M:Lib.Foo\n\nDoes X"));
//! ```

use crate::parser::{Element, Node};
use regex::Regex;
use snafu::prelude::*;
use std::sync::LazyLock;

/// Indentation that code samples keep after dedenting.
const CODE_INDENT: usize = 4;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Error type for documents that do not match the expected layout.
#[derive(Debug, Snafu)]
pub enum RenderError {
    /// An element lacks an attribute its kind requires.
    #[snafu(display("<{element}> is missing required attribute `{attribute}`"))]
    MissingAttribute {
        /// Local name of the element.
        element: String,
        /// Name of the absent attribute.
        attribute: &'static str,
    },

    /// An element lacks a child element its kind requires.
    #[snafu(display("<{parent}> is missing required child <{child}>"))]
    MissingElement {
        /// Local name of the parent element.
        parent: String,
        /// Local name of the absent child.
        child: &'static str,
    },
}

/// The semantic category of an element, selecting how it is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// The document root holding the assembly and its members.
    Doc,
    /// A member whose name starts with `F`.
    Field,
    /// A member whose name starts with `M`.
    Method,
    /// A member whose name starts with `E`.
    Event,
    /// Short description of a member.
    Summary,
    /// Additional notes on a member.
    Remarks,
    /// A code sample.
    Example,
    /// An inline cross-reference.
    See,
    /// Description of a parameter.
    Param,
    /// Description of a thrown exception.
    Exception,
    /// Description of the return value.
    Returns,
    /// Anything unrecognized; renders as nothing.
    None,
}

impl Kind {
    /// Resolves the kind of an element.
    ///
    /// `member` elements are classified by the first character of their
    /// `name` attribute. Any other element is classified by its tag name.
    ///
    /// # Errors
    ///
    /// Returns an error if a `member` element has no `name` attribute.
    pub fn of(element: &Element) -> Result<Self, RenderError> {
        if element.name != "member" {
            return Ok(Self::from_tag(&element.name));
        }
        let name = required_attribute(element, "name")?;
        Ok(match name.chars().next() {
            Some('F') => Self::Field,
            Some('E') => Self::Event,
            Some('M') => Self::Method,
            _ => Self::None,
        })
    }

    fn from_tag(tag: &str) -> Self {
        match tag {
            "doc" => Self::Doc,
            "field" => Self::Field,
            "method" => Self::Method,
            "event" => Self::Event,
            "summary" => Self::Summary,
            "remarks" => Self::Remarks,
            "example" => Self::Example,
            "see" => Self::See,
            "param" => Self::Param,
            "exception" => Self::Exception,
            "returns" => Self::Returns,
            _ => Self::None,
        }
    }
}

/// Renders a documentation tree as Markdown.
///
/// This is the main entry point for rendering. The root is normally a `doc`
/// element, but any element is accepted and rendered according to its kind.
///
/// # Errors
///
/// Returns an error if a required attribute or child element is missing
/// anywhere in the rendered part of the tree.
pub fn render_document(root: &Element) -> Result<String, RenderError> {
    render_element(root)
}

/// Renders a single node.
///
/// Text is whitespace-collapsed; CDATA sections produce nothing here and only
/// reach the output through an `example` block.
///
/// # Errors
///
/// See [`render_document`].
pub fn render_node(node: &Node) -> Result<String, RenderError> {
    match node {
        Node::Element(el) => render_element(el),
        Node::Text(text) => Ok(collapse_whitespace(text)),
        Node::CData(_) => Ok(String::new()),
    }
}

/// Renders a sequence of sibling nodes and concatenates the results.
///
/// # Errors
///
/// See [`render_document`].
pub fn render_nodes(nodes: &[Node]) -> Result<String, RenderError> {
    let mut out = String::new();
    for node in nodes {
        out.push_str(&render_node(node)?);
    }
    Ok(out)
}

fn render_element(el: &Element) -> Result<String, RenderError> {
    let rendered = match Kind::of(el)? {
        Kind::Doc => render_doc(el)?,
        Kind::Field | Kind::Method | Kind::Event => {
            let name = required_attribute(el, "name")?;
            format!("### {name}\n\n{}\n\n", render_nodes(&el.children)?)
        }
        Kind::Summary => format!("{}\n\n", render_nodes(&el.children)?),
        Kind::Remarks => format!("**remarks**\n\n{}\n\n", render_nodes(&el.children)?),
        Kind::Example => format!("**example**\n\n{}\n\n", dedent(&el.value())),
        Kind::See => {
            let cref = required_attribute(el, "cref")?;
            format!("[{}]({cref})", render_nodes(&el.children)?)
        }
        // No trailing separator: consecutive params run together.
        Kind::Param => {
            let name = required_attribute(el, "name")?;
            format!("_{name}_: {}", render_nodes(&el.children)?)
        }
        Kind::Exception => {
            let cref = required_attribute(el, "cref")?;
            format!("_{cref}_: {}\n\n", render_nodes(&el.children)?)
        }
        Kind::Returns => format!("Returns: {}\n\n", render_nodes(&el.children)?),
        Kind::None => String::new(),
    };
    Ok(rendered)
}

fn render_doc(el: &Element) -> Result<String, RenderError> {
    let assembly = required_child(el, "assembly")?;
    let name = required_child(assembly, "name")?.value();
    let members: Vec<&Element> = required_child(el, "members")?
        .children_named("member")
        .collect();

    let fields = render_members(&members, "F:")?;
    let methods = render_members(&members, "M:")?;
    let events = render_members(&members, "E:")?;

    Ok(format!(
        "## {name} ##\n\n## Fields\n\n{fields}\n\n## Methods\n\n{methods}\n\n## Events\n\n{events}\n\n"
    ))
}

/// Renders, in document order, the members whose name starts with `prefix`.
fn render_members(members: &[&Element], prefix: &str) -> Result<String, RenderError> {
    let mut out = String::new();
    for member in members {
        if required_attribute(member, "name")?.starts_with(prefix) {
            out.push_str(&render_element(member)?);
        }
    }
    Ok(out)
}

fn required_attribute<'a>(
    el: &'a Element,
    attribute: &'static str,
) -> Result<&'a str, RenderError> {
    el.attribute(attribute).context(MissingAttributeSnafu {
        element: el.name.as_str(),
        attribute,
    })
}

fn required_child<'a>(el: &'a Element, child: &'static str) -> Result<&'a Element, RenderError> {
    el.child(child).context(MissingElementSnafu {
        parent: el.name.as_str(),
        child,
    })
}

/// Collapses every run of whitespace, newlines included, to a single space.
///
/// Leading and trailing whitespace is collapsed, not trimmed.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").into_owned()
}

/// Strips a uniform indentation from a multi-line code sample.
///
/// Empty lines are dropped. The amount to strip is the number of leading
/// spaces on the first line minus four, and that same number of characters
/// is removed from the front of every line. Lines shorter than the amount
/// become empty.
#[must_use]
pub fn dedent(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').filter(|line| !line.is_empty()).collect();
    let Some(first) = lines.first() else {
        return String::new();
    };
    let strip = first
        .chars()
        .take_while(|&c| c == ' ')
        .count()
        .saturating_sub(CODE_INDENT);

    lines
        .iter()
        .map(|line| line.chars().skip(strip).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    fn render_xml(xml: &str) -> Result<String, RenderError> {
        render_document(&parse_document(xml).unwrap())
    }

    fn doc_xml(members: &str) -> String {
        format!("<doc><assembly><name>Lib</name></assembly><members>{members}</members></doc>")
    }

    fn member(name: &str) -> Element {
        Element {
            name: "member".into(),
            attributes: vec![("name".into(), name.into())],
            children: Vec::new(),
        }
    }

    #[test]
    fn resolves_member_kind_from_name_prefix() {
        assert_eq!(Kind::of(&member("F:Lib.Bar")).unwrap(), Kind::Field);
        assert_eq!(Kind::of(&member("M:Lib.Foo")).unwrap(), Kind::Method);
        assert_eq!(Kind::of(&member("E:Lib.Changed")).unwrap(), Kind::Event);
        assert_eq!(Kind::of(&member("T:Lib")).unwrap(), Kind::None);
        assert_eq!(Kind::of(&member("P:Lib.Size")).unwrap(), Kind::None);
        assert_eq!(Kind::of(&member("")).unwrap(), Kind::None);
    }

    #[test]
    fn resolves_kind_from_tag_name() {
        assert_eq!(Kind::of(&Element::new("summary")).unwrap(), Kind::Summary);
        assert_eq!(Kind::of(&Element::new("returns")).unwrap(), Kind::Returns);
        assert_eq!(Kind::of(&Element::new("para")).unwrap(), Kind::None);
        assert_eq!(Kind::of(&Element::new("Summary")).unwrap(), Kind::None);
    }

    #[test]
    fn member_without_name_is_an_error() {
        let err = Kind::of(&Element::new("member")).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingAttribute { ref element, attribute: "name" } if element == "member"
        ));
    }

    #[test]
    fn renders_method_scenario() {
        let output = render_xml(&doc_xml(
            r#"<member name="M:Lib.Foo"><summary>Does X</summary></member>"#,
        ))
        .unwrap();

        assert_eq!(
            output,
            "## Lib ##\n\n## Fields\n\n\n\n## Methods\n\n### M:Lib.Foo\n\nDoes X\n\n\n\n\n\n## Events\n\n\n\n"
        );
    }

    #[test]
    fn renders_member_with_empty_body() {
        let output = render_xml(&doc_xml(r#"<member name="F:Lib.Bar"><para>x</para></member>"#))
            .unwrap();

        assert!(output.contains("## Fields\n\n### F:Lib.Bar\n\n\n\n"));
    }

    #[test]
    fn groups_members_by_kind_in_document_order() {
        let output = render_xml(&doc_xml(
            r#"<member name="M:Lib.B"/>
               <member name="F:Lib.X"/>
               <member name="E:Lib.Changed"/>
               <member name="M:Lib.A"/>
               <member name="T:Lib"/>
               <member name="F:Lib.Y"/>"#,
        ))
        .unwrap();

        let pos = |needle: &str| output.find(needle).unwrap();
        assert!(pos("## Fields") < pos("### F:Lib.X"));
        assert!(pos("### F:Lib.X") < pos("### F:Lib.Y"));
        assert!(pos("### F:Lib.Y") < pos("## Methods"));
        assert!(pos("### M:Lib.B") < pos("### M:Lib.A"));
        assert!(pos("### M:Lib.A") < pos("## Events"));
        assert!(pos("## Events") < pos("### E:Lib.Changed"));
        assert!(!output.contains("T:Lib"));
        assert_eq!(output.matches("### ").count(), 5);
    }

    #[test]
    fn grouping_requires_kind_separator() {
        // "Foo" starts with F but not "F:", so it is dispatched as a field
        // yet belongs to no group of the document.
        let output = render_xml(&doc_xml(r#"<member name="Foo"/>"#)).unwrap();
        assert!(!output.contains("Foo"));
    }

    #[test]
    fn renders_see_as_inline_link() {
        let output = render_xml(r#"<see cref="T:Lib.Baz">Baz</see>"#).unwrap();
        assert_eq!(output, "[Baz](T:Lib.Baz)");
    }

    #[test]
    fn renders_empty_see_with_empty_text() {
        let output = render_xml(r#"<see cref="T:Lib.Baz"/>"#).unwrap();
        assert_eq!(output, "[](T:Lib.Baz)");
    }

    #[test]
    fn renders_summary_with_inline_see() {
        let output = render_xml(
            "<summary>\n    Wraps a\n    <see cref=\"T:Lib.Baz\">Baz</see> value.\n</summary>",
        )
        .unwrap();
        assert_eq!(output, " Wraps a [Baz](T:Lib.Baz) value. \n\n");
    }

    #[test]
    fn renders_remarks_and_returns() {
        assert_eq!(
            render_xml("<remarks>Thread safe.</remarks>").unwrap(),
            "**remarks**\n\nThread safe.\n\n"
        );
        assert_eq!(
            render_xml("<returns>The count.</returns>").unwrap(),
            "Returns: The count.\n\n"
        );
    }

    #[test]
    fn renders_exception_with_trailing_blank_line() {
        let output =
            render_xml(r#"<exception cref="T:System.ArgumentNullException">If null.</exception>"#)
                .unwrap();
        assert_eq!(output, "_T:System.ArgumentNullException_: If null.\n\n");
    }

    #[test]
    fn consecutive_params_are_not_separated() {
        // Reproduces the original output: params carry no trailing separator.
        let output = render_xml(
            r#"<member name="M:Lib.Add(System.Int32,System.Int32)"><param name="a">First.</param><param name="b">Second.</param></member>"#,
        )
        .unwrap();
        assert_eq!(
            output,
            "### M:Lib.Add(System.Int32,System.Int32)\n\n_a_: First._b_: Second.\n\n"
        );
    }

    #[test]
    fn renders_example_dedented() {
        let xml = "<example>\n      var x = 1;\n        Run(x);\n    </example>";
        let output = render_xml(xml).unwrap();
        assert_eq!(output, "**example**\n\n    var x = 1;\n      Run(x);\n  \n\n");
    }

    #[test]
    fn renders_crlf_example_like_lf_example() {
        let lf = render_xml("<example>\n      a\n\n      b\n    </example>").unwrap();
        let crlf = render_xml("<example>\r\n      a\r\n\r\n      b\r\n    </example>").unwrap();
        assert_eq!(lf, "**example**\n\n    a\n    b\n  \n\n");
        assert_eq!(crlf, lf);
    }

    #[test]
    fn renders_crlf_cdata_example() {
        let xml = "<example><![CDATA[\r\n        x = 1;\r\n        y = 2;\r\n]]></example>";
        let output = render_xml(xml).unwrap();
        assert_eq!(output, "**example**\n\n    x = 1;\n    y = 2;\n\n");
    }

    #[test]
    fn example_includes_nested_and_cdata_text() {
        let xml = "<example><![CDATA[\n        if (a < b) {}\n]]></example>";
        let output = render_xml(xml).unwrap();
        assert_eq!(output, "**example**\n\n    if (a < b) {}\n\n");
    }

    #[test]
    fn unrecognized_elements_drop_their_content() {
        let output = render_xml("<summary>Use <c>Foo</c> or <paramref name=\"x\"/>.</summary>")
            .unwrap();
        assert_eq!(output, "Use  or .\n\n");
    }

    #[test]
    fn cdata_outside_example_renders_nothing() {
        let output = render_xml("<summary>a<![CDATA[hidden]]>b</summary>").unwrap();
        assert_eq!(output, "ab\n\n");
    }

    #[test]
    fn missing_assembly_is_an_error() {
        let err = render_xml("<doc><members/></doc>").unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingElement { ref parent, child: "assembly" } if parent == "doc"
        ));
    }

    #[test]
    fn missing_members_is_an_error() {
        let err = render_xml("<doc><assembly><name>Lib</name></assembly></doc>").unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingElement { child: "members", .. }
        ));
    }

    #[test]
    fn missing_cref_is_an_error() {
        let err = render_xml("<summary>See <see>x</see></summary>").unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingAttribute { attribute: "cref", .. }
        ));
    }

    #[test]
    fn unnamed_member_in_doc_is_an_error() {
        let err = render_xml(&doc_xml("<member><summary>x</summary></member>")).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingAttribute { attribute: "name", .. }
        ));
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(collapse_whitespace("a \n\t  b"), "a b");
        assert_eq!(collapse_whitespace("\n  lead and trail  \n"), " lead and trail ");
        assert_eq!(collapse_whitespace("a\r\nb"), "a b");
        assert_eq!(collapse_whitespace("unchanged"), "unchanged");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn dedent_strips_first_line_indent_minus_baseline() {
        let raw = "      first\n      second";
        assert_eq!(dedent(raw), "    first\n    second");
    }

    #[test]
    fn dedent_applies_same_amount_to_every_line() {
        // Later lines are not re-measured.
        let raw = "\n        a\n  b\n            c";
        assert_eq!(dedent(raw), "    a\n\n        c");
    }

    #[test]
    fn dedent_drops_empty_lines() {
        assert_eq!(dedent("\n\n    a\n\n    b\n"), "    a\n    b");
    }

    #[test]
    fn dedent_keeps_shallow_indentation() {
        assert_eq!(dedent("  a\n b"), "  a\n b");
        assert_eq!(dedent("code"), "code");
    }

    #[test]
    fn dedent_is_idempotent_at_baseline() {
        let raw = "    a\n      b\n    c";
        let once = dedent(raw);
        assert_eq!(once, raw);
        assert_eq!(dedent(&once), once);
    }

    #[test]
    fn dedent_counts_characters_not_bytes() {
        assert_eq!(dedent("      x\n  é€abc"), "    x\né€abc");
    }

    #[test]
    fn dedent_of_empty_text_is_empty() {
        assert_eq!(dedent(""), "");
        assert_eq!(dedent("\n\n"), "");
    }
}
