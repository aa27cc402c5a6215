// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Convert XML documentation comment files to Markdown.
//!
//! This crate provides loading and rendering functionality for transforming
//! the XML documentation files produced by compilers of managed libraries
//! into readable Markdown documents.
//!
//! # Overview
//!
//! A documentation file lists every documented member of one assembly. This
//! crate:
//!
//! 1. Loads the XML into a small owned tree
//! 2. Renders the tree as Markdown, grouping members into fields, methods,
//!    and events
//!
//! # Example
//!
//! ```no_run
//! let xml = std::fs::read_to_string("Lib.xml").unwrap();
//! let markdown = xmldoc2md::convert(&xml).unwrap();
//! println!("{markdown}");
//! ```
//!
//! # Modules
//!
//! - [`parser`]: XML loading and the tree types
//! - [`renderer`]: Markdown generation over the loaded tree

#![deny(missing_docs)]

use snafu::prelude::*;

pub mod parser;
pub mod renderer;

/// Error type for a full XML-to-Markdown conversion.
#[derive(Debug, Snafu)]
pub enum ConvertError {
    /// The input could not be loaded as XML.
    #[snafu(display("{source}"))]
    Parse {
        /// The underlying loading error.
        source: parser::ParseError,
    },

    /// The loaded tree does not have the expected layout.
    #[snafu(display("{source}"))]
    Render {
        /// The underlying rendering error.
        source: renderer::RenderError,
    },
}

/// Loads `xml` and renders it as Markdown.
///
/// # Errors
///
/// Returns an error if the XML is malformed or lacks an element or
/// attribute the renderer requires. No partial output is returned.
pub fn convert(xml: &str) -> Result<String, ConvertError> {
    let root = parser::parse_document(xml).context(ParseSnafu)?;
    renderer::render_document(&root).context(RenderSnafu)
}
