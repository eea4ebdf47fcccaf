//! # Launch Parser
//!
//! Extracts the `<arg>` declarations from a launch description. Only direct children of
//! the document root are considered; `arg`s nested in `group`s or `include`s belong to
//! other scopes and are skipped.
use crate::{constants::ARG_TAG, models::ArgumentDeclaration};
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Could not read launch file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed launch description: {0}")]
    Malformed(String),
    #[error("An <arg> declaration (#{position}) has no 'name' attribute.")]
    MissingName { position: usize },
}

impl From<quick_xml::Error> for ParseError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::Malformed(e.to_string())
    }
}

/// Reads and parses the launch description at `path`.
pub fn parse_launch_file(path: &Path) -> Result<Vec<ArgumentDeclaration>, ParseError> {
    log::debug!("Parsing launch file: {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_launch_str(&content)
}

/// Parses a launch description held in memory.
///
/// Declarations are returned in document order, duplicates included.
pub fn parse_launch_str(content: &str) -> Result<Vec<ArgumentDeclaration>, ParseError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut declarations = Vec::new();
    let mut depth: usize = 0;
    let mut seen_root = false;
    let mut arg_count: usize = 0;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if depth == 0 {
                    seen_root = true;
                } else if depth == 1 && e.name().as_ref() == ARG_TAG.as_bytes() {
                    arg_count += 1;
                    declarations.push(declaration_from(&e, arg_count)?);
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 0 {
                    seen_root = true;
                } else if depth == 1 && e.name().as_ref() == ARG_TAG.as_bytes() {
                    arg_count += 1;
                    declarations.push(declaration_from(&e, arg_count)?);
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(ParseError::Malformed(
            "the document has no root element".to_string(),
        ));
    }
    if depth != 0 {
        return Err(ParseError::Malformed(
            "unexpected end of document inside an open element".to_string(),
        ));
    }

    log::debug!("Found {} argument declaration(s).", declarations.len());
    Ok(declarations)
}

fn declaration_from(
    element: &BytesStart<'_>,
    position: usize,
) -> Result<ArgumentDeclaration, ParseError> {
    let mut attributes = IndexMap::new();
    for attr in element.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.insert(key, value);
    }

    ArgumentDeclaration::from_attributes(attributes).ok_or(ParseError::MissingName { position })
}
