//! Target and source spatial reference descriptors.
//!
//! The descriptor string is handed to the GIS engine verbatim. Parsing here
//! is structural only: it rejects strings the engine could never accept
//! (unbalanced brackets, unterminated names, unknown root nodes) so a bad
//! target fails when the job is configured instead of once per file.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Root WKT nodes accepted as a coordinate system definition.
const WKT_ROOTS: &[&str] = &[
    "PROJCS",
    "GEOGCS",
    "GEOCCS",
    "COMPD_CS",
    "VERT_CS",
    "VERTCS",
    "LOCAL_CS",
    "PROJCRS",
    "PROJECTEDCRS",
    "GEOGCRS",
    "GEOGRAPHICCRS",
    "GEODCRS",
    "GEODETICCRS",
    "BOUNDCRS",
    "COMPOUNDCRS",
    "VERTCRS",
    "ENGCRS",
];

/// Errors raised while reading a spatial reference descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpatialRefError {
    #[error("Spatial reference descriptor is empty")]
    Empty,

    #[error("Unknown coordinate system node '{0}'")]
    UnknownRoot(String),

    #[error("Expected '[' after '{keyword}'")]
    MissingOpenBracket { keyword: String },

    #[error("Unterminated quoted string starting at offset {0}")]
    UnterminatedQuote(usize),

    #[error("Unbalanced bracket at offset {0}")]
    UnbalancedBracket(usize),

    #[error("Unexpected content after definition at offset {0}")]
    TrailingContent(usize),

    #[error("Coordinate system '{0}' has no quoted name")]
    MissingName(String),

    #[error("Invalid authority code '{0}' (expected AUTHORITY:CODE)")]
    InvalidAuthority(String),
}

/// A validated coordinate system descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialReference {
    descriptor: String,
    name: String,
}

impl SpatialReference {
    /// Parse and validate a descriptor.
    pub fn parse(descriptor: &str) -> Result<Self, SpatialRefError> {
        let trimmed = descriptor.trim();
        if trimmed.is_empty() {
            return Err(SpatialRefError::Empty);
        }

        if !trimmed.contains(['[', '(']) {
            return parse_authority(trimmed);
        }

        parse_wkt(trimmed, RootCheck::Known)
    }

    /// Accept a WKT definition the engine reported for an existing dataset.
    ///
    /// The engine already understood it, so any node keyword is accepted as
    /// the root (`DERIVEDPROJCRS`, `TIMECRS`, ...). Brackets, quoting and the
    /// name are still checked.
    pub fn from_engine_wkt(wkt: &str) -> Result<Self, SpatialRefError> {
        let trimmed = wkt.trim();
        if trimmed.is_empty() {
            return Err(SpatialRefError::Empty);
        }
        parse_wkt(trimmed, RootCheck::Any)
    }

    /// The descriptor as supplied (trimmed), suitable for passing to the engine.
    pub fn as_str(&self) -> &str {
        &self.descriptor
    }

    /// Human-readable name (WKT name or `AUTHORITY:CODE`).
    pub fn name(&self) -> &str {
        &self.name
    }

}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl std::str::FromStr for SpatialReference {
    type Err = SpatialRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_authority(text: &str) -> Result<SpatialReference, SpatialRefError> {
    let invalid = || SpatialRefError::InvalidAuthority(text.to_string());

    let (authority, code) = text.split_once(':').ok_or_else(invalid)?;
    let authority = authority.trim();
    let code = code.trim();

    let authority_ok =
        !authority.is_empty() && authority.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    let code_ok = !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric());
    if !authority_ok || !code_ok {
        return Err(invalid());
    }

    let descriptor = format!("{}:{}", authority.to_ascii_uppercase(), code);
    Ok(SpatialReference {
        name: descriptor.clone(),
        descriptor,
    })
}

/// Which root node keywords a WKT string may start with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootCheck {
    /// One of [`WKT_ROOTS`].
    Known,
    /// Any keyword.
    Any,
}

fn parse_wkt(text: &str, roots: RootCheck) -> Result<SpatialReference, SpatialRefError> {
    let keyword_end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    let keyword = text[..keyword_end].to_ascii_uppercase();

    let accepted = match roots {
        RootCheck::Known => WKT_ROOTS.contains(&keyword.as_str()),
        RootCheck::Any => !keyword.is_empty(),
    };
    if !accepted {
        return Err(SpatialRefError::UnknownRoot(text[..keyword_end].to_string()));
    }

    let rest = &text[keyword_end..];
    let open_offset = keyword_end + (rest.len() - rest.trim_start().len());
    if !matches!(text[open_offset..].chars().next(), Some('[') | Some('(')) {
        return Err(SpatialRefError::MissingOpenBracket { keyword });
    }

    let close_offset = check_brackets(text, open_offset)?;
    if !text[close_offset + 1..].trim().is_empty() {
        return Err(SpatialRefError::TrailingContent(close_offset + 1));
    }

    let name = leading_quoted(&text[open_offset + 1..close_offset])
        .ok_or_else(|| SpatialRefError::MissingName(keyword.clone()))?;

    Ok(SpatialReference {
        descriptor: text.to_string(),
        name,
    })
}

/// Walk from the opening bracket at `open` to its matching close.
///
/// Returns the byte offset of the closing bracket. Names may be quoted with
/// `"` (OGC) or `'` (older ESRI strings). Doubled quotes inside a name are
/// WKT's escape and simply close and reopen the string.
fn check_brackets(text: &str, open: usize) -> Result<usize, SpatialRefError> {
    let mut stack: Vec<char> = Vec::new();
    let mut quote: Option<(char, usize)> = None;

    for (offset, c) in text.char_indices().skip_while(|(i, _)| *i < open) {
        if let Some((delimiter, _)) = quote {
            if c == delimiter {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some((c, offset)),
            '[' | '(' => stack.push(c),
            ']' | ')' => {
                let expected = if c == ']' { '[' } else { '(' };
                if stack.pop() != Some(expected) {
                    return Err(SpatialRefError::UnbalancedBracket(offset));
                }
                if stack.is_empty() {
                    return Ok(offset);
                }
            }
            _ => {}
        }
    }

    match quote {
        Some((_, start)) => Err(SpatialRefError::UnterminatedQuote(start)),
        None => Err(SpatialRefError::UnbalancedBracket(text.len())),
    }
}

/// Extract the first quoted string of a node body, if it leads the body.
fn leading_quoted(body: &str) -> Option<String> {
    let body = body.trim_start();
    let delimiter = body.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let inner = &body[1..];
    let end = inner.find(delimiter)?;
    Some(inner[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEB_MERCATOR: &str = "PROJCS['WGS_1984_Web_Mercator_Auxiliary_Sphere',GEOGCS['GCS_WGS_1984',DATUM['D_WGS_1984',SPHEROID['WGS_1984',6378137.0,298.257223563]],PRIMEM['Greenwich',0.0],UNIT['Degree',0.0174532925199433]],PROJECTION['Mercator_Auxiliary_Sphere'],PARAMETER['False_Easting',0.0],PARAMETER['False_Northing',0.0],PARAMETER['Central_Meridian',0.0],PARAMETER['Standard_Parallel_1',0.0],PARAMETER['Auxiliary_Sphere_Type',0.0],UNIT['Meter',1.0]]";

    fn web_mercator() -> String {
        WEB_MERCATOR.replace('\'', "\"")
    }

    #[test]
    fn parses_esri_projected_wkt() {
        let srs = SpatialReference::parse(&web_mercator()).unwrap();
        assert_eq!(srs.name(), "WGS_1984_Web_Mercator_Auxiliary_Sphere");
        assert_eq!(srs.as_str(), web_mercator());
    }

    #[test]
    fn accepts_single_quoted_names() {
        let srs = SpatialReference::parse(WEB_MERCATOR).unwrap();
        assert_eq!(srs.name(), "WGS_1984_Web_Mercator_Auxiliary_Sphere");
    }

    #[test]
    fn parses_multiline_wkt2() {
        let wkt = "GEOGCRS[\"WGS 84\",\n    DATUM[\"World Geodetic System 1984\",\n        ELLIPSOID[\"WGS 84\",6378137,298.257223563]],\n    ID[\"EPSG\",4326]]\n";
        let srs = SpatialReference::parse(wkt).unwrap();
        assert_eq!(srs.name(), "WGS 84");
    }

    #[test]
    fn parses_authority_codes() {
        let srs = SpatialReference::parse(" epsg:3857 ").unwrap();
        assert_eq!(srs.as_str(), "EPSG:3857");
        assert_eq!(srs.name(), "EPSG:3857");
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert_eq!(SpatialReference::parse("   "), Err(SpatialRefError::Empty));
        assert!(matches!(
            SpatialReference::parse("web mercator"),
            Err(SpatialRefError::InvalidAuthority(_))
        ));
        assert!(matches!(
            SpatialReference::parse("FOO[\"x\"]"),
            Err(SpatialRefError::UnknownRoot(_))
        ));
    }

    #[test]
    fn rejects_unbalanced_brackets() {
        let truncated = &web_mercator()[..60];
        assert!(SpatialReference::parse(truncated).is_err());
        assert!(matches!(
            SpatialReference::parse("GEOGCS[\"a\",DATUM[\"b\")]"),
            Err(SpatialRefError::UnbalancedBracket(_))
        ));
    }

    #[test]
    fn rejects_unterminated_name() {
        assert!(matches!(
            SpatialReference::parse("GEOGCS[\"WGS 84]"),
            Err(SpatialRefError::UnterminatedQuote(7))
        ));
    }

    #[test]
    fn engine_wkt_accepts_any_root() {
        let wkt = "DERIVEDPROJCRS[\"Rotated grid\",BASEPROJCRS[\"UTM 13N\"],ID[\"X\",1]]";
        assert!(matches!(
            SpatialReference::parse(wkt),
            Err(SpatialRefError::UnknownRoot(_))
        ));

        let srs = SpatialReference::from_engine_wkt(wkt).unwrap();
        assert_eq!(srs.name(), "Rotated grid");
        assert_eq!(srs.as_str(), wkt);

        assert!(matches!(
            SpatialReference::from_engine_wkt("DERIVEDPROJCRS[\"x\""),
            Err(SpatialRefError::UnbalancedBracket(_))
        ));
    }

    #[test]
    fn rejects_trailing_content_and_missing_name() {
        assert!(matches!(
            SpatialReference::parse("GEOGCS[\"a\"] extra"),
            Err(SpatialRefError::TrailingContent(_))
        ));
        assert!(matches!(
            SpatialReference::parse("GEOGCS[DATUM[\"b\"]]"),
            Err(SpatialRefError::MissingName(_))
        ));
    }
}
