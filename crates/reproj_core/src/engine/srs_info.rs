//! Reading a dataset's coordinate system out of `ogrinfo` / `gdalinfo` output.

use super::errors::{EngineError, EngineResult};
use crate::models::SpatialReference;

const LAYER_SRS_HEADER: &str = "Layer SRS WKT:";
const RASTER_SRS_HEADER: &str = "Coordinate System is:";

/// Markers the tools print in place of a missing definition.
const UNKNOWN_SRS: &[&str] = &["(unknown)", "`'", "''"];

/// Extract the first layer's coordinate system from `ogrinfo -so -al` output.
///
/// Returns `Ok(None)` when the layer reports `(unknown)` or the output has no
/// SRS block at all. Multi-layer datasets report their first layer.
pub fn parse_layer_srs(output: &str) -> EngineResult<Option<SpatialReference>> {
    parse_srs_block(output, LAYER_SRS_HEADER, "ogrinfo layer SRS")
}

/// Extract a raster's coordinate system from `gdalinfo` output.
///
/// Current GDAL omits the block entirely for rasters without one; older
/// builds print an empty quoted string.
pub fn parse_raster_srs(output: &str) -> EngineResult<Option<SpatialReference>> {
    parse_srs_block(output, RASTER_SRS_HEADER, "gdalinfo coordinate system")
}

fn parse_srs_block(
    output: &str,
    header_text: &str,
    what: &str,
) -> EngineResult<Option<SpatialReference>> {
    let mut lines = output
        .lines()
        .skip_while(|line| !line.trim_start().starts_with(header_text));

    let header = match lines.next() {
        Some(line) => line,
        None => return Ok(None),
    };

    // Older GDAL builds print the WKT on the header line itself.
    let inline = header.trim_start()[header_text.len()..].trim();
    let mut body = lines.skip_while(|line| line.trim().is_empty());
    let first = if inline.is_empty() {
        match body.next() {
            Some(line) => line.trim(),
            None => return Ok(None),
        }
    } else {
        inline
    };

    if UNKNOWN_SRS.contains(&first) {
        return Ok(None);
    }

    let mut wkt = String::new();
    let mut depth = 0usize;
    let mut opened = false;
    let mut in_quote = false;

    for line in std::iter::once(first).chain(body) {
        if !wkt.is_empty() {
            wkt.push('\n');
        }
        wkt.push_str(line);

        for c in line.chars() {
            match c {
                '"' => in_quote = !in_quote,
                '[' | '(' if !in_quote => {
                    depth += 1;
                    opened = true;
                }
                ']' | ')' if !in_quote => depth = depth.saturating_sub(1),
                _ => {}
            }
        }

        if !opened {
            return Err(EngineError::parse(
                what,
                format!("expected WKT after '{}', found '{}'", header_text, line.trim()),
            ));
        }
        if depth == 0 {
            return SpatialReference::from_engine_wkt(&wkt)
                .map(Some)
                .map_err(|e| EngineError::parse(what, e.to_string()));
        }
    }

    Err(EngineError::parse(
        what,
        "WKT block ended before its brackets closed",
    ))
}
