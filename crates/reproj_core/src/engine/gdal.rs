//! GIS engine backed by the GDAL command-line utilities.
//!
//! Provides the batch's engine capabilities by running:
//! - `ogrinfo -so -al` / `gdalinfo` to read a dataset's coordinate system
//! - `gdalwarp -t_srs` to reproject rasters
//! - `ogr2ogr -t_srs` to reproject vectors
//!
//! A tool that runs and exits non-zero is an execution failure (its stderr
//! becomes the diagnostic). A tool that cannot be started is fatal.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use walkdir::WalkDir;

use super::errors::{EngineError, EngineResult};
use super::srs_info::{parse_layer_srs, parse_raster_srs};
use super::GisEngine;
use crate::models::{Dataset, DatasetKind, SpatialReference};

/// Tool locations and dataset extensions for [`GdalCliEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GdalTools {
    /// `gdalwarp` executable.
    pub gdalwarp: String,
    /// `ogr2ogr` executable.
    pub ogr2ogr: String,
    /// `ogrinfo` executable.
    pub ogrinfo: String,
    /// `gdalinfo` executable.
    pub gdalinfo: String,
    /// File extensions listed as rasters (case-insensitive, no dot).
    pub raster_extensions: Vec<String>,
    /// File extensions listed as vectors (case-insensitive, no dot).
    pub vector_extensions: Vec<String>,
}

/// Default raster extensions.
pub const DEFAULT_RASTER_EXTENSIONS: &[&str] = &[
    "tif", "tiff", "img", "jp2", "asc", "dem", "bil", "bip", "bsq", "png", "jpg", "jpeg", "vrt",
    "nc", "hdf",
];

/// Default vector extensions.
pub const DEFAULT_VECTOR_EXTENSIONS: &[&str] =
    &["shp", "geojson", "json", "gpkg", "kml", "gml", "tab", "mif"];

impl Default for GdalTools {
    fn default() -> Self {
        Self {
            gdalwarp: "gdalwarp".to_string(),
            ogr2ogr: "ogr2ogr".to_string(),
            ogrinfo: "ogrinfo".to_string(),
            gdalinfo: "gdalinfo".to_string(),
            raster_extensions: DEFAULT_RASTER_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            vector_extensions: DEFAULT_VECTOR_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl GdalTools {
    /// Extensions that identify datasets of `kind`.
    pub fn extensions_for(&self, kind: DatasetKind) -> &[String] {
        match kind {
            DatasetKind::Raster => &self.raster_extensions,
            DatasetKind::Vector => &self.vector_extensions,
        }
    }
}

/// Engine that shells out to the GDAL utilities.
#[derive(Debug, Clone, Default)]
pub struct GdalCliEngine {
    tools: GdalTools,
}

impl GdalCliEngine {
    /// Create an engine with the given tool configuration.
    pub fn new(tools: GdalTools) -> Self {
        Self { tools }
    }

    /// Tool configuration.
    pub fn tools(&self) -> &GdalTools {
        &self.tools
    }

    /// Run a tool and return its stdout.
    fn run_tool(&self, tool: &str, args: &[&OsStr]) -> EngineResult<String> {
        tracing::debug!(
            "Running: {} {}",
            tool,
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = Command::new(tool)
            .args(args)
            .output()
            .map_err(|e| EngineError::tool_unavailable(tool, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::execution(
                tool,
                output.status.code().unwrap_or(-1),
                stderr.trim(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl GisEngine for GdalCliEngine {
    fn name(&self) -> &str {
        "GDAL command-line tools"
    }

    fn list_datasets(&self, dir: &Path, kind: DatasetKind) -> EngineResult<Vec<Dataset>> {
        let extensions = self.tools.extensions_for(kind);
        let mut datasets = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                EngineError::io(format!("listing {}", dir.display()), e.into())
            })?;

            if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
                continue;
            }

            tracing::debug!(path = %entry.path().display(), %kind, "Discovered dataset");
            datasets.push(Dataset::new(entry.path(), kind));
        }

        Ok(datasets)
    }

    fn describe_spatial_reference(
        &self,
        dataset: &Dataset,
    ) -> EngineResult<Option<SpatialReference>> {
        let path = dataset.path.as_os_str();
        match dataset.kind {
            DatasetKind::Vector => {
                let args = [
                    OsStr::new("-ro"),
                    OsStr::new("-so"),
                    OsStr::new("-al"),
                    OsStr::new("-nomd"),
                    path,
                ];
                let stdout = self.run_tool(&self.tools.ogrinfo, &args)?;
                parse_layer_srs(&stdout)
            }
            DatasetKind::Raster => {
                let args = [
                    OsStr::new("-nomd"),
                    OsStr::new("-norat"),
                    OsStr::new("-noct"),
                    path,
                ];
                let stdout = self.run_tool(&self.tools.gdalinfo, &args)?;
                parse_raster_srs(&stdout)
            }
        }
    }

    fn reproject(
        &self,
        dataset: &Dataset,
        output: &Path,
        target: &SpatialReference,
    ) -> EngineResult<()> {
        let t_srs = OsStr::new(target.as_str());
        match dataset.kind {
            DatasetKind::Raster => {
                let args = [
                    OsStr::new("-t_srs"),
                    t_srs,
                    OsStr::new("-of"),
                    OsStr::new(raster_driver(output)),
                    dataset.path.as_os_str(),
                    output.as_os_str(),
                ];
                self.run_tool(&self.tools.gdalwarp, &args)?;
            }
            DatasetKind::Vector => {
                let args = [
                    OsStr::new("-t_srs"),
                    t_srs,
                    output.as_os_str(),
                    dataset.path.as_os_str(),
                ];
                self.run_tool(&self.tools.ogr2ogr, &args)?;
            }
        }

        tracing::info!(
            "Reprojected {} to {}",
            dataset.path.display(),
            output.display()
        );
        Ok(())
    }
}

/// Whether `path` has one of `extensions` (case-insensitive).
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
}

/// Output driver for a raster output path.
///
/// Truncated output names usually lose their extension (`proj_elevA.ti`),
/// so anything unrecognised is written as GeoTIFF.
fn raster_driver(output: &Path) -> &'static str {
    let ext = output
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("img") => "HFA",
        Some("vrt") => "VRT",
        Some("nc") => "netCDF",
        _ => "GTiff",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn lists_datasets_by_kind_non_recursively() {
        let dir = tempdir().unwrap();
        for name in ["b_dem.TIF", "a_scan.tif", "roads.shp", "roads.dbf", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep.tif"), b"x").unwrap();

        let engine = GdalCliEngine::default();
        let rasters = engine.list_datasets(dir.path(), DatasetKind::Raster).unwrap();
        let names: Vec<String> = rasters.iter().map(|d| d.file_name()).collect();
        assert_eq!(names, vec!["a_scan.tif", "b_dem.TIF"]);
        assert!(rasters.iter().all(|d| d.kind == DatasetKind::Raster));

        let vectors = engine.list_datasets(dir.path(), DatasetKind::Vector).unwrap();
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].file_name(), "roads.shp");
    }

    #[test]
    fn listing_missing_dir_is_io_error() {
        let engine = GdalCliEngine::default();
        let err = engine
            .list_datasets(Path::new("/nonexistent/reproj/input"), DatasetKind::Raster)
            .unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }

    #[test]
    fn raster_driver_follows_extension() {
        assert_eq!(raster_driver(Path::new("out/proj_elevA.ti")), "GTiff");
        assert_eq!(raster_driver(Path::new("out/proj_dem.tif")), "GTiff");
        assert_eq!(raster_driver(Path::new("out/proj_lc.img")), "HFA");
        assert_eq!(raster_driver(Path::new("out/proj_mosaic")), "GTiff");
    }

    #[test]
    fn missing_tool_is_fatal() {
        let tools = GdalTools {
            gdalwarp: "/nonexistent/bin/gdalwarp".to_string(),
            ..Default::default()
        };
        let engine = GdalCliEngine::new(tools);
        let target = SpatialReference::parse("EPSG:3857").unwrap();

        let err = engine
            .reproject(
                &Dataset::raster("/in/elevA.tif"),
                Path::new("/out/proj_elevA.ti"),
                &target,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::ToolUnavailable { .. }));
        assert!(!err.is_recoverable());
    }

    /// Write an executable shell script standing in for a GDAL tool.
    ///
    /// The script records its arguments (one per line) to `<name>.args`
    /// next to itself, then runs `body`.
    #[cfg(unix)]
    fn stub_tool(dir: &Path, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        let args_file = dir.join(format!("{}.args", name));
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\n{}\n",
            args_file.display(),
            body
        );
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    fn recorded_args(dir: &Path, name: &str) -> Vec<String> {
        fs::read_to_string(dir.join(format!("{}.args", name)))
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[cfg(unix)]
    #[test]
    fn gdalwarp_gets_target_driver_then_input_output() {
        let dir = tempdir().unwrap();
        let tools = GdalTools {
            gdalwarp: stub_tool(dir.path(), "gdalwarp", "exit 0"),
            ..Default::default()
        };
        let engine = GdalCliEngine::new(tools);
        let target = SpatialReference::parse("EPSG:3857").unwrap();

        engine
            .reproject(
                &Dataset::raster("/in/elevA.tif"),
                Path::new("/out/proj_elevA.ti"),
                &target,
            )
            .unwrap();

        assert_eq!(
            recorded_args(dir.path(), "gdalwarp"),
            vec!["-t_srs", "EPSG:3857", "-of", "GTiff", "/in/elevA.tif", "/out/proj_elevA.ti"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn ogr2ogr_gets_output_before_input() {
        let dir = tempdir().unwrap();
        let tools = GdalTools {
            ogr2ogr: stub_tool(dir.path(), "ogr2ogr", "exit 0"),
            ..Default::default()
        };
        let engine = GdalCliEngine::new(tools);
        let target = SpatialReference::parse("EPSG:4326").unwrap();

        engine
            .reproject(
                &Dataset::vector("/in/roads.shp"),
                Path::new("/out/projected_roads.shp"),
                &target,
            )
            .unwrap();

        assert_eq!(
            recorded_args(dir.path(), "ogr2ogr"),
            vec!["-t_srs", "EPSG:4326", "/out/projected_roads.shp", "/in/roads.shp"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_execution_error_with_stderr() {
        let dir = tempdir().unwrap();
        let tools = GdalTools {
            gdalwarp: stub_tool(
                dir.path(),
                "gdalwarp",
                "echo '  ERROR 1: Too many points failed to transform  ' >&2\nexit 1",
            ),
            ..Default::default()
        };
        let engine = GdalCliEngine::new(tools);
        let target = SpatialReference::parse("EPSG:3857").unwrap();

        let err = engine
            .reproject(
                &Dataset::raster("/in/dem.tif"),
                Path::new("/out/proj_dem.tif"),
                &target,
            )
            .unwrap_err();

        match &err {
            EngineError::Execution {
                exit_code, message, ..
            } => {
                assert_eq!(*exit_code, 1);
                assert_eq!(message, "ERROR 1: Too many points failed to transform");
            }
            other => panic!("expected execution error, got {:?}", other),
        }
        assert!(err.is_recoverable());
    }

    #[cfg(unix)]
    #[test]
    fn describe_reads_ogrinfo_stdout() {
        let dir = tempdir().unwrap();
        let body = "cat <<'EOF'\nLayer name: parcels\nLayer SRS WKT:\nGEOGCS[\"WGS 84\",\n    DATUM[\"WGS_1984\"]]\nFID Column = ogc_fid\nEOF";
        let tools = GdalTools {
            ogrinfo: stub_tool(dir.path(), "ogrinfo", body),
            ..Default::default()
        };
        let engine = GdalCliEngine::new(tools);

        let srs = engine
            .describe_spatial_reference(&Dataset::vector("/in/parcels.gpkg"))
            .unwrap()
            .unwrap();
        assert_eq!(srs.name(), "WGS 84");
        assert_eq!(
            recorded_args(dir.path(), "ogrinfo"),
            vec!["-ro", "-so", "-al", "-nomd", "/in/parcels.gpkg"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn describe_unknown_srs_is_undefined() {
        let dir = tempdir().unwrap();
        let body = "cat <<'EOF'\nLayer name: roadsB\nLayer SRS WKT:\n(unknown)\nEOF";
        let tools = GdalTools {
            ogrinfo: stub_tool(dir.path(), "ogrinfo", body),
            ..Default::default()
        };
        let engine = GdalCliEngine::new(tools);

        let srs = engine
            .describe_spatial_reference(&Dataset::vector("/in/roadsB.shp"))
            .unwrap();
        assert!(srs.is_none());
    }
}
