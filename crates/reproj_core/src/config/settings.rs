//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::GdalTools;
use crate::logging::{LogConfig, LogLevel};
use crate::naming::{NamingPolicy, RASTER_NAME_LIMIT, RASTER_PREFIX, VECTOR_PREFIX};

/// WGS 1984 Web Mercator (auxiliary sphere), the default target.
pub const WEB_MERCATOR_AUX_SPHERE_WKT: &str = concat!(
    "PROJCS[\"WGS_1984_Web_Mercator_Auxiliary_Sphere\",",
    "GEOGCS[\"GCS_WGS_1984\",DATUM[\"D_WGS_1984\",SPHEROID[\"WGS_1984\",6378137.0,298.257223563]],",
    "PRIMEM[\"Greenwich\",0.0],UNIT[\"Degree\",0.0174532925199433]],",
    "PROJECTION[\"Mercator_Auxiliary_Sphere\"],",
    "PARAMETER[\"False_Easting\",0.0],PARAMETER[\"False_Northing\",0.0],",
    "PARAMETER[\"Central_Meridian\",0.0],PARAMETER[\"Standard_Parallel_1\",0.0],",
    "PARAMETER[\"Auxiliary_Sphere_Type\",0.0],UNIT[\"Meter\",1.0]]"
);

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Input, output and target projection.
    #[serde(default)]
    pub job: JobSettings,

    /// Output naming.
    #[serde(default)]
    pub naming: NamingSettings,

    /// GDAL tool locations and dataset extensions.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Sections of the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Job,
    Naming,
    Tools,
    Logging,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 4] = [
        ConfigSection::Job,
        ConfigSection::Naming,
        ConfigSection::Tools,
        ConfigSection::Logging,
    ];

    /// TOML table name.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Job => "job",
            ConfigSection::Naming => "naming",
            ConfigSection::Tools => "tools",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the table.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Job => "Input folder, output folder and target coordinate system",
            ConfigSection::Naming => "Output file naming (raster_name_limit = 0 keeps full names)",
            ConfigSection::Tools => "GDAL command-line tools and dataset extensions",
            ConfigSection::Logging => "Logging configuration",
        }
    }
}

/// Job parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSettings {
    /// Folder scanned for rasters and vectors.
    #[serde(default = "default_input_folder")]
    pub input_folder: String,

    /// Folder reprojected outputs are written to.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Target coordinate system (WKT or AUTHORITY:CODE).
    #[serde(default = "default_target_projection")]
    pub target_projection: String,
}

fn default_input_folder() -> String {
    "input".to_string()
}

fn default_output_folder() -> String {
    "reprojected".to_string()
}

fn default_target_projection() -> String {
    WEB_MERCATOR_AUX_SPHERE_WKT.to_string()
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            input_folder: default_input_folder(),
            output_folder: default_output_folder(),
            target_projection: default_target_projection(),
        }
    }
}

/// Output naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingSettings {
    /// Prefix for raster outputs.
    #[serde(default = "default_raster_prefix")]
    pub raster_prefix: String,

    /// Prefix for vector outputs.
    #[serde(default = "default_vector_prefix")]
    pub vector_prefix: String,

    /// Characters of the raster base name kept (0 keeps all).
    #[serde(default = "default_raster_name_limit")]
    pub raster_name_limit: usize,
}

fn default_raster_prefix() -> String {
    RASTER_PREFIX.to_string()
}

fn default_vector_prefix() -> String {
    VECTOR_PREFIX.to_string()
}

fn default_raster_name_limit() -> usize {
    RASTER_NAME_LIMIT
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            raster_prefix: default_raster_prefix(),
            vector_prefix: default_vector_prefix(),
            raster_name_limit: default_raster_name_limit(),
        }
    }
}

impl NamingSettings {
    /// Convert to a naming policy.
    pub fn to_policy(&self) -> NamingPolicy {
        NamingPolicy {
            raster_prefix: self.raster_prefix.clone(),
            vector_prefix: self.vector_prefix.clone(),
            raster_name_limit: (self.raster_name_limit > 0).then_some(self.raster_name_limit),
        }
    }
}

/// GDAL tool locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_gdalwarp")]
    pub gdalwarp: String,

    #[serde(default = "default_ogr2ogr")]
    pub ogr2ogr: String,

    #[serde(default = "default_ogrinfo")]
    pub ogrinfo: String,

    #[serde(default = "default_gdalinfo")]
    pub gdalinfo: String,

    /// Extensions listed as rasters.
    #[serde(default = "default_raster_extensions")]
    pub raster_extensions: Vec<String>,

    /// Extensions listed as vectors.
    #[serde(default = "default_vector_extensions")]
    pub vector_extensions: Vec<String>,
}

fn default_gdalwarp() -> String {
    GdalTools::default().gdalwarp
}

fn default_ogr2ogr() -> String {
    GdalTools::default().ogr2ogr
}

fn default_ogrinfo() -> String {
    GdalTools::default().ogrinfo
}

fn default_gdalinfo() -> String {
    GdalTools::default().gdalinfo
}

fn default_raster_extensions() -> Vec<String> {
    GdalTools::default().raster_extensions
}

fn default_vector_extensions() -> Vec<String> {
    GdalTools::default().vector_extensions
}

impl Default for ToolSettings {
    fn default() -> Self {
        let tools = GdalTools::default();
        Self {
            gdalwarp: tools.gdalwarp,
            ogr2ogr: tools.ogr2ogr,
            ogrinfo: tools.ogrinfo,
            gdalinfo: tools.gdalinfo,
            raster_extensions: tools.raster_extensions,
            vector_extensions: tools.vector_extensions,
        }
    }
}

impl ToolSettings {
    /// Convert to the engine's tool configuration.
    pub fn to_gdal_tools(&self) -> GdalTools {
        GdalTools {
            gdalwarp: self.gdalwarp.clone(),
            ogr2ogr: self.ogr2ogr.clone(),
            ogrinfo: self.ogrinfo.clone(),
            gdalinfo: self.gdalinfo.clone(),
            raster_extensions: self.raster_extensions.clone(),
            vector_extensions: self.vector_extensions.clone(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for run lines and diagnostics.
    #[serde(default)]
    pub level: LogLevel,

    /// Prefix run lines with `[HH:MM:SS]`.
    #[serde(default)]
    pub show_timestamps: bool,

    /// Folder for run log files (empty disables the log file).
    #[serde(default)]
    pub log_folder: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            show_timestamps: false,
            log_folder: String::new(),
        }
    }
}

impl LoggingSettings {
    /// Run logger configuration.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            show_timestamps: self.show_timestamps,
        }
    }

    /// Log folder, if file logging is enabled.
    pub fn log_dir(&self) -> Option<PathBuf> {
        let folder = self.log_folder.trim();
        (!folder.is_empty()).then(|| PathBuf::from(folder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SpatialReference;

    #[test]
    fn default_target_is_web_mercator() {
        let settings = Settings::default();
        let srs = SpatialReference::parse(&settings.job.target_projection).unwrap();
        assert_eq!(srs.name(), "WGS_1984_Web_Mercator_Auxiliary_Sphere");
    }

    #[test]
    fn naming_limit_zero_disables_truncation() {
        let mut naming = NamingSettings::default();
        assert_eq!(naming.to_policy(), NamingPolicy::default());

        naming.raster_name_limit = 0;
        assert_eq!(naming.to_policy().raster_name_limit, None);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings =
            toml::from_str("[job]\ninput_folder = \"/data/in\"\n[logging]\nlevel = \"debug\"\n")
                .unwrap();
        assert_eq!(settings.job.input_folder, "/data/in");
        assert_eq!(settings.job.output_folder, "reprojected");
        assert_eq!(settings.logging.level, LogLevel::Debug);
        assert_eq!(settings.tools, ToolSettings::default());
    }

    #[test]
    fn log_dir_empty_means_disabled() {
        let mut logging = LoggingSettings::default();
        assert!(logging.log_dir().is_none());
        logging.log_folder = "logs".to_string();
        assert_eq!(logging.log_dir(), Some(PathBuf::from("logs")));
    }
}
