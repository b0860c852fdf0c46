//! CLI argument schema and request payload construction.
//!
//! The payload carries only options changed from their defaults; the
//! serving container fills in the rest. Values are strings because the
//! container parses them on its side (booleans travel as `"True"`).

use clap::Parser;

use crate::providers::traits::RequestPayload;

const DEFAULT_DATAPATH: &str = "/content/datapath";
const DEFAULT_SAVEPATH: &str = "/content/savepath";
const DEFAULT_LOGPATH: &str = "/content/logpath";
const DEFAULT_TILE: u32 = 480;
const DEFAULT_BATCH: u32 = 1;

/// Provision the S2DR3 serving endpoint on Vertex AI and run one inference.
#[derive(Parser, Debug)]
#[command(name = "s2dr3")]
#[command(about = "Deploy the S2DR3 super-resolution model and submit an inference job")]
pub struct Cli {
    /// Input image or folder.
    #[arg(long, default_value = DEFAULT_DATAPATH)]
    pub datapath: String,

    /// Output image or folder.
    #[arg(long, default_value = DEFAULT_SAVEPATH)]
    pub savepath: String,

    /// Path for logging.
    #[arg(long, default_value = DEFAULT_LOGPATH)]
    pub logpath: String,

    /// Force reprocessing.
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Georeference to the ESRI basemap.
    #[arg(short = 'g', long)]
    pub coreg: bool,

    /// Print debugging messages.
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Run quiet.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Process a small simulation patch.
    #[arg(short = 's', long)]
    pub simulate: bool,

    /// Generate and publish a preview.
    #[arg(short = 'p', long = "make_preview")]
    pub make_preview: bool,

    /// Acquisition date.
    #[arg(long)]
    pub date: Option<String>,

    /// Acquisition date range.
    #[arg(long = "date_range", num_args = 2, value_names = ["FROM", "TO"])]
    pub date_range: Option<Vec<String>>,

    /// Direct path of the input S2L2A 10-band image.
    #[arg(long)]
    pub b10m10: Option<String>,

    /// Area of interest coordinates.
    #[arg(long, num_args = 1..)]
    pub aoi: Option<Vec<String>>,

    /// MGRS tile.
    #[arg(long)]
    pub mgrs: Option<String>,

    /// Country 2-digit ISO code.
    #[arg(long)]
    pub iso: Option<String>,

    /// Indices of the MGRS subsubtile [0..9 0..9].
    #[arg(long = "NM", num_args = 1..)]
    pub nm: Option<Vec<String>>,

    /// Indices of the MGRS subtile [0..2 0..2].
    #[arg(long = "UV", num_args = 1..)]
    pub uv: Option<Vec<String>>,

    /// Spectral bands to generate, in Sentinel-2 notation.
    #[arg(long = "bands_out", num_args = 1..)]
    pub bands_out: Option<Vec<String>>,

    /// Size of the processing tile.
    #[arg(long, default_value_t = DEFAULT_TILE)]
    pub tile: u32,

    /// Batch size (only b=1 is supported).
    #[arg(short = 'b', long, default_value_t = DEFAULT_BATCH)]
    pub batch: u32,

    /// Service-account key file.
    #[arg(long = "key-file", env = "S2DR3_KEY_FILE", default_value = "credentials.json")]
    pub key_file: String,

    /// Enable verbose logging.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the request payload, omitting options left at their defaults.
    #[must_use]
    pub fn payload(&self) -> RequestPayload {
        let mut payload = RequestPayload::new();

        if self.datapath != DEFAULT_DATAPATH {
            payload.insert("datapath".to_string(), self.datapath.clone());
        }
        if self.savepath != DEFAULT_SAVEPATH {
            payload.insert("savepath".to_string(), self.savepath.clone());
        }
        if self.logpath != DEFAULT_LOGPATH {
            payload.insert("logpath".to_string(), self.logpath.clone());
        }
        if self.force {
            payload.insert("force".to_string(), "True".to_string());
        }
        if self.coreg {
            payload.insert("coreg".to_string(), "True".to_string());
        }
        if self.debug {
            payload.insert("debug".to_string(), "True".to_string());
        }
        if self.quiet {
            payload.insert("quiet".to_string(), "True".to_string());
        }
        if self.simulate {
            payload.insert("simulate".to_string(), "True".to_string());
        }
        if self.make_preview {
            payload.insert("make_preview".to_string(), "True".to_string());
        }
        if let Some(date) = &self.date {
            payload.insert("date".to_string(), date.clone());
        }
        if let Some(range) = &self.date_range {
            payload.insert("date_range".to_string(), range.join(" "));
        }
        if let Some(path) = &self.b10m10 {
            payload.insert("b10m10".to_string(), path.clone());
        }
        if let Some(aoi) = &self.aoi {
            payload.insert("aoi".to_string(), join_spaced(aoi));
        }
        if let Some(mgrs) = &self.mgrs {
            payload.insert("mgrs".to_string(), mgrs.clone());
        }
        if let Some(iso) = &self.iso {
            payload.insert("iso".to_string(), iso.clone());
        }
        if let Some(nm) = &self.nm {
            payload.insert("NM".to_string(), join_spaced(nm));
        }
        if let Some(uv) = &self.uv {
            payload.insert("UV".to_string(), join_spaced(uv));
        }
        if let Some(bands) = &self.bands_out {
            payload.insert("bands_out".to_string(), join_spaced(bands));
        }
        if self.tile != DEFAULT_TILE {
            payload.insert("tile".to_string(), self.tile.to_string());
        }
        if self.batch != DEFAULT_BATCH {
            payload.insert("batch".to_string(), self.batch.to_string());
        }

        payload
    }
}

/// Flatten a multi-value flag the way the serving container expects:
/// every item followed by a space, trailing separator included.
fn join_spaced(items: &[String]) -> String {
    items.iter().map(|item| format!("{item} ")).collect()
}
