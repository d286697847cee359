use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use yolopost::io::load_rgb_image;
use yolopost::{
    ChannelSampler, ClassLabelTable, DecodeConfig, Detection, NmsConfig, Pipeline,
    PipelineConfig, PreprocessConfig, ResizeFilter, SuppressionOrder,
};

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "yolopost CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
enum FilterConfig {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<FilterConfig> for ResizeFilter {
    fn from(value: FilterConfig) -> Self {
        match value {
            FilterConfig::Nearest => ResizeFilter::Nearest,
            FilterConfig::Triangle => ResizeFilter::Triangle,
            FilterConfig::CatmullRom => ResizeFilter::CatmullRom,
            FilterConfig::Gaussian => ResizeFilter::Gaussian,
            FilterConfig::Lanczos3 => ResizeFilter::Lanczos3,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
enum OrderConfig {
    Descending,
    Ascending,
}

impl From<OrderConfig> for SuppressionOrder {
    fn from(value: OrderConfig) -> Self {
        match value {
            OrderConfig::Descending => SuppressionOrder::Descending,
            OrderConfig::Ascending => SuppressionOrder::Ascending,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PreprocessConfigJson {
    input_size: usize,
    filter: FilterConfig,
}

impl Default for PreprocessConfigJson {
    fn default() -> Self {
        let cfg = PreprocessConfig::default();
        Self {
            input_size: cfg.input_size,
            filter: FilterConfig::Lanczos3,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DecodeConfigJson {
    confidence_threshold: f32,
    num_anchors: usize,
}

impl Default for DecodeConfigJson {
    fn default() -> Self {
        Self {
            confidence_threshold: DecodeConfig::default().confidence_threshold,
            num_anchors: 8400,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct NmsConfigJson {
    iou_threshold: f32,
    order: OrderConfig,
    per_class: bool,
}

impl Default for NmsConfigJson {
    fn default() -> Self {
        let cfg = NmsConfig::default();
        Self {
            iou_threshold: cfg.iou_threshold,
            order: OrderConfig::Descending,
            per_class: cfg.per_class,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    labels_path: Option<String>,
    input_tensor_path: Option<String>,
    output_tensor_path: Option<String>,
    output_path: Option<String>,
    preprocess: PreprocessConfigJson,
    decode: DecodeConfigJson,
    nms: NmsConfigJson,
}

impl Config {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            preprocess: PreprocessConfig {
                input_size: self.preprocess.input_size,
                filter: self.preprocess.filter.into(),
            },
            decode: DecodeConfig {
                confidence_threshold: self.decode.confidence_threshold,
                input_size: self.preprocess.input_size,
            },
            nms: NmsConfig {
                iou_threshold: self.nms.iou_threshold,
                order: self.nms.order.into(),
                per_class: self.nms.per_class,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    label: String,
    class_id: usize,
    confidence: f32,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl From<Detection> for DetectionRecord {
    fn from(value: Detection) -> Self {
        Self {
            label: value.label,
            class_id: value.class_id,
            confidence: value.confidence,
            x1: value.x1,
            y1: value.y1,
            x2: value.x2,
            y2: value.y2,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    width: usize,
    height: usize,
    detections: Vec<DetectionRecord>,
}

fn read_f32_le(path: &Path) -> CliResult<Vec<f32>> {
    let bytes = fs::read(path)?;
    if bytes.len() % 4 != 0 {
        return Err(format!(
            "{}: {} bytes is not a whole number of f32 values",
            path.display(),
            bytes.len()
        )
        .into());
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn write_f32_le(path: &Path, values: &[f32]) -> CliResult<()> {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    fs::write(path, bytes)?;
    Ok(())
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("yolopost=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }
    if config.input_tensor_path.is_none() && config.output_tensor_path.is_none() {
        return Err("set input_tensor_path, output_tensor_path, or both".into());
    }

    let labels = match &config.labels_path {
        Some(path) => ClassLabelTable::load(path)?,
        None => ClassLabelTable::coco().clone(),
    };
    let pipeline = Pipeline::new(config.pipeline_config(), labels, config.decode.num_anchors)?;

    let image = load_rgb_image(&config.image_path)?;
    let image_size = (image.width(), image.height());
    info!(width = image_size.0, height = image_size.1, "loaded image");

    if let Some(path) = &config.input_tensor_path {
        let mut tensor = vec![0.0f32; pipeline.input_len()];
        pipeline.prepare_input(&image, &mut tensor)?;
        write_f32_le(Path::new(path), &tensor)?;
        info!(values = tensor.len(), path = %path, "wrote input tensor");
    }

    if let Some(path) = &config.output_tensor_path {
        let raw = read_f32_le(Path::new(path))?;
        let detections = pipeline.postprocess(&raw, image_size)?;
        info!(count = detections.len(), "detections");

        let output = Output {
            width: image_size.0,
            height: image_size.1,
            detections: detections.into_iter().map(DetectionRecord::from).collect(),
        };
        let json = serde_json::to_string_pretty(&output)?;
        match &config.output_path {
            Some(path) => fs::write(path, json)?,
            None => println!("{json}"),
        }
    }

    Ok(())
}
