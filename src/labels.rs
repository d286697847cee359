//! Class label tables.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::util::{YoloPostError, YoloPostResult};

/// The 80 COCO class names in YOLO class-id order.
pub const COCO_LABELS: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Immutable ordered list of class names, indexed by class id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassLabelTable {
    labels: Vec<String>,
}

impl ClassLabelTable {
    /// Builds a table from an ordered list of names.
    pub fn new<I, S>(labels: I) -> YoloPostResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(YoloPostError::InvalidConfiguration(
                "label table must not be empty",
            ));
        }
        Ok(Self { labels })
    }

    /// Parses one label per line. Trailing whitespace and blank lines at the
    /// end of the text are ignored; interior blank lines keep their slot.
    pub fn from_lines(text: &str) -> YoloPostResult<Self> {
        let mut labels: Vec<&str> = text.lines().map(str::trim_end).collect();
        while labels.last().is_some_and(|l| l.is_empty()) {
            labels.pop();
        }
        Self::new(labels)
    }

    /// Reads a newline-separated label file.
    pub fn load<P: AsRef<Path>>(path: P) -> YoloPostResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| YoloPostError::LabelFile {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        Self::from_lines(&text)
    }

    /// Shared COCO table, built on first use.
    pub fn coco() -> &'static ClassLabelTable {
        static COCO: OnceLock<ClassLabelTable> = OnceLock::new();
        COCO.get_or_init(|| ClassLabelTable {
            labels: COCO_LABELS.iter().map(|s| (*s).to_owned()).collect(),
        })
    }

    /// Returns the label for `class_id`.
    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.labels.get(class_id).map(String::as_str)
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed table; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates labels in class-id order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
