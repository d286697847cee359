use serde::{Deserialize, Serialize};
use yolopost::{
    ClassLabelTable, Detection, NmsConfig, Pipeline, PipelineConfig, PreprocessConfig,
    SuppressionOrder,
};

const CASES: &str = r#"
[
  {
    "name": "duplicates_collapse_descending",
    "labels": ["car", "person"],
    "anchors": 6,
    "input_size": 64,
    "image": [128, 64],
    "boxes": [
      {"anchor": 0, "cx": 16.0, "cy": 16.0, "w": 16.0, "h": 16.0, "class_id": 1, "score": 0.6},
      {"anchor": 2, "cx": 16.0, "cy": 16.0, "w": 16.0, "h": 16.0, "class_id": 1, "score": 0.9},
      {"anchor": 5, "cx": 48.0, "cy": 48.0, "w": 8.0, "h": 8.0, "class_id": 0, "score": 0.7}
    ],
    "expected": [
      {"label": "person", "class_id": 1, "confidence": 0.9, "x1": 16.0, "y1": 8.0, "x2": 48.0, "y2": 24.0},
      {"label": "car", "class_id": 0, "confidence": 0.7, "x1": 88.0, "y1": 44.0, "x2": 104.0, "y2": 52.0}
    ]
  },
  {
    "name": "duplicates_collapse_ascending",
    "labels": ["car", "person"],
    "anchors": 6,
    "input_size": 64,
    "order": "ascending",
    "image": [64, 64],
    "boxes": [
      {"anchor": 0, "cx": 16.0, "cy": 16.0, "w": 16.0, "h": 16.0, "class_id": 1, "score": 0.6},
      {"anchor": 2, "cx": 16.0, "cy": 16.0, "w": 16.0, "h": 16.0, "class_id": 1, "score": 0.9}
    ],
    "expected": [
      {"label": "person", "class_id": 1, "confidence": 0.6, "x1": 8.0, "y1": 8.0, "x2": 24.0, "y2": 24.0}
    ]
  },
  {
    "name": "below_threshold_is_empty",
    "labels": ["car"],
    "anchors": 2,
    "input_size": 64,
    "image": [64, 64],
    "boxes": [
      {"anchor": 1, "cx": 16.0, "cy": 16.0, "w": 16.0, "h": 16.0, "class_id": 0, "score": 0.49}
    ],
    "expected": []
  }
]
"#;

#[derive(Debug, Deserialize)]
struct AnchorBox {
    anchor: usize,
    cx: f32,
    cy: f32,
    w: f32,
    h: f32,
    class_id: usize,
    score: f32,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CaseOrder {
    #[default]
    Descending,
    Ascending,
}

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    labels: Vec<String>,
    anchors: usize,
    input_size: usize,
    #[serde(default)]
    order: CaseOrder,
    image: (usize, usize),
    boxes: Vec<AnchorBox>,
    expected: Vec<DetectionRecord>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
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
    fn from(d: Detection) -> Self {
        Self {
            label: d.label,
            class_id: d.class_id,
            confidence: d.confidence,
            x1: d.x1,
            y1: d.y1,
            x2: d.x2,
            y2: d.y2,
        }
    }
}

fn pipeline_for(case: &Case) -> Pipeline {
    let mut cfg = PipelineConfig {
        preprocess: PreprocessConfig {
            input_size: case.input_size,
            ..PreprocessConfig::default()
        },
        nms: NmsConfig {
            order: match case.order {
                CaseOrder::Descending => SuppressionOrder::Descending,
                CaseOrder::Ascending => SuppressionOrder::Ascending,
            },
            ..NmsConfig::default()
        },
        ..PipelineConfig::default()
    };
    cfg.decode.input_size = case.input_size;
    let labels = ClassLabelTable::new(case.labels.clone()).unwrap();
    Pipeline::new(cfg, labels, case.anchors).unwrap()
}

fn output_for(case: &Case) -> Vec<f32> {
    let mut data = vec![0.0f32; (4 + case.labels.len()) * case.anchors];
    for b in &case.boxes {
        for (row, value) in [b.cx, b.cy, b.w, b.h].into_iter().enumerate() {
            data[row * case.anchors + b.anchor] = value;
        }
        data[(4 + b.class_id) * case.anchors + b.anchor] = b.score;
    }
    data
}

#[test]
fn json_cases_match_expected_detections() {
    let cases: Vec<Case> = serde_json::from_str(CASES).unwrap();
    assert_eq!(cases.len(), 3);
    for case in &cases {
        let dets = pipeline_for(case)
            .postprocess(&output_for(case), case.image)
            .unwrap();
        let records: Vec<DetectionRecord> = dets.into_iter().map(DetectionRecord::from).collect();
        assert_eq!(records, case.expected, "{}", case.name);
    }
}

#[test]
fn detection_records_serialize_with_stable_field_names() {
    let cases: Vec<Case> = serde_json::from_str(CASES).unwrap();
    let case = &cases[0];
    let dets = pipeline_for(case)
        .postprocess(&output_for(case), case.image)
        .unwrap();
    let records: Vec<DetectionRecord> = dets.into_iter().map(DetectionRecord::from).collect();

    let json = serde_json::to_value(&records).unwrap();
    let first = &json[0];
    assert_eq!(first["label"], "person");
    assert_eq!(first["class_id"], 1);
    assert_eq!(first["x2"], 48.0);

    let text = serde_json::to_string(&records).unwrap();
    let back: Vec<DetectionRecord> = serde_json::from_str(&text).unwrap();
    assert_eq!(back, records);
}
