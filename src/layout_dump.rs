use crate::layout::{CloudLayout, FailureReason};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub canceled: bool,
    pub words: Vec<WordDump>,
    pub failed: Vec<FailedDump>,
}

#[derive(Debug, Serialize)]
pub struct WordDump {
    pub text: String,
    pub weight: f64,
    pub font_size: f32,
    pub rotated: bool,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub anchor: [f32; 2],
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct FailedDump {
    pub text: String,
    pub weight: f64,
    pub reason: String,
}

impl LayoutDump {
    pub fn from_layout(layout: &CloudLayout) -> Self {
        let words = layout
            .words
            .iter()
            .map(|word| WordDump {
                text: word.text.clone(),
                weight: word.weight,
                font_size: word.font_size,
                rotated: word.rotated,
                x: word.x,
                y: word.y,
                width: word.width,
                height: word.height,
                anchor: [word.anchor_x, word.anchor_y],
                color: word.color.clone(),
            })
            .collect();
        let failed = layout
            .failed
            .iter()
            .map(|word| FailedDump {
                text: word.text.clone(),
                weight: word.weight,
                reason: reason_name(word.reason).to_string(),
            })
            .collect();
        Self {
            width: layout.width,
            height: layout.height,
            canceled: layout.canceled,
            words,
            failed,
        }
    }
}

fn reason_name(reason: FailureReason) -> &'static str {
    match reason {
        FailureReason::OutOfBounds => "out_of_bounds",
        FailureReason::Exhausted => "exhausted",
        FailureReason::Rasterize => "rasterize",
    }
}

pub fn write_layout_dump(path: &Path, layout: &CloudLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
