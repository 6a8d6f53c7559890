//! Writing classified images to stdout or a file.
//!
//! Three formats: a plain-text top-5 table per image, a single JSON array,
//! or one JSON object per line.

use serde::Serialize;
use std::io::{self, Write};
use std::str::FromStr;

use crate::types::ClassifiedImage;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable table per image
    #[default]
    Table,
    /// JSON array, written once at the end
    Json,
    /// One JSON object per line, written as images complete
    JsonLines,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Ok(Self::JsonLines),
            other => Err(format!("Unknown output format '{other}'")),
        }
    }
}

/// Streams classified images in the chosen format.
///
/// JSON output is buffered until [`OutputWriter::finish`] so the result is a
/// single valid array; the other formats write immediately.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pending: Vec<ClassifiedImage>,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            pending: Vec::new(),
            items_written: 0,
        }
    }

    /// Write (or buffer) one classified image.
    pub fn write(&mut self, image: &ClassifiedImage) -> io::Result<()> {
        match self.format {
            OutputFormat::Table => {
                write_table(&mut self.writer, image)?;
                self.items_written += 1;
            }
            OutputFormat::JsonLines => {
                write_json(&mut self.writer, image, false)?;
                writeln!(self.writer)?;
                self.items_written += 1;
            }
            OutputFormat::Json => self.pending.push(image.clone()),
        }
        Ok(())
    }

    /// Flush buffered JSON and the underlying writer.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            let pending = std::mem::take(&mut self.pending);
            write_json(&mut self.writer, &pending, true)?;
            writeln!(self.writer)?;
            self.items_written += pending.len();
        }
        self.writer.flush()
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, item: &T, pretty: bool) -> io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(writer, item).map_err(io::Error::other)
    } else {
        serde_json::to_writer(writer, item).map_err(io::Error::other)
    }
}

fn write_table<W: Write>(writer: &mut W, image: &ClassifiedImage) -> io::Result<()> {
    writeln!(
        writer,
        "{} ({}, {})",
        image.file_name, image.source, image.result.model
    )?;
    writeln!(writer, "  {:<4}{:<12}{:<28}{:>8}", "#", "Class ID", "Class Name", "Rating")?;
    for (rank, p) in image.result.predictions.iter().enumerate() {
        writeln!(
            writer,
            "  {:<4}{:<12}{:<28}{:>7.2}%",
            rank + 1,
            p.class_id,
            p.class_name,
            p.confidence
        )?;
    }
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ModelKind;
    use crate::types::{ClassificationResult, Prediction};
    use std::path::PathBuf;

    fn image(name: &str) -> ClassifiedImage {
        ClassifiedImage {
            file_path: PathBuf::from(format!("local_images/{name}")),
            file_name: name.to_string(),
            source: "Upload".to_string(),
            result: ClassificationResult {
                model: ModelKind::InceptionV3,
                predictions: vec![
                    Prediction::new("n01440764", "tench", 88.1),
                    Prediction::new("n01443537", "goldfish", 4.25),
                ],
            },
        }
    }

    #[test]
    fn test_table_lists_predictions_in_rank_order() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Table);
        writer.write(&image("fish.png")).unwrap();
        writer.finish().unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with("fish.png (Upload, InceptionV3)"));
        let tench = output.find("tench").unwrap();
        let goldfish = output.find("goldfish").unwrap();
        assert!(tench < goldfish);
        assert!(output.contains("88.10%"));
    }

    #[test]
    fn test_jsonl_one_line_per_image() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines);
        writer.write(&image("a.png")).unwrap();
        writer.write(&image("b.png")).unwrap();
        writer.finish().unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"file_name\":\"b.png\""));
    }

    #[test]
    fn test_json_is_single_array() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json);
        writer.write(&image("a.png")).unwrap();
        writer.write(&image("b.png")).unwrap();
        writer.finish().unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let parsed: Vec<ClassifiedImage> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("JSONL".parse::<OutputFormat>().unwrap(), OutputFormat::JsonLines);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
