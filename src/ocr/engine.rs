//! Tesseract-backed [`TextReader`].
//!
//! Shells out to the `tesseract` binary with TSV output so every token
//! carries a confidence score. Crops are contrast-boosted to grayscale
//! first, then go through temp files; tesseract has no useful
//! stdin/stdout image mode across versions.

use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use std::process::Command;
use tempfile::NamedTempFile;

use super::preprocess::enhance_for_ocr;
use super::{ReadOptions, TextReader, Tokenize};

/// One recognized word with its confidence (0-100).
#[derive(Debug, Clone)]
pub struct RecognizedWord {
    pub text: String,
    pub confidence: f32,
}

/// One recognized line, grouped from TSV word rows.
#[derive(Debug, Clone)]
pub struct RecognizedLine {
    pub words: Vec<RecognizedWord>,
    pub confidence: f32,
}

impl RecognizedLine {
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct TesseractReader {
    executable: String,
}

impl TesseractReader {
    /// Locates the tesseract binary and verifies it runs. The
    /// `PRACTISTICS_TESSERACT` environment variable overrides the PATH
    /// lookup.
    pub fn new() -> Result<Self> {
        let executable =
            std::env::var("PRACTISTICS_TESSERACT").unwrap_or_else(|_| "tesseract".to_string());
        let output = Command::new(&executable)
            .arg("--version")
            .output()
            .with_context(|| format!("Failed to run '{executable}'; is tesseract installed?"))?;
        if !output.status.success() {
            return Err(anyhow!("'{executable} --version' exited with {}", output.status));
        }
        Ok(Self { executable })
    }

    fn run_tesseract(&self, image: &RgbImage, options: &ReadOptions) -> Result<Vec<RecognizedLine>> {
        let temp_input = NamedTempFile::with_suffix(".png").context("Failed to create temp image")?;
        enhance_for_ocr(image)
            .save(temp_input.path())
            .context("Failed to write temp image for OCR")?;

        // Tesseract appends .tsv to the output base itself.
        let temp_output = NamedTempFile::new().context("Failed to create temp output")?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let mut command = Command::new(&self.executable);
        command
            .arg(temp_input.path())
            .arg(&output_base)
            .arg("-l")
            .arg("eng")
            .arg("--psm")
            .arg("6") // uniform block of text
            .arg("tsv");
        if let Some(allowlist) = &options.allowlist {
            command.arg("-c").arg(format!("tessedit_char_whitelist={allowlist}"));
        }

        let output = command.output().context("Failed to spawn tesseract")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        let tsv_path = format!("{output_base}.tsv");
        let tsv = std::fs::read_to_string(&tsv_path)
            .with_context(|| format!("Failed to read tesseract output {tsv_path}"))?;
        let _ = std::fs::remove_file(&tsv_path);

        Ok(parse_tsv(&tsv))
    }
}

impl TextReader for TesseractReader {
    fn read_text(&self, image: &RgbImage, options: &ReadOptions) -> Result<Vec<String>> {
        let lines = self.run_tesseract(image, options)?;
        Ok(tokenize(&lines, options))
    }
}

/// Flattens recognized lines into the caller's requested token shape,
/// dropping anything under the confidence floor.
pub fn tokenize(lines: &[RecognizedLine], options: &ReadOptions) -> Vec<String> {
    match options.tokenize {
        Tokenize::Lines => lines
            .iter()
            .filter(|line| line.confidence >= options.min_confidence)
            .map(RecognizedLine::text)
            .filter(|text| !text.is_empty())
            .collect(),
        Tokenize::Words => lines
            .iter()
            .flat_map(|line| line.words.iter())
            .filter(|word| word.confidence >= options.min_confidence)
            .map(|word| word.text.clone())
            .collect(),
    }
}

/// Parses tesseract TSV output into lines of confident words.
///
/// TSV fields: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text. Level 5 rows are words.
fn parse_tsv(tsv: &str) -> Vec<RecognizedLine> {
    let mut lines: Vec<RecognizedLine> = Vec::new();
    let mut current_key: Option<(i32, i32, i32)> = None;
    let mut current_words: Vec<RecognizedWord> = Vec::new();

    let mut flush = |words: &mut Vec<RecognizedWord>, lines: &mut Vec<RecognizedLine>| {
        if words.is_empty() {
            return;
        }
        let confidence =
            words.iter().map(|w| w.confidence).sum::<f32>() / words.len() as f32;
        lines.push(RecognizedLine { words: std::mem::take(words), confidence });
    };

    for row in tsv.lines().skip(1) {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        let level: i32 = fields[0].parse().unwrap_or(-1);
        if level != 5 {
            continue;
        }
        let block: i32 = fields[2].parse().unwrap_or(-1);
        let par: i32 = fields[3].parse().unwrap_or(-1);
        let line: i32 = fields[4].parse().unwrap_or(-1);
        let conf: f32 = fields[10].parse().unwrap_or(-1.0);
        let text = fields[11].trim();

        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (block, par, line);
        if current_key.is_some() && current_key != Some(key) {
            flush(&mut current_words, &mut lines);
        }
        current_key = Some(key);
        current_words.push(RecognizedWord { text: text.to_string(), confidence: conf });
    }
    flush(&mut current_words, &mut lines);

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn word_row(block: i32, line: i32, word: i32, conf: f32, text: &str) -> String {
        format!("5\t1\t{block}\t1\t{line}\t{word}\t0\t0\t10\t10\t{conf}\t{text}")
    }

    #[test]
    fn test_parse_tsv_groups_lines() {
        let tsv = [
            HEADER.to_string(),
            "4\t1\t1\t1\t1\t0\t0\t0\t10\t10\t-1\t".to_string(),
            word_row(1, 1, 1, 90.0, "TenZ"),
            word_row(1, 2, 1, 85.0, "Jett"),
        ]
        .join("\n");

        let lines = parse_tsv(&tsv);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "TenZ");
        assert_eq!(lines[1].text(), "Jett");
    }

    #[test]
    fn test_parse_tsv_joins_words_in_line() {
        let tsv = [
            HEADER.to_string(),
            word_row(1, 1, 1, 90.0, "SPIKE"),
            word_row(1, 1, 2, 80.0, "PLANTED"),
        ]
        .join("\n");

        let lines = parse_tsv(&tsv);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "SPIKE PLANTED");
        assert!((lines[0].confidence - 85.0).abs() < 0.01);
    }

    #[test]
    fn test_parse_tsv_skips_unconfident_rows() {
        let tsv = [HEADER.to_string(), word_row(1, 1, 1, -1.0, "noise")].join("\n");
        assert!(parse_tsv(&tsv).is_empty());
    }

    #[test]
    fn test_tokenize_words_vs_lines() {
        let lines = vec![RecognizedLine {
            words: vec![
                RecognizedWord { text: "13".to_string(), confidence: 95.0 },
                RecognizedWord { text: "WIN".to_string(), confidence: 92.0 },
                RecognizedWord { text: "7".to_string(), confidence: 94.0 },
            ],
            confidence: 93.7,
        }];

        let as_lines = tokenize(&lines, &ReadOptions::default());
        assert_eq!(as_lines, vec!["13 WIN 7"]);

        let as_words = tokenize(&lines, &ReadOptions::words());
        assert_eq!(as_words, vec!["13", "WIN", "7"]);
    }

    #[test]
    fn test_tokenize_confidence_floor() {
        let lines = vec![
            RecognizedLine {
                words: vec![RecognizedWord { text: "ok".to_string(), confidence: 80.0 }],
                confidence: 80.0,
            },
            RecognizedLine {
                words: vec![RecognizedWord { text: "junk".to_string(), confidence: 20.0 }],
                confidence: 20.0,
            },
        ];
        let options = ReadOptions { min_confidence: 60.0, ..ReadOptions::default() };
        assert_eq!(tokenize(&lines, &options), vec!["ok"]);
    }
}
