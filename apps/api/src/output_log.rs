//! Persists every prompt run to disk so raw model replies can be inspected
//! after the fact. Each run produces a `.json` record and a `.txt` dump.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Serialize)]
struct OutputRecord<'a> {
    timestamp: String,
    prompt_name: &'a str,
    status: &'a str,
    success: bool,
    rendered_prompt: &'a str,
    model_response: &'a str,
    response_length: usize,
}

#[derive(Debug, Clone)]
pub struct OutputLog {
    dir: PathBuf,
}

impl OutputLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `output_{prompt}_{status}_{timestamp}.json` and its `.txt`
    /// sibling, with a millisecond timestamp. Returns the path of the JSON record.
    pub async fn save(
        &self,
        model_text: &str,
        prompt_name: &str,
        success: bool,
        rendered_prompt: &str,
    ) -> Result<PathBuf> {
        let now = Local::now();
        let status = if success { "success" } else { "error" };
        let stem = format!(
            "output_{prompt_name}_{status}_{}",
            now.format("%Y%m%d_%H%M%S_%3f")
        );

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create output dir {}", self.dir.display()))?;

        let record = OutputRecord {
            timestamp: now.to_rfc3339(),
            prompt_name,
            status,
            success,
            rendered_prompt,
            model_response: model_text,
            response_length: model_text.chars().count(),
        };
        let (stem, mut json_file) = self.claim_stem(&stem).await?;
        let json_path = self.dir.join(format!("{stem}.json"));
        json_file
            .write_all(serde_json::to_string_pretty(&record)?.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", json_path.display()))?;

        let body = if model_text.is_empty() {
            "No content"
        } else {
            model_text
        };
        let txt = format!(
            "Timestamp: {}\nPrompt: {prompt_name}\nStatus: {status}\n{}\n\n{body}",
            now.to_rfc3339(),
            "-".repeat(50),
        );
        let txt_path = self.dir.join(format!("{stem}.txt"));
        tokio::fs::write(&txt_path, txt)
            .await
            .with_context(|| format!("Failed to write {}", txt_path.display()))?;

        Ok(json_path)
    }

    /// Creates `{base}.json`, or `{base}_{n}.json` for the first free `n`, so
    /// runs landing in the same millisecond never overwrite each other.
    async fn claim_stem(&self, base: &str) -> Result<(String, File)> {
        let mut attempt = 0u32;
        loop {
            let stem = match attempt {
                0 => base.to_string(),
                n => format!("{base}_{n}"),
            };
            let path = self.dir.join(format!("{stem}.json"));
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((stem, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create {}", path.display()))
                }
            }
        }
    }
}
