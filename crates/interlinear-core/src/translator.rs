//! Translation boundary.
//!
//! The core never picks a model. It talks to anything implementing
//! [`Translator`], and ships [`ProcessTranslator`], which drives an external
//! worker over newline-delimited JSON on stdin/stdout.

use crate::error::ReaderError;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Maps source sentences to translations, same order, same length.
pub trait Translator: Send + Sync {
    fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ReaderError>;
}

/// Translate `texts` in fixed-size chunks, checking each chunk's length.
pub fn translate_in_chunks(
    translator: &dyn Translator,
    texts: &[String],
    chunk_size: usize,
) -> Result<Vec<String>, ReaderError> {
    let mut translations = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(chunk_size.max(1)) {
        let out = translator.translate_batch(chunk)?;
        if out.len() != chunk.len() {
            return Err(ReaderError::LengthMismatch {
                sources: chunk.len(),
                translations: out.len(),
            });
        }
        translations.extend(out);
    }
    Ok(translations)
}

#[derive(Serialize)]
struct WorkerRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    texts: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shutdown: Option<bool>,
}

#[derive(Deserialize)]
struct WorkerResponse {
    ok: bool,
    #[serde(default)]
    translations: Vec<String>,
    error: Option<String>,
}

struct WorkerIo {
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Translator backed by a long-lived child process.
pub struct ProcessTranslator {
    child: Mutex<Child>,
    io: Mutex<WorkerIo>,
}

impl ProcessTranslator {
    /// Spawn `argv[0]` with the remaining arguments.
    pub fn spawn(argv: &[String]) -> Result<Self, ReaderError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ReaderError::Translation("no translator command configured".into()))?;
        info!(program = %program, args = ?args, "Starting translator worker");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReaderError::Translation("worker stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReaderError::Translation("worker stdout unavailable".into()))?;
        Ok(Self {
            child: Mutex::new(child),
            io: Mutex::new(WorkerIo {
                stdin,
                stdout: BufReader::new(stdout),
            }),
        })
    }

    fn roundtrip(io: &mut WorkerIo, texts: &[String]) -> Result<Vec<String>, ReaderError> {
        let request = WorkerRequest {
            texts: Some(texts),
            shutdown: None,
        };
        let payload = serde_json::to_string(&request)?;
        io.stdin.write_all(payload.as_bytes())?;
        io.stdin.write_all(b"\n")?;
        io.stdin.flush()?;

        let mut line = String::new();
        if io.stdout.read_line(&mut line)? == 0 {
            return Err(ReaderError::Translation(
                "worker closed its output".to_string(),
            ));
        }
        let response: WorkerResponse = serde_json::from_str(line.trim())?;
        if !response.ok {
            return Err(ReaderError::Translation(
                response
                    .error
                    .unwrap_or_else(|| "worker reported failure".to_string()),
            ));
        }
        Ok(response.translations)
    }
}

impl Translator for ProcessTranslator {
    fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ReaderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut io = self
            .io
            .lock()
            .map_err(|_| ReaderError::Translation("worker lock poisoned".into()))?;
        debug!(count = texts.len(), "Sending batch to translator worker");
        Self::roundtrip(&mut io, texts)
    }
}

impl Drop for ProcessTranslator {
    fn drop(&mut self) {
        if let Ok(io) = self.io.get_mut() {
            let request = WorkerRequest {
                texts: None,
                shutdown: Some(true),
            };
            if let Ok(payload) = serde_json::to_string(&request) {
                let _ = io.stdin.write_all(payload.as_bytes());
                let _ = io.stdin.write_all(b"\n");
                let _ = io.stdin.flush();
            }
        }
        if let Ok(child) = self.child.get_mut() {
            if let Err(err) = child.wait() {
                warn!("Translator worker did not exit cleanly: {err}");
            }
        }
    }
}
