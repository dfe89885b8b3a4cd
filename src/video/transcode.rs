//! ffprobe/ffmpeg process wrappers: probe the source stream, decode every
//! frame and re-encode it to MPEG-4 (XVID fourcc) in an AVI container.

use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{debug, warn};

use crate::bench::{BenchError, BenchResult};

const INSTALL_HINT: &str = "install FFmpeg, e.g. 'sudo apt install ffmpeg'";

/// Parsed ffprobe JSON (subset of fields we care about).
#[derive(Debug, Deserialize)]
pub struct ProbeOutput {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
pub struct ProbeStream {
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub avg_frame_rate: Option<String>,
    #[serde(default)]
    pub r_frame_rate: Option<String>,
}

/// Geometry and nominal rate of the source video stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// Parse an ffmpeg rational such as `30000/1001`.
pub fn parse_rate(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => s.trim().parse().ok(),
    }
}

/// Extract the first video stream from ffprobe's JSON.
pub fn parse_probe(json: &str) -> BenchResult<Option<StreamInfo>> {
    let probe: ProbeOutput = serde_json::from_str(json).map_err(|e| BenchError::Parse {
        what: "ffprobe JSON".to_string(),
        detail: e.to_string(),
    })?;
    Ok(probe.streams.into_iter().find_map(|s| {
        let fps = s
            .avg_frame_rate
            .as_deref()
            .and_then(parse_rate)
            .filter(|r| *r > 0.0)
            .or_else(|| s.r_frame_rate.as_deref().and_then(parse_rate))
            .unwrap_or(0.0);
        Some(StreamInfo {
            width: s.width?,
            height: s.height?,
            fps,
        })
    }))
}

fn spawn_error(tool: &str, e: std::io::Error) -> BenchError {
    if e.kind() == std::io::ErrorKind::NotFound {
        BenchError::ToolMissing {
            tool: tool.to_string(),
            hint: INSTALL_HINT.to_string(),
        }
    } else {
        BenchError::Io(e)
    }
}

/// Probe `path`; a file without a decodable video stream cannot be opened.
pub async fn probe(ffprobe: &str, path: &Path) -> BenchResult<StreamInfo> {
    let output = tokio::process::Command::new(ffprobe)
        .args(["-v", "error", "-select_streams", "v:0"])
        .args(["-show_entries", "stream=width,height,avg_frame_rate,r_frame_rate"])
        .args(["-of", "json"])
        .arg(path)
        .output()
        .await
        .map_err(|e| spawn_error(ffprobe, e))?;

    let open_err = || BenchError::VideoOpen {
        path: path.display().to_string(),
    };
    if !output.status.success() {
        debug!(stderr = %String::from_utf8_lossy(&output.stderr).trim(), "ffprobe failed");
        return Err(open_err());
    }
    parse_probe(&String::from_utf8_lossy(&output.stdout))?.ok_or_else(open_err)
}

/// Running state fed by ffmpeg's `-progress` key=value lines.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProgressState {
    pub frames: u64,
    pub finished: bool,
}

impl ProgressState {
    pub fn apply(&mut self, line: &str) {
        let Some((key, value)) = line.trim().split_once('=') else {
            return;
        };
        match key {
            "frame" => {
                if let Ok(n) = value.trim().parse() {
                    self.frames = n;
                }
            }
            "progress" => self.finished = value.trim() == "end",
            _ => {}
        }
    }
}

/// Frames processed and wall-clock time of one transcode.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeStats {
    pub frames: u64,
    pub elapsed_secs: f64,
}

/// Decode `input` and re-encode it into `output`, timing the whole pass.
pub async fn transcode(ffmpeg: &str, input: &Path, output: &Path) -> BenchResult<TranscodeStats> {
    let mut cmd = tokio::process::Command::new(ffmpeg);
    cmd.args(["-hide_banner", "-nostats", "-loglevel", "error", "-y", "-i"])
        .arg(input)
        .args(["-an", "-c:v", "mpeg4", "-vtag", "xvid", "-f", "avi"])
        .args(["-progress", "pipe:1"])
        .arg(output)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    debug!(?cmd, "spawning ffmpeg");

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(|e| spawn_error(ffmpeg, e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| BenchError::Io(std::io::Error::other("ffmpeg stdout not captured")))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| BenchError::Io(std::io::Error::other("ffmpeg stderr not captured")))?;
    let stderr_task = tokio::spawn(async move {
        let mut buf = String::new();
        let _ = stderr.read_to_string(&mut buf).await;
        buf
    });

    let mut state = ProgressState::default();
    let mut lines = BufReader::new(stdout).lines();
    while let Some(line) = lines.next_line().await? {
        state.apply(&line);
    }

    let status = child.wait().await?;
    let elapsed_secs = start.elapsed().as_secs_f64();
    let stderr = stderr_task.await.unwrap_or_default();

    if !status.success() {
        return Err(BenchError::ToolFailed {
            tool: ffmpeg.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    if !state.finished {
        warn!(frames = state.frames, "ffmpeg exited without a final progress report");
    }

    Ok(TranscodeStats {
        frames: state.frames,
        elapsed_secs,
    })
}
