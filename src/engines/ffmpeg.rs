use std::io::Read;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use indicatif::ProgressBar;

use super::locate_tool;
use crate::common::progress::{clear_bar, create_progress_bar};

pub trait FfmpegRunner {
    fn run(&self, args: &[String], options: FfmpegRunOptions) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFfmpegRunner;

#[derive(Debug, Clone, Default)]
pub struct FfmpegRunOptions {
    /// Expected output length, enables the progress bar
    pub total_duration: Option<f64>,
    /// Echo ffmpeg's stderr
    pub verbose: bool,
    /// Hide every terminal decoration
    pub quiet: bool,
}

impl FfmpegRunOptions {
    pub fn new(total_duration: Option<f64>, verbose: bool) -> Self {
        Self {
            total_duration,
            verbose,
            quiet: false,
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

impl FfmpegRunner for SystemFfmpegRunner {
    fn run(&self, args: &[String], options: FfmpegRunOptions) -> Result<()> {
        let program = locate_tool("ffmpeg")?;
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg")?;

        let stderr = child
            .stderr
            .take()
            .context("Failed to capture ffmpeg stderr")?;

        let pb = match options.total_duration {
            Some(duration) if !options.quiet && duration > 0.0 => {
                Some(create_progress_bar(duration, "encoding"))
            }
            _ => None,
        };

        let mut tail = StderrTail::default();
        let result = read_ffmpeg_stderr(stderr, options.verbose, pb.as_ref(), &mut tail);

        let status = child.wait().context("Failed to wait for ffmpeg")?;
        if let Some(pb) = &pb {
            clear_bar(pb);
        }
        result?;

        if !status.success() {
            bail!(
                "ffmpeg exited with status {:?}: {}",
                status.code(),
                tail.summary()
            );
        }

        Ok(())
    }
}

/// Last line and error lines seen on ffmpeg's stderr
#[derive(Debug, Default)]
struct StderrTail {
    last_line: String,
    error_lines: Vec<String>,
}

impl StderrTail {
    fn record(&mut self, line: &str) {
        self.last_line = line.to_string();
        if line.to_ascii_lowercase().contains("error") {
            self.error_lines.push(line.to_string());
        }
    }

    fn summary(&self) -> String {
        if self.error_lines.is_empty() {
            self.last_line.trim().to_string()
        } else {
            self.error_lines.join("\n").trim().to_string()
        }
    }
}

fn read_ffmpeg_stderr<R: Read>(
    mut stderr: R,
    verbose: bool,
    pb: Option<&ProgressBar>,
    tail: &mut StderrTail,
) -> Result<()> {
    let mut buffer = [0u8; 4096];
    let mut accumulated = String::new();

    loop {
        let bytes_read = stderr
            .read(&mut buffer)
            .context("Failed to read ffmpeg stderr")?;
        if bytes_read == 0 {
            break;
        }

        accumulated.push_str(&String::from_utf8_lossy(&buffer[..bytes_read]));

        while let Some(pos) = accumulated.find(['\r', '\n']) {
            let line: String = accumulated.drain(..=pos).collect();
            let line = line.trim_end_matches(['\r', '\n']);
            if !line.is_empty() {
                handle_line(line, verbose, pb, tail);
            }
        }
    }

    if !accumulated.trim().is_empty() {
        handle_line(accumulated.trim(), verbose, pb, tail);
    }

    Ok(())
}

fn handle_line(line: &str, verbose: bool, pb: Option<&ProgressBar>, tail: &mut StderrTail) {
    tail.record(line);

    if verbose {
        match pb {
            Some(pb) => pb.println(line),
            None => eprintln!("{line}"),
        }
    }

    if let Some(pb) = pb {
        if let Some(progress) = parse_ffmpeg_progress(line) {
            pb.set_position((progress * 1000.0) as u64);
            if let Some(speed) = parse_ffmpeg_speed(line) {
                pb.set_message(speed);
            }
        }
    }
}

fn parse_ffmpeg_progress(line: &str) -> Option<f64> {
    let time_start = line.find("time=")?;
    let time_str = &line[time_start + 5..];
    let time_val = time_str.split_whitespace().next()?;
    parse_time_to_seconds(time_val)
}

fn parse_time_to_seconds(time_str: &str) -> Option<f64> {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours: f64 = parts[0].parse().ok()?;
    let minutes: f64 = parts[1].parse().ok()?;
    let seconds: f64 = parts[2].parse().ok()?;

    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

fn parse_ffmpeg_speed(line: &str) -> Option<String> {
    let speed_start = line.find("speed=")?;
    let speed_str = line[speed_start + 6..].trim_start();
    let speed_end = speed_str.find('x')?;
    Some(speed_str[..=speed_end].to_string())
}
