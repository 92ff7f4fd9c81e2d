mod common;
mod utils;

use anyhow::Result;
use common::TestEnvironment;

#[test]
fn test_script_file_and_prompt_conflict() -> Result<()> {
    let env = TestEnvironment::new()?;
    let script = env.write_file("script.txt", "Bonjour")?;

    let output = utils::run_reelgen_command(
        &env,
        &[
            "generate",
            "-o",
            "final.mp4",
            "--script-file",
            script.to_str().unwrap(),
            "--prompt",
            "volcanoes",
        ],
    )?;

    assert_eq!(output.exit_code, 2, "stderr: {}", output.stderr);
    assert!(!env.path().join("final.mp4").exists());
    Ok(())
}

#[test]
fn test_missing_script_input_is_a_usage_error() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = utils::run_reelgen_command(&env, &["generate", "-o", "final.mp4"])?;

    assert_eq!(output.exit_code, 2, "stderr: {}", output.stderr);
    Ok(())
}

#[test]
fn test_empty_video_folder_fails_cleanly() -> Result<()> {
    let env = TestEnvironment::new()?;
    let script = env.write_file("script.txt", "Bonjour tout le monde")?;
    let videos = env.videos_dir();
    let work = env.work_dir();

    let output = utils::run_reelgen_command(
        &env,
        &[
            "generate",
            "-o",
            "final.mp4",
            "--script-file",
            script.to_str().unwrap(),
            "--videos",
            videos.to_str().unwrap(),
            "--work-dir",
            work.to_str().unwrap(),
            "--no-color",
        ],
    )?;

    assert_eq!(output.exit_code, 1, "stdout: {}", output.stdout);
    assert!(
        output.stderr.contains("No source video found in"),
        "stderr: {}",
        output.stderr
    );
    assert!(!env.path().join("final.mp4").exists());
    assert!(!work.exists());
    assert!(env.config_path().exists());
    Ok(())
}

#[test]
fn test_json_errors_are_machine_readable() -> Result<()> {
    let env = TestEnvironment::new()?;
    let script = env.write_file("script.txt", "Bonjour")?;
    let videos = env.videos_dir();

    let output = utils::run_reelgen_command(
        &env,
        &[
            "--output-format",
            "json",
            "generate",
            "-o",
            "final.mp4",
            "--script-file",
            script.to_str().unwrap(),
            "--videos",
            videos.to_str().unwrap(),
        ],
    )?;

    assert_eq!(output.exit_code, 1);
    let error_line = output
        .stderr
        .lines()
        .find(|line| line.contains("\"reel.error\""))
        .expect("an error event on stderr");
    let event: serde_json::Value = serde_json::from_str(error_line)?;
    assert_eq!(event["level"], "error");
    assert!(event["message"].as_str().unwrap().contains("No source video"));
    Ok(())
}

#[test]
fn test_missing_audio_for_subtitles() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = utils::run_reelgen_command(
        &env,
        &["subtitles", "missing.mp3", "-o", "sub.srt", "--no-color"],
    )?;

    assert_eq!(output.exit_code, 1);
    assert!(output.stderr.contains("missing.mp3"), "stderr: {}", output.stderr);
    assert!(!env.path().join("sub.srt").exists());
    Ok(())
}
