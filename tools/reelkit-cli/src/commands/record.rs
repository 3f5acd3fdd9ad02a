//! Run a recording session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reelkit_common::config::{AudioSource, RecordingConfiguration};
use reelkit_recorder::simulated::SimulatedEncoderFactory;
use reelkit_recorder::ScreenRecorder;
use reelkit_sources::simulated::SimulatedProvider;

pub async fn run(
    audio: String,
    webcam: bool,
    duration: Option<u64>,
    pause_after: Option<u64>,
    pause_for: Option<u64>,
    output: PathBuf,
) -> anyhow::Result<()> {
    let audio_source = match audio.as_str() {
        "none" => AudioSource::None,
        "microphone" => AudioSource::Microphone,
        "system" => AudioSource::System,
        "both" => AudioSource::Both,
        other => {
            println!("Unknown audio source '{other}', using system");
            AudioSource::System
        }
    };

    println!("Starting recording session");
    println!("  Audio: {audio_source:?}");
    println!("  Webcam: {webcam}");
    println!("  Output: {}", output.display());
    println!();

    let config = RecordingConfiguration {
        audio_source,
        use_webcam: webcam,
    };

    let provider = SimulatedProvider::new();
    let recorder = ScreenRecorder::new(
        Box::new(provider),
        Arc::new(SimulatedEncoderFactory::new()),
    );

    let warnings = recorder.start(config).await?;
    for warning in &warnings {
        println!("[WARN] {:?} unavailable: {}", warning.role, warning.message);
    }

    match duration {
        Some(secs) => {
            if let (Some(at), Some(hold)) = (pause_after, pause_for) {
                let at = at.min(secs);
                tokio::time::sleep(Duration::from_secs(at)).await;
                recorder.pause()?;
                println!("Paused for {hold}s...");
                tokio::time::sleep(Duration::from_secs(hold)).await;
                recorder.resume()?;
                tokio::time::sleep(Duration::from_secs(secs - at)).await;
            } else {
                tokio::time::sleep(Duration::from_secs(secs)).await;
            }
        }
        None => {
            println!("Press Ctrl+C to stop recording...");
            tokio::signal::ctrl_c().await?;
            println!();
        }
    }

    let artifact = recorder.stop()?;
    std::fs::write(&output, &artifact.payload)?;
    println!(
        "Recording saved to: {} ({} bytes, {}s, {})",
        output.display(),
        artifact.payload.len(),
        artifact.duration_seconds,
        artifact.mime_type
    );

    Ok(())
}
