//! # Headless Playback Demo
//!
//! Drives the playback controller end to end with the desktop bridge: a
//! generated WAV file is played through the headless engine while the
//! time-change stream prints the position clock.
//!
//! Run with: `cargo run --example playback_demo --package core-playback`
//!
//! Pass a file path to play that instead: `... -- /path/to/song.mp3`

use bridge_desktop::{HeadlessEngineFactory, TokioResourceResolver};
use core_playback::{AudioRequest, PlaybackController, PlayerEvent};
use core_runtime::config::{PlaybackSettings, PlayerConfig};
use core_runtime::logging::{init_logging, LoggingConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// 8 kHz mono 16-bit PCM silence.
fn write_demo_wav(millis: u32) -> std::io::Result<PathBuf> {
    let frames = 8 * millis;
    let data_len = frames * 2;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&8000u32.to_le_bytes());
    bytes.extend_from_slice(&16000u32.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 0);

    let path = std::env::temp_dir().join("playback-demo.wav");
    std::fs::write(&path, bytes)?;
    Ok(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default())?;

    let path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => write_demo_wav(3_000)?,
    };

    let config = PlayerConfig::builder()
        .engine_factory(Arc::new(HeadlessEngineFactory::new()))
        .resource_resolver(Arc::new(TokioResourceResolver::default()))
        .settings(PlaybackSettings {
            tick_interval_ms: 500,
            ..Default::default()
        })
        .build()?;
    let controller = PlaybackController::new(config);

    let mut events = controller.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                PlayerEvent::Status(status) => println!(
                    "[status] {:?} {}/{} ms",
                    status.state, status.position_ms, status.duration_ms
                ),
                other => println!("[event] {}: {:?}", other.description(), other),
            }
        }
    });

    let request = AudioRequest::file_path(path.to_string_lossy()).with_title("Demo tone");
    controller.play(request.clone()).await?;

    let mut ticks = controller.on_time_change().take(4);
    while let Some(status) = ticks.next().await {
        println!("[tick] {} ms", status.position_ms);
    }

    controller.pause(request.clone()).await?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    controller.play(request).await?;
    controller.seek_to(2_500);
    tokio::time::sleep(Duration::from_millis(800)).await;

    controller.destroy().await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
