#![cfg(unix)]

mod common;

use common::{failing_separator, fake_separator, last_args, sorted, write_wav};
use std::fs;
use stem_splitter_server::{
    JobLayout, SeparationMode, SeparationOutcome, SeparationRequest, Separator,
};
use tempfile::tempdir;

fn request(mode: SeparationMode) -> SeparationRequest {
    SeparationRequest {
        mode,
        ..SeparationRequest::default()
    }
}

#[tokio::test]
async fn full_mode_writes_every_stem_under_model_and_job() {
    let tmp = tempdir().unwrap();
    let out = tmp.path().join("separated");
    let input = tmp.path().join("song.mp3");
    fs::write(&input, b"not really mp3").unwrap();

    let sep = Separator::new(fake_separator(tmp.path()), &out);
    let outcome = sep.separate(&input, &request(SeparationMode::Full)).await.unwrap();
    assert_eq!(outcome, SeparationOutcome::Completed);

    let layout = JobLayout::new(tmp.path(), &out, "htdemucs");
    assert_eq!(
        sorted(layout.list_artifacts("song").unwrap()),
        vec!["bass.mp3", "drums.mp3", "other.mp3", "vocals.mp3"]
    );

    let args = last_args(&out);
    assert_eq!(&args[..4], &["-o", out.to_str().unwrap(), "-n", "htdemucs"]);
    assert!(args.contains(&"--mp3".to_string()));
    assert!(args.contains(&"--mp3-bitrate=256".to_string()));
    assert!(!args.iter().any(|a| a.starts_with("--two-stems")));
    assert_eq!(args.last().unwrap(), input.to_str().unwrap());
}

#[tokio::test]
async fn vocals_mode_adds_two_stem_flag_and_keys_by_stem() {
    let tmp = tempdir().unwrap();
    let out = tmp.path().join("separated");
    let input = write_wav(&tmp.path().join("track.wav"));

    let sep = Separator::new(fake_separator(tmp.path()), &out);
    let outcome = sep.separate(&input, &request(SeparationMode::Vocals)).await.unwrap();
    assert!(outcome.succeeded());

    assert!(last_args(&out).contains(&"--two-stems=vocals".to_string()));
    let layout = JobLayout::new(tmp.path(), &out, "htdemucs");
    assert_eq!(
        sorted(layout.list_artifacts("track").unwrap()),
        vec!["no_vocals.mp3", "vocals.mp3"]
    );
}

#[tokio::test]
async fn directory_input_passes_every_audio_file() {
    let tmp = tempdir().unwrap();
    let inbox = tmp.path().join("inbox");
    fs::create_dir_all(&inbox).unwrap();
    fs::write(inbox.join("one.MP3"), b"x").unwrap();
    fs::write(inbox.join("two.ogg"), b"x").unwrap();
    fs::write(inbox.join("readme.txt"), b"x").unwrap();
    let out = tmp.path().join("separated");

    let sep = Separator::new(fake_separator(tmp.path()), &out);
    let outcome = sep.separate(&inbox, &request(SeparationMode::Full)).await.unwrap();
    assert!(outcome.succeeded());

    let args = last_args(&out);
    let inputs: Vec<&String> = args.iter().filter(|a| a.starts_with(inbox.to_str().unwrap())).collect();
    assert_eq!(inputs.len(), 2);
    assert!(out.join("htdemucs/one").is_dir());
    assert!(out.join("htdemucs/two").is_dir());
    assert!(!out.join("htdemucs/readme").exists());
}

#[tokio::test]
async fn empty_input_short_circuits_without_spawning() {
    let tmp = tempdir().unwrap();
    let inbox = tmp.path().join("inbox");
    fs::create_dir_all(&inbox).unwrap();
    fs::write(inbox.join("cover.png"), b"x").unwrap();

    // Spawning this would fail, so reaching NoValidInput proves nothing ran.
    let sep = Separator::new(vec!["no-such-separator-binary".into()], tmp.path().join("out"));
    let outcome = sep.separate(&inbox, &request(SeparationMode::Full)).await.unwrap();

    assert_eq!(outcome, SeparationOutcome::NoValidInput);
    assert_eq!(outcome.diagnostic(), "No valid audio files found");
}

#[tokio::test]
async fn failing_tool_reports_failure_and_keeps_partial_output() {
    let tmp = tempdir().unwrap();
    let out = tmp.path().join("separated");
    let input = tmp.path().join("song.wav");
    fs::write(&input, b"x").unwrap();

    let sep = Separator::new(failing_separator(tmp.path(), 2), &out);
    let outcome = sep.separate(&input, &request(SeparationMode::Full)).await.unwrap();

    assert_eq!(outcome, SeparationOutcome::Failed { exit_code: Some(2) });
    assert_eq!(outcome.diagnostic(), "Command failed, something went wrong.");
    assert!(out.join("htdemucs/song/vocals.mp3").is_file());
}

#[test]
fn command_for_uses_absolute_paths() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("song.mp3");
    fs::write(&input, b"x").unwrap();

    let sep = Separator::new(vec!["demucs".into()], "relative-out");
    let argv = sep
        .command_for(&input, &request(SeparationMode::Full))
        .unwrap()
        .unwrap();

    assert_eq!(argv[0], "demucs");
    assert_eq!(argv[1], "-o");
    assert!(std::path::Path::new(&argv[2]).is_absolute());
    assert!(argv[2].ends_with("relative-out"));
}
