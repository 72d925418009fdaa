#![allow(dead_code)]

use std::{
    f32::consts::PI,
    fs,
    path::{Path, PathBuf},
};

/// Stand-in for the separation tool. Understands `-o`, `-n` and
/// `--two-stems=`, writes one small `.mp3` per stem into
/// `<out>/<model>/<job>/` and records its argv in `<out>/last_args.txt`.
const FAKE_SEPARATOR: &str = r#"#!/bin/sh
args_log=""
for a in "$@"; do
  args_log="$args_log$a
"
done
out=""
model=""
stems="vocals drums bass other"
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    -n) model="$2"; shift 2 ;;
    --two-stems=*) t="${1#--two-stems=}"; stems="$t no_$t"; shift ;;
    --*) shift ;;
    *)
      name=$(basename "$1")
      job="${name%.*}"
      mkdir -p "$out/$model/$job"
      for s in $stems; do
        printf 'stem %s of %s\n' "$s" "$name" > "$out/$model/$job/$s.mp3"
      done
      echo "separated $name"
      echo "progress for $name" >&2
      shift ;;
  esac
done
printf '%s' "$args_log" > "$out/last_args.txt"
exit "${FAKE_EXIT:-0}"
"#;

pub fn fake_separator(dir: &Path) -> Vec<String> {
    let script = dir.join("fake_demucs.sh");
    fs::write(&script, FAKE_SEPARATOR).unwrap();
    vec!["sh".into(), script.to_string_lossy().into_owned()]
}

/// Same tool, but it exits with `code` after writing whatever it wrote.
pub fn failing_separator(dir: &Path, code: i32) -> Vec<String> {
    let script = dir.join("failing_demucs.sh");
    let body = FAKE_SEPARATOR.replace("${FAKE_EXIT:-0}", &code.to_string());
    fs::write(&script, body).unwrap();
    vec!["sh".into(), script.to_string_lossy().into_owned()]
}

pub fn last_args(output_root: &Path) -> Vec<String> {
    fs::read_to_string(output_root.join("last_args.txt"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Short 440 Hz stereo tone.
pub fn write_wav(path: &Path) -> PathBuf {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..4410 {
        let t = i as f32 / 44_100.0;
        let s = ((2.0 * PI * 440.0 * t).sin() * 0.2 * i16::MAX as f32) as i16;
        writer.write_sample(s).unwrap();
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
    path.to_path_buf()
}

pub fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}
