//! Parallel batch processing.
//!
//! Fans a script out over a set of input files, one independent Blender
//! subprocess per file. Workers pull from a shared queue and report results
//! over a channel as they complete; there is no ordering guarantee, no
//! shared state between invocations, and no retry.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use tracing::{debug, warn};

use crate::blender::{BlenderInstallation, Invocation};
use crate::constants;
use crate::report::batch::{BatchRecord, BatchReport};

/// Collect files in `dir` whose names match `pattern`, sorted by name.
///
/// Sorting makes queue order deterministic; completion order still depends
/// on worker scheduling.
pub fn collect_files(dir: &Path, pattern: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if wildcard_match(pattern, name) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Match a file name against a `*`/`?` wildcard pattern.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    fn matches(pattern: &[char], name: &[char]) -> bool {
        match (pattern.first(), name.first()) {
            (None, None) => true,
            (Some('*'), _) => {
                // `*` either consumes nothing or one character and retries.
                matches(&pattern[1..], name)
                    || (!name.is_empty() && matches(pattern, &name[1..]))
            }
            (Some('?'), Some(_)) => matches(&pattern[1..], &name[1..]),
            (Some(p), Some(n)) if p == n => matches(&pattern[1..], &name[1..]),
            _ => false,
        }
    }
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    matches(&pattern, &name)
}

/// Substitute `{output}` and `{stem}` placeholders in per-file script args.
///
/// `{output}` expands to the input's file name inside `output_dir` and is
/// left untouched when no output directory was given.
pub fn substitute_placeholders(
    args: &[String],
    file: &Path,
    output_dir: Option<&Path>,
) -> Vec<String> {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let output = output_dir.map(|dir| {
        dir.join(file.file_name().unwrap_or_default())
            .to_string_lossy()
            .into_owned()
    });

    args.iter()
        .map(|arg| {
            let mut arg = arg.replace(constants::PLACEHOLDER_STEM, &stem);
            if let Some(output) = &output {
                arg = arg.replace(constants::PLACEHOLDER_OUTPUT, output);
            }
            arg
        })
        .collect()
}

/// Run `script` over every file with up to `jobs` parallel workers.
///
/// Per-file status lines are printed as completions arrive. The returned
/// report tallies successes and failures; a file whose subprocess could not
/// even be spawned is recorded as failed with the launch error in `stderr`.
pub fn run(
    installation: &BlenderInstallation,
    script: &Path,
    files: &[PathBuf],
    script_args: &[String],
    output_dir: Option<&Path>,
    pattern: &str,
    jobs: usize,
) -> BatchReport {
    let jobs = jobs.clamp(1, files.len().max(1));
    debug!(files = files.len(), jobs, "Starting batch run");

    let queue: Arc<Mutex<VecDeque<PathBuf>>> =
        Arc::new(Mutex::new(files.iter().cloned().collect()));
    let (tx, rx) = mpsc::channel::<BatchRecord>();

    let mut records = Vec::with_capacity(files.len());

    thread::scope(|scope| {
        for _ in 0..jobs {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            scope.spawn(move || {
                loop {
                    let Some(file) = queue.lock().expect("queue poisoned").pop_front() else {
                        break;
                    };
                    let record = process_file(installation, script, &file, script_args, output_dir);
                    if tx.send(record).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        // Fan-in: completion order, not submission order.
        while let Ok(record) = rx.recv() {
            let status = if record.success { "OK" } else { "FAILED" };
            println!("[{status}] {}", record.file.display());
            records.push(record);
        }
    });

    BatchReport::from_records(pattern, records)
}

/// Process one file to completion.
fn process_file(
    installation: &BlenderInstallation,
    script: &Path,
    file: &Path,
    script_args: &[String],
    output_dir: Option<&Path>,
) -> BatchRecord {
    let args = substitute_placeholders(script_args, file, output_dir);

    let invocation = Invocation::new()
        .blend_file(file)
        .python_script(script)
        .script_args(args);

    match invocation.run(installation) {
        Ok(output) => BatchRecord {
            file: file.to_path_buf(),
            exit_code: output.status,
            success: output.success(),
            duration_ms: output.duration.as_millis() as u64,
            stdout: output.stdout,
            stderr: output.stderr,
        },
        Err(err) => {
            warn!(file = %file.display(), error = %err, "Failed to launch subprocess");
            BatchRecord {
                file: file.to_path_buf(),
                exit_code: None,
                success: false,
                duration_ms: 0,
                stdout: String::new(),
                stderr: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blender::discovery::DiscoveryMethod;

    #[test]
    fn test_wildcard_match_star() {
        assert!(wildcard_match("*.blend", "scene.blend"));
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("scene_*.blend", "scene_001.blend"));
        assert!(!wildcard_match("*.blend", "scene.fbx"));
    }

    #[test]
    fn test_wildcard_match_question_mark() {
        assert!(wildcard_match("v?.blend", "v1.blend"));
        assert!(!wildcard_match("v?.blend", "v12.blend"));
    }

    #[test]
    fn test_wildcard_match_literal() {
        assert!(wildcard_match("scene.blend", "scene.blend"));
        assert!(!wildcard_match("scene.blend", "scene2.blend"));
    }

    #[test]
    fn test_collect_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.blend", "a.blend", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.blend")).unwrap();

        let files = collect_files(dir.path(), "*.blend").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.blend", "b.blend"]);
    }

    #[test]
    fn test_substitute_placeholders() {
        let args = vec![
            "--output".to_string(),
            "{output}".to_string(),
            "--name".to_string(),
            "{stem}_processed".to_string(),
        ];
        let out = substitute_placeholders(&args, Path::new("/in/scene.blend"), Some(Path::new("/out")));
        assert_eq!(out[1], "/out/scene.blend");
        assert_eq!(out[3], "scene_processed");
    }

    #[test]
    fn test_substitute_placeholders_without_output_dir() {
        let args = vec!["{output}".to_string(), "{stem}".to_string()];
        let out = substitute_placeholders(&args, Path::new("scene.blend"), None);
        assert_eq!(out[0], "{output}");
        assert_eq!(out[1], "scene");
    }

    #[test]
    fn test_run_counts_launch_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = Vec::new();
        for name in ["a.blend", "b.blend", "c.blend"] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"").unwrap();
            files.push(path);
        }

        let installation = BlenderInstallation {
            path: PathBuf::from("/nonexistent/blender"),
            method: DiscoveryMethod::CliFlag,
        };
        let report = run(
            &installation,
            Path::new("process.py"),
            &files,
            &[],
            None,
            "*.blend",
            2,
        );
        assert_eq!(report.total, 3);
        assert_eq!(report.failed, 3);
        assert_eq!(report.succeeded, 0);
        assert!(report.records.iter().all(|r| r.exit_code.is_none()));
    }
}
