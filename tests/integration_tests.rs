use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

// Helper function to create a temporary instance file
fn create_instance_file(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("instance.txt");
    fs::write(&file_path, content).expect("Failed to write instance file");
    (temp_dir, file_path)
}

// Helper function to run the golfer binary
fn run_golfer(args: &[&OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_golfer"))
        .args(args)
        .output()
        .expect("Failed to run golfer")
}

/// Non-empty lines after the objective, split into golfer indices
fn group_lines(solution: &str) -> Vec<Vec<usize>> {
    solution
        .lines()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            l.split_whitespace()
                .map(|t| t.parse().expect("golfer index"))
                .collect()
        })
        .collect()
}

mod cli_tests {
    use super::*;

    #[test]
    fn test_missing_input_prints_usage() {
        let temp_dir = TempDir::new().unwrap();
        let output = Command::new(env!("CARGO_BIN_EXE_golfer"))
            .current_dir(temp_dir.path())
            .output()
            .expect("Failed to run golfer");

        assert_eq!(output.status.code(), Some(1));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Usage:"), "stdout: {}", stdout);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_malformed_instance_fails() {
        let (temp_dir, input) = create_instance_file("3 2");
        let solution = temp_dir.path().join("solution.txt");

        let output = run_golfer(&[input.as_os_str(), solution.as_os_str()]);

        assert!(!output.status.success());
        assert!(!solution.exists());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("malformed instance"), "stderr: {}", stderr);
    }

    #[test]
    fn test_missing_instance_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let output = run_golfer(&[temp_dir.path().join("nope.txt").as_os_str()]);
        assert!(!output.status.success());
    }
}

#[cfg(feature = "coin_cbc")]
mod solve_tests {
    use super::*;

    #[test]
    fn test_3_2_2_solution_file() {
        let (temp_dir, input) = create_instance_file("3 2 2\n");
        let solution = temp_dir.path().join("solution.txt");

        let output = run_golfer(&[input.as_os_str(), solution.as_os_str(), OsStr::new("10")]);
        assert!(
            output.status.success(),
            "Command should succeed. stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let content = fs::read_to_string(&solution).expect("solution written");
        let objective: u64 = content
            .lines()
            .next()
            .expect("objective line")
            .trim()
            .parse()
            .expect("objective is a non-negative integer");
        assert_eq!(objective, 0);

        let groups = group_lines(&content);
        assert_eq!(groups.len(), 6);
        for (week, week_groups) in groups.chunks(3).enumerate() {
            let mut seen = HashSet::new();
            for members in week_groups {
                assert_eq!(members.len(), 2);
                for &golfer in members {
                    assert!(golfer <= 5);
                    assert!(seen.insert(golfer), "golfer {golfer} twice in week {week}");
                }
            }
        }

        // every group line is followed by a blank line
        let body: Vec<&str> = content.lines().skip(1).collect();
        assert_eq!(body.len(), 12);
        assert!(body.iter().skip(1).step_by(2).all(|l| l.is_empty()));
    }

    #[test]
    fn test_2_2_2_is_perfect_and_checked() {
        let (temp_dir, input) = create_instance_file("2 2 2");
        let solution = temp_dir.path().join("solution.txt");

        let output = run_golfer(&[input.as_os_str(), solution.as_os_str()]);
        assert!(output.status.success());

        let content = fs::read_to_string(&solution).unwrap();
        assert_eq!(content.lines().next(), Some("0"));

        let check = fs::read_to_string(temp_dir.path().join("solution.txt.check")).unwrap();
        assert_eq!(check, "valid\n");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("The solution is valid."), "stdout: {}", stdout);
    }

    #[test]
    fn test_forced_repeats_are_flagged_invalid() {
        let (temp_dir, input) = create_instance_file("2 2 4");
        let solution = temp_dir.path().join("solution.txt");

        let output = run_golfer(&[input.as_os_str(), solution.as_os_str()]);
        assert!(output.status.success());

        let content = fs::read_to_string(&solution).unwrap();
        assert_eq!(content.lines().next(), Some("2"));
        let check = fs::read_to_string(temp_dir.path().join("solution.txt.check")).unwrap();
        assert_eq!(check, "invalid\n");
    }

    #[test]
    fn test_without_output_file_nothing_is_written() {
        let (temp_dir, input) = create_instance_file("2 2 2");

        let output = run_golfer(&[input.as_os_str()]);
        assert!(output.status.success());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_report_and_solver_log() {
        let (temp_dir, input) = create_instance_file("2 2 3");
        let solution = temp_dir.path().join("solution.txt");
        let report = temp_dir.path().join("schedule.rpt");
        let log = temp_dir.path().join("solver.log");

        let output = Command::new(env!("CARGO_BIN_EXE_golfer"))
            .arg(&input)
            .arg(&solution)
            .arg("5")
            .arg("--report")
            .arg(&report)
            .arg("--solver-log")
            .arg(&log)
            .output()
            .expect("Failed to run golfer");
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let rpt = fs::read_to_string(&report).expect("report written");
        assert!(rpt.contains("Redundant meetings: 0"));
        assert!(rpt.contains("Week 2:"));
        assert!(rpt.contains("Repeated pairs: 0"));
        assert!(log.exists());
    }
}
