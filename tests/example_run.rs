//! Integration tests for the `example run` command.
use prodplan::cli::RunOpts;
use prodplan::cli::example::handle_example_run_command;
use prodplan::settings::Settings;
use std::fs;
use tempfile::tempdir;

/// An integration test for the `example run` command.
///
/// Runs with debug output enabled, so all output files should be written.
#[test]
fn test_handle_example_run_command() {
    unsafe { std::env::set_var("PRODPLAN_LOG_LEVEL", "off") };

    let dir = tempdir().unwrap();
    let output_dir = dir.path().join("quotas");
    let opts = RunOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: false,
        debug_model: true,
    };
    handle_example_run_command("quotas", &opts, Some(Settings::default())).unwrap();

    for file_name in [
        "capacity_schedule.csv",
        "results.csv",
        "debug_investments.csv",
        "debug_slack.csv",
        "prodplan_info.log",
        "prodplan_error.log",
    ] {
        assert!(
            output_dir.join(file_name).is_file(),
            "Missing output file: {file_name}"
        );
    }

    // Only the three active investments are included
    let investments = fs::read_to_string(output_dir.join("debug_investments.csv")).unwrap();
    assert_eq!(investments.lines().count(), 4);
}
