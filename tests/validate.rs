//! Integration tests for the `validate` command.
use prodplan::cli::handle_validate_command;
use prodplan::cli::example::extract_example;
use prodplan::log::is_logger_initialised;
use prodplan::settings::Settings;
use tempfile::tempdir;

/// An integration test for the `validate` command.
///
/// We also check that the logger is initialised after it is run.
#[test]
fn test_handle_validate_command() {
    unsafe { std::env::set_var("PRODPLAN_LOG_LEVEL", "off") };

    assert!(!is_logger_initialised());

    let dir = tempdir().unwrap();
    for name in ["simple", "quotas"] {
        let model_dir = dir.path().join(name);
        extract_example(name, &model_dir).unwrap();

        // The logger can only be set up once per process
        if is_logger_initialised() {
            prodplan::input::load_model(&model_dir).unwrap();
        } else {
            handle_validate_command(&model_dir, Some(Settings::default())).unwrap();
        }
    }

    assert!(is_logger_initialised());
}
