use kormat_admin_gate::{AppConfig, GateError, config::Env};
use serial_test::serial;
use std::{env, panic, path::PathBuf};

// --- Setup/Teardown Utilities ---

const CONFIG_VARS: &[&str] = &["APP_ENV", "BIND_ADDR", "SESSION_FILE"];

/// Runs a test with the given variables set (and every other config variable cleared),
/// restoring the original environment afterwards.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(key, val);
            } else {
                env::remove_var(key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = run_with_env(&[("APP_ENV", "production")], AppConfig::load);

    assert!(
        matches!(result, Err(GateError::MissingConfig("SESSION_FILE"))),
        "Production config loading should fail without a session file"
    );
}

#[test]
#[serial]
fn test_app_config_production_with_session_file() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("SESSION_FILE", "/var/lib/gate/sessions.json"),
        ],
        AppConfig::load,
    )
    .expect("production config should load");

    assert_eq!(config.env, Env::Production);
    assert_eq!(
        config.session_file,
        Some(PathBuf::from("/var/lib/gate/sessions.json"))
    );
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(&[("APP_ENV", "local")], AppConfig::load)
        .expect("local config should load");

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.bind_addr.to_string(), "0.0.0.0:3000");
    assert!(config.session_file.is_none());
}

#[test]
#[serial]
fn test_app_config_rejects_bad_bind_addr() {
    let result = run_with_env(&[("BIND_ADDR", "not-an-address")], AppConfig::load);

    assert!(matches!(
        result,
        Err(GateError::InvalidConfig { key: "BIND_ADDR", .. })
    ));
}
