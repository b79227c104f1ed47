#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::sync::{Mutex, MutexGuard, OnceLock};
use tempfile::TempDir;

pub const EMAIL: &str = "anna@park.ru";
pub const PASSWORD: &str = "secret1";

pub fn lock_test_env() -> MutexGuard<'static, ()> {
    static TEST_ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    TEST_ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner())
}

/// Fresh HOME with an rc file pointing the database into the temp dir
pub fn setup_test_env() -> (TempDir, MutexGuard<'static, ()>) {
    let guard = lock_test_env();
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let config_dir = temp_dir.path().join(".parkcrm");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("rc"), format!("data.location={}\n", db_path.display())).unwrap();
    (temp_dir, guard)
}

pub fn crm_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("parkcrm").unwrap();
    cmd.env("HOME", temp_dir.path());
    cmd.env_remove("PARKCRM_LOG");
    cmd
}

/// Sign up the default user and log in
pub fn login(temp_dir: &TempDir) {
    crm_cmd(temp_dir)
        .args(["auth", "signup", "--email", EMAIL, "--password", PASSWORD, "--name", "Анна Петрова"])
        .assert()
        .success();
    crm_cmd(temp_dir)
        .args(["auth", "login", "--email", EMAIL, "--password", PASSWORD])
        .assert()
        .success();
}

/// Environment with a logged-in user, ready for data commands
pub fn setup_logged_in() -> (TempDir, MutexGuard<'static, ()>) {
    let (temp_dir, guard) = setup_test_env();
    login(&temp_dir);
    (temp_dir, guard)
}

pub fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success();
    String::from_utf8(output.get_output().stdout.clone()).unwrap()
}
