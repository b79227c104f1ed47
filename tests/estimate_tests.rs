use predicates::prelude::*;

mod test_env;
use test_env::*;

fn estimate_json(temp_dir: &tempfile::TempDir, id: &str) -> serde_json::Value {
    let stdout = stdout_of(crm_cmd(temp_dir).args(["estimates", "show", id, "--json"]));
    serde_json::from_str(&stdout).unwrap()
}

#[test]
fn test_create_estimate_with_items() {
    let (temp_dir, _guard) = setup_logged_in();
    crm_cmd(&temp_dir).args(["clients", "add", "Фролов"]).assert().success();

    crm_cmd(&temp_dir)
        .args([
            "estimates", "add", "Газон на участке",
            "--client", "1",
            "--valid-until", "31.12.2026",
            "--item", "Рулонный газон;100;м²;350",
            "--item", "Укладка;100;м²;150",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created estimate 1: Газон на участке (50 000,00 ₽)"));

    let estimate = estimate_json(&temp_dir, "1");
    assert_eq!(estimate["status"], "draft");
    assert_eq!(estimate["client_name"], "Фролов");
    assert_eq!(estimate["valid_until"], "2026-12-31");
    assert_eq!(estimate["total"], 50000.0);
    let items = estimate["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Рулонный газон");
    assert_eq!(items[1]["unit"], "м²");

    crm_cmd(&temp_dir)
        .args(["estimates", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimate 1: Газон на участке"))
        .stdout(predicate::str::contains("Total: 50 000,00 ₽"))
        .stdout(predicate::str::contains("31.12.2026"));
}

#[test]
fn test_estimate_validation() {
    let (temp_dir, _guard) = setup_logged_in();

    crm_cmd(&temp_dir)
        .args(["estimates", "add", "Смета", "--client", "9"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Client 9 not found"));

    crm_cmd(&temp_dir)
        .args(["estimates", "add", "Смета", "--item", "Песок;много;т;900"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid quantity"));

    crm_cmd(&temp_dir)
        .args(["estimates", "add", "Смета", "--valid-until", "someday"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid date"));

    crm_cmd(&temp_dir)
        .args(["estimates", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No estimates found."));
}

#[test]
fn test_modify_replaces_items_and_status() {
    let (temp_dir, _guard) = setup_logged_in();
    crm_cmd(&temp_dir).args(["clients", "add", "Лебедев"]).assert().success();
    crm_cmd(&temp_dir)
        .args(["estimates", "add", "Полив", "--client", "1", "--item", "Форсунка;10;шт;500"])
        .assert()
        .success();

    crm_cmd(&temp_dir)
        .args([
            "estimates", "modify", "1",
            "--status", "sent",
            "--item", "Форсунка;12;шт;500",
            "--item", "Контроллер;1;шт;9000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Modified estimate 1: Полив (15 000,00 ₽)"));

    let estimate = estimate_json(&temp_dir, "1");
    assert_eq!(estimate["status"], "sent");
    assert_eq!(estimate["items"].as_array().unwrap().len(), 2);
    assert_eq!(estimate["items"][1]["name"], "Контроллер");

    crm_cmd(&temp_dir)
        .args(["estimates", "modify", "1", "--no-client", "--clear-items"])
        .assert()
        .success();
    let estimate = estimate_json(&temp_dir, "1");
    assert!(estimate["client_id"].is_null());
    assert_eq!(estimate["items"].as_array().unwrap().len(), 0);
    assert_eq!(estimate["total"], 0.0);

    crm_cmd(&temp_dir)
        .args(["estimates", "modify", "1", "--status", "paid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid status 'paid'"));
}

#[test]
fn test_copy_makes_new_draft() {
    let (temp_dir, _guard) = setup_logged_in();
    crm_cmd(&temp_dir)
        .args(["estimates", "add", "Мощение", "--item", "Брусчатка;40;м²;1200"])
        .assert()
        .success();
    crm_cmd(&temp_dir)
        .args(["estimates", "modify", "1", "--status", "approved"])
        .assert()
        .success();

    crm_cmd(&temp_dir)
        .args(["estimates", "copy", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied estimate 1 to 2: Копия - Мощение"));

    let copy = estimate_json(&temp_dir, "2");
    assert_eq!(copy["status"], "draft");
    assert_eq!(copy["total"], 48000.0);
    assert_eq!(copy["items"][0]["name"], "Брусчатка");

    // The source is untouched
    let source = estimate_json(&temp_dir, "1");
    assert_eq!(source["status"], "approved");
}

#[test]
fn test_search_and_delete() {
    let (temp_dir, _guard) = setup_logged_in();
    crm_cmd(&temp_dir).args(["clients", "add", "Медведева"]).assert().success();
    crm_cmd(&temp_dir)
        .args(["estimates", "add", "Озеленение", "--client", "1"])
        .assert()
        .success();
    crm_cmd(&temp_dir).args(["estimates", "add", "Дренаж"]).assert().success();

    // Matches the client name, case-insensitively
    let stdout = stdout_of(crm_cmd(&temp_dir).args(["estimates", "list", "-s", "медведева"]));
    assert!(stdout.contains("Озеленение"));
    assert!(!stdout.contains("Дренаж"));

    crm_cmd(&temp_dir)
        .args(["estimates", "delete", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted estimate 2"));

    crm_cmd(&temp_dir)
        .args(["estimates", "show", "2"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Estimate 2 not found"));

    crm_cmd(&temp_dir)
        .args(["estimates", "delete", "2"])
        .assert()
        .failure()
        .code(1);
}
