use predicates::prelude::*;

mod test_env;
use test_env::*;

fn dashboard_json(temp_dir: &tempfile::TempDir) -> serde_json::Value {
    let stdout = stdout_of(crm_cmd(temp_dir).args(["dashboard", "--json"]));
    serde_json::from_str(&stdout).unwrap()
}

#[test]
fn test_empty_dashboard() {
    let (temp_dir, _guard) = setup_logged_in();

    crm_cmd(&temp_dir)
        .args(["dashboard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dashboard"))
        .stdout(predicate::str::contains("No clients yet."))
        .stdout(predicate::str::contains("Nothing due today."));

    let value = dashboard_json(&temp_dir);
    assert_eq!(value["total_clients"], 0);
    assert_eq!(value["approved_total"], 0.0);
}

#[test]
fn test_dashboard_totals() {
    let (temp_dir, _guard) = setup_logged_in();
    for name in ["Алексеев", "Борисов", "Васильев", "Григорьев", "Дмитриев"] {
        crm_cmd(&temp_dir).args(["clients", "add", name]).assert().success();
    }
    crm_cmd(&temp_dir)
        .args(["estimates", "add", "Газон", "--item", "Газон;100;м²;300"])
        .assert()
        .success();
    crm_cmd(&temp_dir)
        .args(["estimates", "add", "Полив", "--item", "Система;1;компл;120000"])
        .assert()
        .success();
    crm_cmd(&temp_dir).args(["estimates", "add", "Черновик"]).assert().success();
    crm_cmd(&temp_dir).args(["estimates", "modify", "1", "--status", "approved"]).assert().success();
    crm_cmd(&temp_dir).args(["estimates", "modify", "2", "--status", "approved"]).assert().success();
    crm_cmd(&temp_dir).args(["estimates", "add", "Мощение"]).assert().success();
    crm_cmd(&temp_dir).args(["estimates", "modify", "4", "--status", "sent"]).assert().success();

    let value = dashboard_json(&temp_dir);
    assert_eq!(value["total_clients"], 5);
    assert_eq!(value["open_estimates"], 2);
    assert_eq!(value["proposals_sent"], 1);
    assert_eq!(value["approved_estimates"], 2);
    assert_eq!(value["approved_total"], 150000.0);

    // Four most recent clients, newest first
    let recent = value["recent_clients"].as_array().unwrap();
    assert_eq!(recent.len(), 4);
    assert_eq!(recent[0]["client"]["name"], "Дмитриев");
    assert_eq!(recent[0]["pipeline"]["status"], "new");

    crm_cmd(&temp_dir)
        .args(["dashboard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("150 000,00 ₽"))
        .stdout(predicate::str::contains("Proposals sent:      1"))
        .stdout(predicate::str::contains("Алексеев").not());
}

#[test]
fn test_dashboard_tasks_due_today() {
    let (temp_dir, _guard) = setup_logged_in();

    crm_cmd(&temp_dir).args(["tasks", "add", "Низкая", "--due", "today", "--priority", "low"]).assert().success();
    crm_cmd(&temp_dir).args(["tasks", "add", "Высокая", "--due", "today", "--priority", "high"]).assert().success();
    crm_cmd(&temp_dir).args(["tasks", "add", "Средняя", "--due", "today"]).assert().success();
    crm_cmd(&temp_dir).args(["tasks", "add", "Ещё одна", "--due", "today"]).assert().success();
    crm_cmd(&temp_dir).args(["tasks", "add", "Завтра", "--due", "tomorrow", "--priority", "high"]).assert().success();
    crm_cmd(&temp_dir).args(["tasks", "add", "Готово", "--due", "today", "--priority", "high"]).assert().success();
    crm_cmd(&temp_dir).args(["tasks", "move", "6", "completed"]).assert().success();

    let value = dashboard_json(&temp_dir);
    let titles: Vec<&str> = value["today_tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Высокая", "Средняя", "Ещё одна"]);
}
