use predicates::prelude::*;

mod test_env;
use test_env::*;

fn json_of(temp_dir: &tempfile::TempDir, args: &[&str]) -> serde_json::Value {
    let stdout = stdout_of(crm_cmd(temp_dir).args(args));
    serde_json::from_str(&stdout).unwrap()
}

#[test]
fn test_supplier_lifecycle() {
    let (temp_dir, _guard) = setup_logged_in();

    crm_cmd(&temp_dir)
        .args([
            "suppliers", "add", "Питомник Зелёный мир",
            "--entity-type", "ООО",
            "--location", "Московская обл.",
            "--category", "Саженцы",
            "--category", "Газон",
            "--tag", "надёжный",
            "--phone", "+7 495 111-22-33:landline",
            "--phone", "+7 900 555-44-33:mobile:whatsapp",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created supplier 1: Питомник Зелёный мир"));

    let value = json_of(&temp_dir, &["suppliers", "show", "1", "--json"]);
    let supplier = &value["supplier"];
    assert_eq!(supplier["status"], "active");
    assert_eq!(supplier["categories"], serde_json::json!(["Саженцы", "Газон"]));
    assert_eq!(supplier["tags"][0]["name"], "надёжный");
    assert_eq!(supplier["phones"].as_array().unwrap().len(), 2);
    assert_eq!(supplier["phones"][1]["messenger"], "whatsapp");
    assert_eq!(supplier["orders_count"], 0);
    assert!(supplier["rating"].is_null());

    crm_cmd(&temp_dir)
        .args(["suppliers", "status", "1", "on-hold"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Supplier 1 is now Приостановлен"));

    crm_cmd(&temp_dir)
        .args(["suppliers", "status", "1", "closed"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid status 'closed'"));
}

#[test]
fn test_supplier_orders_and_ratings() {
    let (temp_dir, _guard) = setup_logged_in();
    crm_cmd(&temp_dir)
        .args(["suppliers", "add", "Камень-Строй", "--entity-type", "ИП"])
        .assert()
        .success();

    crm_cmd(&temp_dir)
        .args(["suppliers", "order", "1", "Гранитная крошка", "--amount", "45 000,50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created order 1 for supplier 1"));
    crm_cmd(&temp_dir)
        .args(["suppliers", "order", "1", "Бордюр"])
        .assert()
        .success();

    crm_cmd(&temp_dir)
        .args(["suppliers", "order-status", "1", "completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Order 1 is now completed"));

    crm_cmd(&temp_dir)
        .args(["suppliers", "rate", "1", "5", "--order", "1", "--comment", "Привезли вовремя"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rated supplier 1 with 5 stars (average 5.0)"));
    crm_cmd(&temp_dir)
        .args(["suppliers", "rate", "1", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(average 4.5)"));

    let value = json_of(&temp_dir, &["suppliers", "show", "1", "--json"]);
    // Only completed orders count
    assert_eq!(value["supplier"]["orders_count"], 1);
    assert_eq!(value["supplier"]["rating"], 4.5);
    assert_eq!(value["orders"].as_array().unwrap().len(), 2);
    assert_eq!(value["ratings"].as_array().unwrap().len(), 2);
    assert_eq!(value["ratings"][0]["author_name"], "Анна Петрова");

    crm_cmd(&temp_dir)
        .args(["suppliers", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Supplier 1: Камень-Строй (ИП)"))
        .stdout(predicate::str::contains("Orders (2)"))
        .stdout(predicate::str::contains("Reviews (2)"))
        .stdout(predicate::str::contains("Привезли вовремя"));
}

#[test]
fn test_supplier_rating_validation() {
    let (temp_dir, _guard) = setup_logged_in();
    crm_cmd(&temp_dir)
        .args(["suppliers", "add", "Агро", "--entity-type", "ООО"])
        .assert()
        .success();

    crm_cmd(&temp_dir)
        .args(["suppliers", "rate", "1", "6"])
        .assert()
        .failure()
        .code(1);

    crm_cmd(&temp_dir)
        .args(["suppliers", "rate", "1", "3", "--order", "99"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));

    crm_cmd(&temp_dir)
        .args(["suppliers", "rate", "5", "3"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_supplier_search_and_order() {
    let (temp_dir, _guard) = setup_logged_in();
    crm_cmd(&temp_dir)
        .args(["suppliers", "add", "Декор-Сад", "--entity-type", "ООО", "--category", "Удобрения"])
        .assert()
        .success();
    crm_cmd(&temp_dir)
        .args(["suppliers", "add", "ТрубаПласт", "--entity-type", "ООО", "--location", "Химки"])
        .assert()
        .success();
    crm_cmd(&temp_dir).args(["suppliers", "status", "2", "inactive"]).assert().success();

    let list = json_of(&temp_dir, &["suppliers", "list", "--json"]);
    assert_eq!(list[0]["name"], "Декор-Сад");
    assert_eq!(list[1]["name"], "ТрубаПласт");

    let stdout = stdout_of(crm_cmd(&temp_dir).args(["suppliers", "list", "-s", "удобрения"]));
    assert!(stdout.contains("Декор-Сад"));
    assert!(!stdout.contains("ТрубаПласт"));

    let stdout = stdout_of(crm_cmd(&temp_dir).args(["suppliers", "list", "-s", "химки"]));
    assert!(stdout.contains("ТрубаПласт"));
}

#[test]
fn test_contractor_lifecycle() {
    let (temp_dir, _guard) = setup_logged_in();

    crm_cmd(&temp_dir)
        .args([
            "contractors", "add", "БригадаПлюс",
            "--experience", "7",
            "--specialization", "Мощение",
            "--specialization", "Дренаж",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created contractor 1: БригадаПлюс"));

    let value = json_of(&temp_dir, &["contractors", "show", "1", "--json"]);
    assert_eq!(value["contractor"]["verified"], false);
    assert_eq!(value["contractor"]["experience_years"], 7);

    crm_cmd(&temp_dir)
        .args(["contractors", "verify", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contractor 1 verified"));

    crm_cmd(&temp_dir)
        .args(["contractors", "project", "1", "Дорожки в Жуковке", "--start", "2026-05-01", "--end", "2026-05-20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project 1 for contractor 1"));
    crm_cmd(&temp_dir)
        .args(["contractors", "project-status", "1", "completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project 1 is now completed"));
    crm_cmd(&temp_dir)
        .args(["contractors", "rate", "1", "4", "--project", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rated contractor 1 with 4 stars (average 4.0)"));

    let value = json_of(&temp_dir, &["contractors", "show", "1", "--json"]);
    assert_eq!(value["contractor"]["verified"], true);
    assert_eq!(value["contractor"]["completed_projects"], 1);
    assert_eq!(value["contractor"]["rating"], 4.0);
    assert_eq!(value["projects"][0]["start_date"], "2026-05-01");

    crm_cmd(&temp_dir)
        .args(["contractors", "verify", "1", "--revoke"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contractor 1 is no longer verified"));
}

#[test]
fn test_contractor_project_dates_validated() {
    let (temp_dir, _guard) = setup_logged_in();
    crm_cmd(&temp_dir).args(["contractors", "add", "Ландшафт-Про"]).assert().success();

    crm_cmd(&temp_dir)
        .args(["contractors", "project", "1", "Газон", "--start", "2026-06-10", "--end", "2026-06-01"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("is before start date"));

    crm_cmd(&temp_dir)
        .args(["contractors", "add", "  "])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_verified_contractors_listed_first() {
    let (temp_dir, _guard) = setup_logged_in();
    crm_cmd(&temp_dir).args(["contractors", "add", "Первые"]).assert().success();
    crm_cmd(&temp_dir).args(["contractors", "add", "Вторые"]).assert().success();
    crm_cmd(&temp_dir).args(["contractors", "verify", "1"]).assert().success();

    let list = json_of(&temp_dir, &["contractors", "list", "--json"]);
    assert_eq!(list[0]["company_name"], "Первые");
    assert_eq!(list[0]["verified"], true);
    assert_eq!(list[1]["company_name"], "Вторые");
}
