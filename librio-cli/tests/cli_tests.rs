//! Integration tests for the Librio CLI

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A librio command writing to its own data directory with no simulated latency
fn librio(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("librio-cli").unwrap();
    cmd.arg("--data-dir")
        .arg(dir.path())
        .env("LIBRIO_LATENCY_MS", "0")
        .env_remove("LIBRIO_MAX_QUANTITY");
    cmd
}

/// Publish a book and return its id
fn publish(dir: &TempDir, title: &str, price: &str) -> String {
    let output = librio(dir)
        .args(["--json", "publish", "--title", title, "--author", "Autor", "--price", price])
        .output()
        .unwrap();
    assert!(output.status.success(), "publish failed: {:?}", output);

    let item: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    item["id"].as_str().unwrap().to_string()
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin("librio-cli").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("cart"))
        .stdout(predicate::str::contains("prefs"));
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("librio-cli").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("librio"));
}

#[test]
fn test_publish_help() {
    let mut cmd = Command::cargo_bin("librio-cli").unwrap();
    cmd.args(["publish", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Publish a book"))
        .stdout(predicate::str::contains("--title"))
        .stdout(predicate::str::contains("--price"));
}

#[test]
fn test_empty_catalog() {
    let dir = TempDir::new().unwrap();
    librio(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No books found"));
}

#[test]
fn test_publish_then_list() {
    let dir = TempDir::new().unwrap();
    let first = publish(&dir, "Cien años de soledad", "45000");
    let second = publish(&dir, "Rayuela", "38000");

    let items = json_stdout(librio(&dir).args(["--json", "list"]));
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 2);
    // Newest first
    assert_eq!(items[0]["id"], second.as_str());
    assert_eq!(items[1]["id"], first.as_str());
    assert_eq!(items[1]["publisher"], "Editorial no especificada");
    assert_eq!(items[1]["genre"], "Sin género");
    assert_eq!(items[1]["status"], "available");
    assert_eq!(items[1]["seller"], "Usuario Actual");
}

#[test]
fn test_list_sort_and_search() {
    let dir = TempDir::new().unwrap();
    publish(&dir, "Barato", "10");
    publish(&dir, "Caro", "90");

    let items = json_stdout(librio(&dir).args(["--json", "list", "--sort", "price_asc"]));
    assert_eq!(items[0]["title"], "Barato");
    assert_eq!(items[1]["title"], "Caro");

    let items = json_stdout(librio(&dir).args(["--json", "list", "--search", "car"]));
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Caro");
}

#[test]
fn test_list_unknown_sort() {
    let dir = TempDir::new().unwrap();
    librio(&dir)
        .args(["list", "--sort", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown sort order"));
}

#[test]
fn test_publish_validation_failure() {
    let dir = TempDir::new().unwrap();
    librio(&dir)
        .args(["publish", "--title", "  ", "--author", "Autor", "--price", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("title"))
        .stderr(predicate::str::contains("price"));

    librio(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No books found"));
}

#[test]
fn test_show_and_update() {
    let dir = TempDir::new().unwrap();
    let id = publish(&dir, "Ficciones", "20000");

    librio(&dir)
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ficciones"))
        .stdout(predicate::str::contains("COP 20000"));

    let item = json_stdout(librio(&dir).args([
        "--json", "update", &id, "--status", "sold", "--price", "15000",
    ]));
    assert_eq!(item["status"], "sold");
    assert_eq!(item["price"], "15000");
    assert!(!item["updated_at"].is_null());
}

#[test]
fn test_update_rejects_bad_status() {
    let dir = TempDir::new().unwrap();
    let id = publish(&dir, "Ficciones", "20000");

    librio(&dir)
        .args(["update", &id, "--status", "lost"])
        .assert()
        .failure();
}

#[test]
fn test_update_without_fields() {
    let dir = TempDir::new().unwrap();
    let id = publish(&dir, "Ficciones", "20000");

    librio(&dir)
        .args(["update", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to update"));
}

#[test]
fn test_delete() {
    let dir = TempDir::new().unwrap();
    let id = publish(&dir, "Pedro Páramo", "25000");

    librio(&dir)
        .args(["delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    librio(&dir)
        .args(["show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No book with id"));

    librio(&dir)
        .args(["delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to delete"));
}

#[test]
fn test_cart_totals() {
    let dir = TempDir::new().unwrap();
    let a = publish(&dir, "A", "100");
    let b = publish(&dir, "B", "50");

    librio(&dir).args(["cart", "add", &a, "-q", "2"]).assert().success();
    librio(&dir).args(["cart", "add", &b]).assert().success();

    let cart = json_stdout(librio(&dir).args(["--json", "cart", "show"]));
    assert_eq!(cart["lines"].as_array().unwrap().len(), 2);
    assert_eq!(cart["item_count"], 3);
    assert_eq!(cart["total"], "250");

    librio(&dir)
        .args(["cart", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:       COP 250"));
}

#[test]
fn test_cart_add_merges_lines() {
    let dir = TempDir::new().unwrap();
    let id = publish(&dir, "A", "100");

    librio(&dir).args(["cart", "add", &id]).assert().success();
    let cart = json_stdout(librio(&dir).args(["--json", "cart", "add", &id, "-q", "2"]));
    let lines = cart["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 3);
    assert_eq!(cart["total"], "300");
}

#[test]
fn test_cart_add_caps_quantity() {
    let dir = TempDir::new().unwrap();
    let id = publish(&dir, "A", "10");

    let cart = json_stdout(
        librio(&dir)
            .env("LIBRIO_MAX_QUANTITY", "3")
            .args(["--json", "cart", "add", &id, "-q", "5"]),
    );
    assert_eq!(cart["lines"][0]["quantity"], 3);
}

#[test]
fn test_cart_add_reports_cap_on_existing_line() {
    let dir = TempDir::new().unwrap();
    let id = publish(&dir, "A", "10");

    librio(&dir)
        .env("LIBRIO_MAX_QUANTITY", "3")
        .args(["cart", "add", &id, "-q", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("capped").not());

    librio(&dir)
        .env("LIBRIO_MAX_QUANTITY", "3")
        .args(["cart", "add", &id, "-q", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 x A in cart"))
        .stderr(predicate::str::contains("capped at 3"));
}

#[test]
fn test_cart_add_zero_quantity() {
    let dir = TempDir::new().unwrap();
    let id = publish(&dir, "A", "100");

    librio(&dir)
        .args(["cart", "add", &id, "--quantity", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
}

#[test]
fn test_cart_add_unknown_book() {
    let dir = TempDir::new().unwrap();
    librio(&dir)
        .args(["cart", "add", "123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No book with id 123"));
}

#[test]
fn test_cart_set_zero_removes_line() {
    let dir = TempDir::new().unwrap();
    let id = publish(&dir, "A", "100");

    librio(&dir).args(["cart", "add", &id]).assert().success();
    librio(&dir)
        .args(["cart", "set", &id, "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));

    librio(&dir)
        .args(["cart", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cart is empty"));
}

#[test]
fn test_cart_remove_and_clear() {
    let dir = TempDir::new().unwrap();
    let a = publish(&dir, "A", "100");
    let b = publish(&dir, "B", "50");

    librio(&dir).args(["cart", "add", &a]).assert().success();
    librio(&dir).args(["cart", "add", &b]).assert().success();

    librio(&dir)
        .args(["cart", "remove", &a])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));
    librio(&dir)
        .args(["cart", "remove", &a])
        .assert()
        .success()
        .stdout(predicate::str::contains("was not in the cart"));

    librio(&dir).args(["cart", "clear"]).assert().success();
    let cart = json_stdout(librio(&dir).args(["--json", "cart", "show"]));
    assert!(cart["lines"].as_array().unwrap().is_empty());
    assert_eq!(cart["total"], "0");
}

#[test]
fn test_prefs_set_and_show() {
    let dir = TempDir::new().unwrap();

    let prefs = json_stdout(librio(&dir).args(["--json", "prefs", "show"]));
    assert_eq!(prefs["theme"], "light");
    assert_eq!(prefs["currency"], "COP");

    librio(&dir)
        .args(["prefs", "set", "theme", "dark"])
        .assert()
        .success();
    librio(&dir)
        .args(["prefs", "set", "currency", "usd"])
        .assert()
        .success();

    let prefs = json_stdout(librio(&dir).args(["--json", "prefs", "show"]));
    assert_eq!(prefs["theme"], "dark");
    assert_eq!(prefs["currency"], "USD");

    librio(&dir)
        .args(["prefs", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("light"));
}

#[test]
fn test_prefs_unknown_key() {
    let dir = TempDir::new().unwrap();
    librio(&dir)
        .args(["prefs", "set", "volume", "11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown preference"));
}

#[test]
fn test_prefs_invalid_value() {
    let dir = TempDir::new().unwrap();
    librio(&dir)
        .args(["prefs", "set", "theme", "purple"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
}

#[test]
fn test_currency_preference_in_output() {
    let dir = TempDir::new().unwrap();
    let id = publish(&dir, "A", "12.50");

    librio(&dir)
        .args(["prefs", "set", "currency", "EUR"])
        .assert()
        .success();
    librio(&dir).args(["cart", "add", &id]).assert().success();
    librio(&dir)
        .args(["cart", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EUR 12.5"));
}
