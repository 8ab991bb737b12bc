//! CLI integration tests.

use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn cli(base_url: &str, prefs: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_foodify"));
    for (key, _) in std::env::vars() {
        if key.starts_with("FOODIFY_") {
            command.env_remove(key);
        }
    }
    command
        .env("FOODIFY_BASE_URL", base_url)
        .env("FOODIFY_RETRY_MAX_ATTEMPTS", "1")
        .env_remove("RUST_LOG")
        .arg("--prefs")
        .arg(prefs);
    command
}

fn temp_prefs(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("foodify-cli-{}-{name}", std::process::id()))
        .join("prefs.json")
}

fn stdout_json(output: &Output) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(&output.stdout)
}

#[tokio::test]
async fn help_lists_commands() -> TestResult {
    let output = Command::new(env!("CARGO_BIN_EXE_foodify"))
        .arg("--help")
        .output()
        .await?;

    assert!(output.status.success());
    let text = String::from_utf8(output.stdout)?;
    for command in ["search", "product", "categories", "cart", "theme", "config"] {
        assert!(text.contains(command), "missing {command}");
    }
    Ok(())
}

#[tokio::test]
async fn config_show_reflects_env_override() -> TestResult {
    let prefs = temp_prefs("config");
    let output = cli("http://localhost:9999", &prefs)
        .args(["config", "show", "--format", "json"])
        .output()
        .await?;

    assert!(output.status.success());
    let value = stdout_json(&output)?;
    assert_eq!(value["client"]["baseUrl"], "http://localhost:9999");
    Ok(())
}

#[tokio::test]
async fn theme_toggle_persists_between_runs() -> TestResult {
    let prefs = temp_prefs("theme");
    let _ = std::fs::remove_file(&prefs);

    let first = cli("http://localhost:9999", &prefs)
        .args(["theme", "toggle", "--output", "json"])
        .output()
        .await?;
    assert!(first.status.success());
    assert_eq!(stdout_json(&first)?["data"]["theme"], "dark");

    let second = cli("http://localhost:9999", &prefs)
        .args(["theme", "show", "--output", "json"])
        .output()
        .await?;
    assert_eq!(stdout_json(&second)?["data"]["theme"], "dark");
    Ok(())
}

#[tokio::test]
async fn search_prints_filtered_products() -> TestResult {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi/search.pl"))
        .and(query_param("search_terms", "apple"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "products": [
                { "code": "111", "product_name": "Apple juice", "brands": "Orchard" },
                { "code": "222", "product_name": "   " }
            ]
        })))
        .mount(&server)
        .await;

    let prefs = temp_prefs("search");
    let output = cli(&server.uri(), &prefs)
        .args(["search", "apple", "--output", "json"])
        .output()
        .await?;

    assert!(output.status.success());
    let value = stdout_json(&output)?;
    let products = value["data"]["products"]
        .as_array()
        .ok_or("missing products")?;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["id"], "111");
    assert_eq!(value["data"]["hasMore"], false);
    Ok(())
}

#[tokio::test]
async fn missing_product_exits_with_not_found() -> TestResult {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/product/404404.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 0,
            "status_verbose": "product not found"
        })))
        .mount(&server)
        .await;

    let prefs = temp_prefs("product");
    let output = cli(&server.uri(), &prefs)
        .args(["product", "404404"])
        .output()
        .await?;

    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("Product not found"));
    Ok(())
}

#[tokio::test]
async fn product_details_show_ingredients() -> TestResult {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/product/3017620422003.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 1,
            "product": {
                "code": "3017620422003",
                "product_name": "Nutella",
                "ingredients_text": "Sugar, palm oil, hazelnuts 13%",
                "nutriments": { "fat_100g": 30.9 }
            }
        })))
        .mount(&server)
        .await;

    let prefs = temp_prefs("details");
    let output = cli(&server.uri(), &prefs)
        .args(["product", "3017620422003"])
        .output()
        .await?;

    assert!(output.status.success());
    let text = String::from_utf8(output.stdout)?;
    assert!(text.contains("Nutella"));
    assert!(text.contains("ingredients: Sugar, palm oil, hazelnuts 13%"));
    Ok(())
}
