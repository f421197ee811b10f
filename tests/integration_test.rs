use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Mock, Server};
use predicates::prelude::*;

const LOGIN: &str = "/api/eshop/v1/user/login";
const DELIVERIES: &str = "/api/eshop/v1/cart/deliveries";
const SEND_MESSAGE: &str = "/bottest-token/sendMessage";

fn slotwatch(retailer: &Server, bot: &Server) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("slotwatch"));
    cmd.arg("--email")
        .arg("me@example.com")
        .arg("--password")
        .arg("hunter2")
        .arg("--botapikey")
        .arg("test-token")
        .arg("--botchatid")
        .arg("4242")
        .arg("--retailer-url")
        .arg(retailer.url())
        .arg("--bot-api-url")
        .arg(bot.url());
    cmd
}

fn mock_login(server: &mut Server, status: usize) -> Mock {
    server
        .mock("POST", LOGIN)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("email".into(), "me@example.com".into()),
            Matcher::UrlEncoded("password".into(), "hunter2".into()),
            Matcher::UrlEncoded("rememberMe".into(), "false".into()),
        ]))
        .with_status(status)
        .with_body("{}")
        .expect(1)
        .create()
}

fn mock_deliveries(server: &mut Server, body: &str) -> Mock {
    server
        .mock("GET", DELIVERIES)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(1)
        .create()
}

fn mock_message(server: &mut Server, text: &str) -> Mock {
    server
        .mock("GET", SEND_MESSAGE)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("chat_id".into(), "4242".into()),
            Matcher::UrlEncoded("parse_mode".into(), "Markdown".into()),
            Matcher::UrlEncoded("text".into(), text.into()),
        ]))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create()
}

fn mock_no_messages(server: &mut Server) -> Mock {
    server
        .mock("GET", SEND_MESSAGE)
        .match_query(Matcher::Any)
        .expect(0)
        .create()
}

#[test]
fn test_available_slot_is_notified() {
    let mut retailer = Server::new();
    let mut bot = Server::new();

    let login = mock_login(&mut retailer, 200);
    let deliveries = mock_deliveries(
        &mut retailer,
        r#"{"ok":true,"deliveries":[{"params":{"matrix":[{"hours":[{"available":true,"deliveryTime":"08:00-10:00"}]}]}}]}"#,
    );
    let message = mock_message(&mut bot, "08:00-10:00 :: True");

    slotwatch(&retailer, &bot).assert().success();

    login.assert();
    deliveries.assert();
    message.assert();
}

#[test]
fn test_one_message_per_available_slot() {
    let mut retailer = Server::new();
    let mut bot = Server::new();

    let _login = mock_login(&mut retailer, 200);
    let _deliveries = mock_deliveries(
        &mut retailer,
        r#"{
            "ok": true,
            "deliveries": [{"params": {"matrix": [
                {"hours": [
                    {"available": false, "deliveryTime": "Mon 08:00"},
                    {"available": true, "deliveryTime": "Mon 10:00"}
                ]},
                {"hours": [
                    {"available": true, "deliveryTime": "Tue 18:00"}
                ]}
            ]}}]
        }"#,
    );
    let monday = mock_message(&mut bot, "Mon 10:00 :: True");
    let tuesday = mock_message(&mut bot, "Tue 18:00 :: True");

    slotwatch(&retailer, &bot).assert().success();

    monday.assert();
    tuesday.assert();
}

#[test]
fn test_schedule_not_ok_sends_nothing() {
    let mut retailer = Server::new();
    let mut bot = Server::new();

    let _login = mock_login(&mut retailer, 200);
    let deliveries = mock_deliveries(&mut retailer, r#"{"ok":false}"#);
    let messages = mock_no_messages(&mut bot);

    slotwatch(&retailer, &bot).assert().success().code(0);

    deliveries.assert();
    messages.assert();
}

#[test]
fn test_no_available_slots_sends_nothing() {
    let mut retailer = Server::new();
    let mut bot = Server::new();

    let _login = mock_login(&mut retailer, 200);
    let _deliveries = mock_deliveries(
        &mut retailer,
        r#"{"ok":true,"deliveries":[{"params":{"matrix":[{"hours":[{"available":false,"deliveryTime":"08:00-10:00"}]}]}}]}"#,
    );
    let messages = mock_no_messages(&mut bot);

    slotwatch(&retailer, &bot).assert().success();

    messages.assert();
}

#[test]
fn test_login_rejected_stops_the_run() {
    let mut retailer = Server::new();
    let mut bot = Server::new();

    let login = mock_login(&mut retailer, 401);
    let deliveries = retailer.mock("GET", DELIVERIES).expect(0).create();
    let messages = mock_no_messages(&mut bot);

    slotwatch(&retailer, &bot)
        .assert()
        .failure()
        .stderr(predicates::str::contains("401"))
        .stderr(predicates::str::contains("hunter2").not());

    login.assert();
    deliveries.assert();
    messages.assert();
}

#[test]
fn test_schedule_error_status_fails_without_retry() {
    let mut retailer = Server::new();
    let mut bot = Server::new();

    let _login = mock_login(&mut retailer, 200);
    let deliveries = retailer
        .mock("GET", DELIVERIES)
        .with_status(502)
        .expect(1)
        .create();
    let messages = mock_no_messages(&mut bot);

    slotwatch(&retailer, &bot)
        .assert()
        .failure()
        .stderr(predicates::str::contains("502"));

    deliveries.assert();
    messages.assert();
}

#[test]
fn test_malformed_schedule_fails() {
    let mut retailer = Server::new();
    let mut bot = Server::new();

    let _login = mock_login(&mut retailer, 200);
    let _deliveries = mock_deliveries(&mut retailer, r#"{"ok":true,"deliveries":[{}]}"#);
    let messages = mock_no_messages(&mut bot);

    slotwatch(&retailer, &bot)
        .assert()
        .failure()
        .stderr(predicates::str::contains("Malformed delivery schedule"));

    messages.assert();
}

#[test]
fn test_missing_bot_api_key_is_usage_error() {
    let mut retailer = Server::new();
    let login = retailer.mock("POST", LOGIN).expect(0).create();

    Command::new(cargo::cargo_bin!("slotwatch"))
        .arg("--email")
        .arg("me@example.com")
        .arg("--password")
        .arg("hunter2")
        .arg("--botchatid")
        .arg("4242")
        .arg("--retailer-url")
        .arg(retailer.url())
        .assert()
        .failure()
        .code(2)
        .stderr(predicates::str::contains("--botapikey"));

    login.assert();
}

#[test]
fn test_help_lists_required_flags() {
    Command::new(cargo::cargo_bin!("slotwatch"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("--email"))
        .stdout(predicates::str::contains("--password"))
        .stdout(predicates::str::contains("--botchatid"))
        .stdout(predicates::str::contains("--retailer-url").not());
}
