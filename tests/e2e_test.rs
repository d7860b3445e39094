use coinsignal::api::{Account, BithumbClient, BithumbPrivateClient, MarketData};
use coinsignal::config::{Credentials, ProviderConfig, TelegramConfig};
use coinsignal::detectors::continuous_rise;
use coinsignal::discovery::rank_by_value;
use coinsignal::models::{CandleFeed, CandleSet, ChartInterval};
use coinsignal::error::ApiError;
use coinsignal::notify::{Notifier, StdoutNotifier, TelegramNotifier};
use coinsignal::portfolio::PortfolioReporter;
use coinsignal::report::{ComposerSettings, ReportComposer, ReportProfile};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{json, Value};
use std::time::Duration;

fn provider(base_url: &str) -> ProviderConfig {
    ProviderConfig {
        base_url: base_url.to_string(),
        requests_per_second: 100,
        max_retries: 1,
        ..ProviderConfig::default()
    }
}

fn ticker(open: f64, close: f64, value: f64) -> Value {
    json!({
        "opening_price": open.to_string(),
        "closing_price": close.to_string(),
        "min_price": "1",
        "max_price": "1000",
        "prev_closing_price": open.to_string(),
        "units_traded_24H": "1000",
        "acc_trade_value_24H": value.to_string(),
        "fluctate_rate_24H": "0"
    })
}

fn snapshot_body() -> String {
    json!({
        "status": "0000",
        "data": {
            "X": ticker(100.0, 110.0, 3000.0),
            "Y": ticker(100.0, 90.0, 2000.0),
            "Z": ticker(100.0, 105.0, 1000.0),
            "W": ticker(100.0, 120.0, 500.0),
            "date": "1700000000000"
        }
    })
    .to_string()
}

/// Candle rows whose closes follow `closes`; `green` picks the candle colour
fn candle_body(closes: &[f64], green: bool) -> String {
    let rows: Vec<Value> = closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let open = if green { close - 1.0 } else { close + 1.0 };
            json!([
                1_700_000_000_000i64 + i as i64 * 86_400_000,
                open.to_string(),
                close.to_string(),
                (close + 2.0).to_string(),
                (close - 2.0).to_string(),
                "10"
            ])
        })
        .collect();

    json!({ "status": "0000", "data": rows }).to_string()
}

async fn mock_market(server: &mut ServerGuard, interval: &str) {
    server
        .mock("GET", "/public/ticker/ALL_KRW")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(snapshot_body())
        .create_async()
        .await;

    server
        .mock("GET", format!("/public/candlestick/X_KRW/{}", interval).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candle_body(&[100.0, 101.0, 102.0, 103.0], true))
        .create_async()
        .await;

    server
        .mock("GET", format!("/public/candlestick/Y_KRW/{}", interval).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candle_body(&[100.0, 99.0, 98.0, 97.0], false))
        .create_async()
        .await;

    server
        .mock("GET", format!("/public/candlestick/Z_KRW/{}", interval).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "status": "5600", "message": "Invalid Parameter" }).to_string())
        .create_async()
        .await;
}

fn settings(universe_size: usize) -> ComposerSettings {
    ComposerSettings {
        universe_size,
        chart_base_url: "https://trade.example/order".to_string(),
        symbol_timeout: Duration::from_secs(5),
        ..ComposerSettings::default()
    }
}

#[tokio::test]
async fn test_snapshot_rank_and_rise() {
    let _ = tracing_subscriber::fmt::try_init();

    let mut server = Server::new_async().await;
    mock_market(&mut server, "24h").await;
    let client = BithumbClient::new(&provider(&server.url())).unwrap();

    let snapshot = client.snapshot("KRW").await.unwrap();
    assert_eq!(snapshot.len(), 4, "the date member is not a symbol");

    let universe = rank_by_value(&snapshot, 3);
    assert_eq!(universe, vec!["X", "Y", "Z"]);

    let mut candles = CandleSet::new();
    for symbol in &universe {
        let feed = client
            .candlestick(symbol, "KRW", ChartInterval::OneDay)
            .await
            .unwrap();
        candles.insert(symbol.clone(), feed);
    }

    assert!(matches!(
        candles.get("Z"),
        Some(CandleFeed::Failed { status, .. }) if status == "5600"
    ));
    assert_eq!(continuous_rise(&universe, &candles, 3).unwrap(), vec!["X"]);
}

#[tokio::test]
async fn test_long_term_run_survives_notifier_failure() {
    let _ = tracing_subscriber::fmt::try_init();

    let mut server = Server::new_async().await;
    mock_market(&mut server, "24h").await;
    let telegram_mock = server
        .mock("POST", "/botTOKEN/sendMessage")
        .with_status(500)
        .with_body("{\"ok\":false}")
        .expect(1)
        .create_async()
        .await;

    let telegram = TelegramNotifier::new(
        &TelegramConfig {
            api_base: server.url(),
            bot_token: Some("TOKEN".to_string()),
            chat_id: Some("42".to_string()),
        },
        Duration::from_secs(5),
    )
    .unwrap();

    let market = BithumbClient::new(&provider(&server.url())).unwrap();
    let composer = ReportComposer::new(market, telegram, settings(3));

    let report = composer.run(&ReportProfile::long_term()).await.unwrap();
    telegram_mock.assert_async().await;

    assert_eq!(report.sections.len(), 6);
    assert_eq!(report.failed_sections(), 0);
    assert_eq!(
        report.section("Top value ∩ top return").unwrap().as_ref().unwrap(),
        &vec!["X", "Z"]
    );
    assert_eq!(
        report.section("Rising 3 ∧ green 3").unwrap().as_ref().unwrap(),
        &vec!["X"]
    );
    assert_eq!(
        report.section("Falling 3 ∧ red 3").unwrap().as_ref().unwrap(),
        &vec!["Y"]
    );

    let text = report.render();
    assert!(text.contains("[X](https://trade.example/order/X-KRW)"));
    assert!(!text.contains("[W]"));
}

#[tokio::test]
async fn test_short_term_renders_every_section() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/public/ticker/ALL_KRW")
        .with_status(200)
        .with_body(snapshot_body())
        .create_async()
        .await;
    let candles_mock = server
        .mock("GET", Matcher::Regex(r"^/public/candlestick/.+_KRW/(1h|30m)$".to_string()))
        .with_status(200)
        .with_body(json!({ "status": "0000", "data": [] }).to_string())
        .expect(8)
        .create_async()
        .await;

    let market = BithumbClient::new(&provider(&server.url())).unwrap();
    let composer = ReportComposer::new(market, StdoutNotifier, settings(4));

    let profile = ReportProfile::short_term();
    let report = composer.run(&profile).await.unwrap();
    candles_mock.assert_async().await;

    assert_eq!(report.sections.len(), profile.sections.len());
    for section in &report.sections {
        let symbols = section.outcome.as_ref().unwrap();
        if section.title != "Top value ∩ top return" {
            assert!(symbols.is_empty(), "{} matched {:?}", section.title, symbols);
        }
    }
    assert!(report
        .sections
        .iter()
        .any(|s| s.interval == ChartInterval::ThirtyMinutes));
}

#[tokio::test]
async fn test_snapshot_failure_aborts_run() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/public/ticker/ALL_KRW")
        .with_status(200)
        .with_body(json!({ "status": "5300", "message": "Invalid Apikey" }).to_string())
        .create_async()
        .await;

    let market = BithumbClient::new(&provider(&server.url())).unwrap();
    let composer = ReportComposer::new(market, StdoutNotifier, settings(3));

    let err = composer.compose(&ReportProfile::long_term()).await.unwrap_err();
    assert!(err.to_string().contains("5300"));
}

fn private_client(base_url: &str) -> BithumbPrivateClient {
    let credentials = Credentials {
        api_key: Some("KEY".to_string()),
        api_secret: Some("SECRET".to_string()),
    };
    BithumbPrivateClient::new(&provider(base_url), &credentials).unwrap()
}

fn form(pairs: &[(&str, &str)]) -> Matcher {
    Matcher::AllOf(
        pairs
            .iter()
            .map(|(k, v)| Matcher::UrlEncoded(k.to_string(), v.to_string()))
            .collect(),
    )
}

#[tokio::test]
async fn test_signed_balance_request() {
    let mut server = Server::new_async().await;
    let balance_mock = server
        .mock("POST", "/info/balance")
        .match_header("Api-Key", "KEY")
        .match_header("Api-Sign", Matcher::Regex(r"^[A-Za-z0-9+/]+=*$".to_string()))
        .match_header("Api-Nonce", Matcher::Regex(r"^\d{13}$".to_string()))
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(form(&[("endpoint", "/info/balance"), ("currency", "ALL")]))
        .with_status(200)
        .with_body(
            json!({
                "status": "0000",
                "data": { "total_btc": "0.5", "total_krw": "1000", "in_use_btc": "0" }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let balances = private_client(&server.url()).balances().await.unwrap();
    balance_mock.assert_async().await;

    assert_eq!(balances.get("total_btc"), Some(&json!("0.5")));
    assert_eq!(balances.len(), 3);
}

#[tokio::test]
async fn test_signed_request_errors() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/info/balance")
        .with_status(200)
        .with_body(json!({ "status": "5300", "message": "Invalid Apikey" }).to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/info/orders")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let client = private_client(&server.url());

    match client.balance("ALL").await {
        Err(ApiError::Status { status, message, .. }) => {
            assert_eq!(status, "5300");
            assert_eq!(message, "Invalid Apikey");
        }
        other => panic!("expected status error, got {:?}", other),
    }

    match client.orders("BTC").await {
        Err(ApiError::Http { status, body, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_signed_endpoints_send_their_parameters() {
    let mut server = Server::new_async().await;
    let ok = json!({ "status": "0000", "data": { "ok": true } }).to_string();

    let mocks = vec![
        server
            .mock("POST", "/info/account")
            .match_body(form(&[
                ("endpoint", "/info/account"),
                ("order_currency", "BTC"),
                ("payment_currency", "KRW"),
            ]))
            .with_body(&ok)
            .create_async()
            .await,
        server
            .mock("POST", "/info/ticker")
            .match_body(form(&[
                ("endpoint", "/info/ticker"),
                ("order_currency", "BTC"),
                ("payment_currency", "KRW"),
            ]))
            .with_body(&ok)
            .create_async()
            .await,
        server
            .mock("POST", "/info/orders")
            .match_body(form(&[("endpoint", "/info/orders"), ("order_currency", "BTC")]))
            .with_body(&ok)
            .create_async()
            .await,
        server
            .mock("POST", "/info/order_detail")
            .match_body(form(&[
                ("endpoint", "/info/order_detail"),
                ("order_id", "C0101000000001"),
                ("order_currency", "BTC"),
            ]))
            .with_body(&ok)
            .create_async()
            .await,
    ];

    let client = private_client(&server.url());
    assert_eq!(client.account_info("BTC", "KRW").await.unwrap()["ok"], true);
    assert_eq!(client.ticker_info("BTC", "KRW").await.unwrap()["ok"], true);
    assert_eq!(client.orders("BTC").await.unwrap()["ok"], true);
    assert_eq!(
        client.order_detail("C0101000000001", "BTC").await.unwrap()["ok"],
        true
    );

    for mock in mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_portfolio_digest_survives_missing_history() {
    let _ = tracing_subscriber::fmt::try_init();

    let mut server = Server::new_async().await;
    server
        .mock("GET", "/public/ticker/ALL_KRW")
        .with_status(200)
        .with_body(snapshot_body())
        .create_async()
        .await;
    server
        .mock("POST", "/info/balance")
        .with_status(200)
        .with_body(
            json!({
                "status": "0000",
                "data": {
                    "total_x": "2",
                    "total_y": "10",
                    "total_w": "0",
                    "total_krw": "1000",
                    "available_x": "2"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let x_history = server
        .mock("POST", "/info/user_transactions")
        .match_body(form(&[("order_currency", "X"), ("payment_currency", "KRW")]))
        .with_status(200)
        .with_body(
            json!({
                "status": "0000",
                "data": [
                    { "search": "1", "units": "1", "price": "100" },
                    { "search": "1", "units": "1", "price": "110" },
                    { "search": "2", "units": "1", "price": "500" }
                ]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let y_history = server
        .mock("POST", "/info/user_transactions")
        .match_body(form(&[("order_currency", "Y"), ("payment_currency", "KRW")]))
        .with_status(500)
        .with_body("unavailable")
        .expect(1)
        .create_async()
        .await;

    let reporter = PortfolioReporter::new(
        private_client(&server.url()),
        BithumbClient::new(&provider(&server.url())).unwrap(),
        StdoutNotifier,
        "KRW",
    );
    let digest = reporter.run().await.unwrap();
    x_history.assert_async().await;
    y_history.assert_async().await;

    assert_eq!(digest.cash, 1000.0);
    let currencies: Vec<&str> = digest.holdings.iter().map(|h| h.currency.as_str()).collect();
    assert_eq!(currencies, vec!["Y", "X"]);

    let y = &digest.holdings[0];
    assert_eq!(y.value, Some(900.0));
    assert_eq!(y.avg_cost, None);

    let x = &digest.holdings[1];
    assert_eq!(x.value, Some(220.0));
    assert_eq!(x.avg_cost, Some(105.0));

    assert_eq!(digest.total_value(), 2120.0);
}

#[test]
fn test_stdout_notifier_never_fails() {
    assert!(tokio_test::block_on(StdoutNotifier.send("hello")).is_ok());
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_live_snapshot() {
    let client = BithumbClient::new(&ProviderConfig::default()).unwrap();
    let snapshot = client.snapshot("KRW").await.unwrap();
    assert!(!snapshot.is_empty());
    assert!(snapshot.get("BTC").is_some());

    let feed = client
        .candlestick("BTC", "KRW", ChartInterval::OneDay)
        .await
        .unwrap();
    assert!(feed.is_ready());
}
