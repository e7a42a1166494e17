//! End-to-end enrichment against a local mock web server.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use httptest::{matchers::*, responders::*, Expectation, Server};

use school_contacts::{
    enrich_records, ClassifierRules, EnrichOptions, ErrorType, HttpConfig, InfoType,
    PoliteClient, SchoolRecord,
};

fn polite_client(max_retries: usize) -> PoliteClient {
    let config = HttpConfig {
        request_delay: Duration::ZERO,
        timeout: Duration::from_secs(5),
        max_retries,
        ..HttpConfig::default()
    };
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .expect("Failed to create HTTP client");
    PoliteClient::new(Arc::new(client), config)
}

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 14).unwrap()
}

fn options() -> EnrichOptions {
    EnrichOptions {
        max_sites: 0,
        checkpoint_every: 0,
        run_date: run_date(),
    }
}

fn row(website: &str) -> SchoolRecord {
    SchoolRecord {
        school_name: Some("Test School".to_string()),
        website_url: Some(website.to_string()),
        ..Default::default()
    }
}

fn expect_no_robots(server: &Server) {
    server.expect(
        Expectation::matching(request::method_path("GET", "/robots.txt"))
            .respond_with(status_code(404)),
    );
}

#[tokio::test]
async fn test_homepage_fills_email_and_form() {
    let server = Server::run();
    expect_no_robots(&server);
    server.expect(
        Expectation::matching(request::method_path("GET", "/")).respond_with(
            status_code(200).body(
                r#"<html><body>
                <a href="mailto:jane.citizen@testschool.edu.au">Principal</a>
                <a href="mailto:office@testschool.edu.au">Office</a>
                <form action="/enquiry" method="post"></form>
                </body></html>"#,
            ),
        ),
    );

    let mut records = vec![row(&server.url("/").to_string())];
    let summary = enrich_records(
        &mut records,
        &polite_client(0),
        &ClassifierRules::default(),
        &options(),
        |_| Ok(()),
    )
    .await
    .unwrap();

    let record = &records[0];
    assert_eq!(record.public_email.as_deref(), Some("office@testschool.edu.au"));
    assert_eq!(
        record.contact_form_url.as_deref(),
        Some(server.url("/enquiry").to_string().as_str())
    );
    assert!(record.website_checked);
    assert_eq!(record.last_verified_date, Some(run_date()));

    assert_eq!(summary.eligible, 1);
    assert_eq!(summary.attempted, 1);
    assert!(summary.outcomes[0].success);
    assert_eq!(summary.outcomes[0].pages_fetched, 1);
    assert_eq!(summary.stats.get_info_count(InfoType::EmailFilled), 1);
    assert_eq!(summary.stats.get_info_count(InfoType::ContactPageFallback), 0);
}

#[tokio::test]
async fn test_contact_page_fallback_stops_once_complete() {
    let server = Server::run();
    expect_no_robots(&server);
    server.expect(
        Expectation::matching(request::method_path("GET", "/")).respond_with(
            status_code(200).body(r#"<p>Welcome</p><a href="/contact-us">Contact us</a>"#),
        ),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/contact-us")).respond_with(
            status_code(200).body("<p>Email the front office: enquiries (at) testschool (dot) edu (dot) au</p>"),
        ),
    );

    let mut records = vec![row(&server.url("/").to_string())];
    let summary = enrich_records(
        &mut records,
        &polite_client(0),
        &ClassifierRules::default(),
        &options(),
        |_| Ok(()),
    )
    .await
    .unwrap();

    assert_eq!(
        records[0].public_email.as_deref(),
        Some("enquiries@testschool.edu.au")
    );
    // The contact link itself is the best form URL on the homepage
    assert_eq!(
        records[0].contact_form_url.as_deref(),
        Some(server.url("/contact-us").to_string().as_str())
    );
    assert_eq!(summary.outcomes[0].pages_fetched, 2);
    assert_eq!(summary.stats.get_info_count(InfoType::ContactPageFallback), 1);
}

#[tokio::test]
async fn test_robots_disallow_marks_row_checked_without_fetching() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/robots.txt"))
            .respond_with(status_code(200).body("User-agent: *\nDisallow: /\n")),
    );

    let mut records = vec![row(&server.url("/").to_string())];
    let summary = enrich_records(
        &mut records,
        &polite_client(0),
        &ClassifierRules::default(),
        &options(),
        |_| Ok(()),
    )
    .await
    .unwrap();

    assert!(records[0].website_checked);
    assert_eq!(records[0].public_email, None);
    assert!(!summary.outcomes[0].success);
    assert_eq!(summary.outcomes[0].error, Some(ErrorType::RobotsDisallowed));
    assert_eq!(summary.stats.get_error_count(ErrorType::RobotsDisallowed), 1);
}

#[tokio::test]
async fn test_empty_robots_file_allows_everything() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/robots.txt"))
            .respond_with(status_code(200).body("")),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/")).respond_with(
            status_code(200)
                .body(r#"<a href="mailto:office@testschool.edu.au">x</a><form></form>"#),
        ),
    );

    let client = polite_client(0);
    let mut records = vec![row(&server.url("/").to_string())];
    let summary = enrich_records(
        &mut records,
        &client,
        &ClassifierRules::default(),
        &options(),
        |_| Ok(()),
    )
    .await
    .unwrap();

    assert!(summary.outcomes[0].success);
    assert_eq!(records[0].public_email.as_deref(), Some("office@testschool.edu.au"));
    assert_eq!(client.robots().len().await, 1);
}

#[tokio::test]
async fn test_server_errors_are_retried_then_reported() {
    let server = Server::run();
    expect_no_robots(&server);
    server.expect(
        Expectation::matching(request::method_path("GET", "/"))
            .times(2)
            .respond_with(status_code(503)),
    );

    let mut records = vec![row(&server.url("/").to_string())];
    let summary = enrich_records(
        &mut records,
        &polite_client(1),
        &ClassifierRules::default(),
        &options(),
        |_| Ok(()),
    )
    .await
    .unwrap();

    assert_eq!(
        summary.outcomes[0].error,
        Some(ErrorType::HttpRequestStatusError)
    );
    assert!(records[0].website_checked);
    assert_eq!(records[0].last_verified_date, Some(run_date()));
}

#[tokio::test]
async fn test_skips_checked_rows_and_honours_max_sites() {
    let server = Server::run();
    expect_no_robots(&server);
    server.expect(
        Expectation::matching(request::method_path("GET", "/a"))
            .respond_with(status_code(200).body(
                r#"<a href="mailto:info@a.edu.au">x</a><form action=""></form>"#,
            )),
    );

    let mut checked = row(&server.url("/checked").to_string());
    checked.website_checked = true;
    let complete = SchoolRecord {
        public_email: Some("office@done.edu.au".to_string()),
        contact_form_url: Some("https://done.edu.au/contact".to_string()),
        ..row(&server.url("/complete").to_string())
    };
    let mut records = vec![
        checked,
        complete,
        row(&server.url("/a").to_string()),
        row(&server.url("/b").to_string()),
        SchoolRecord::default(),
    ];

    let mut checkpoints = Vec::new();
    let summary = enrich_records(
        &mut records,
        &polite_client(0),
        &ClassifierRules::default(),
        &EnrichOptions {
            max_sites: 1,
            checkpoint_every: 1,
            run_date: run_date(),
        },
        |rows| {
            checkpoints.push(rows.iter().filter(|r| r.website_checked).count());
            Ok(())
        },
    )
    .await
    .unwrap();

    assert_eq!(summary.eligible, 2);
    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.outcomes[0].index, 2);
    assert_eq!(records[2].public_email.as_deref(), Some("info@a.edu.au"));
    assert!(!records[3].website_checked);
    assert_eq!(checkpoints, vec![2]);
    assert_eq!(summary.stats.get_info_count(InfoType::AlreadyChecked), 1);
}

#[tokio::test]
async fn test_checkpoint_error_aborts_run() {
    let server = Server::run();
    expect_no_robots(&server);
    server.expect(
        Expectation::matching(request::method_path("GET", "/"))
            .respond_with(status_code(200).body("<p>nothing here</p>")),
    );
    // No email or form on the homepage, so every well-known contact path is tried
    for path in [
        "/contact",
        "/contact-us",
        "/contactus",
        "/about/contact",
        "/about-us/contact",
        "/enrolments",
    ] {
        server.expect(
            Expectation::matching(request::method_path("GET", path))
                .respond_with(status_code(404)),
        );
    }

    let mut records = vec![row(&server.url("/").to_string())];
    let result = enrich_records(
        &mut records,
        &polite_client(0),
        &ClassifierRules::default(),
        &EnrichOptions {
            checkpoint_every: 1,
            ..options()
        },
        |_| Err(anyhow::anyhow!("disk full")),
    )
    .await;

    assert!(result.is_err());
    assert!(records[0].website_checked);
}
