// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{acme_site, coordinator, StubPageSource};
use mailharvest::application::use_cases::batch_coordinator::{BatchOptions, DEADLINE_EXCEEDED};
use mailharvest::domain::models::batch_result::{NO_EMAILS_MESSAGE, SUCCESS_MESSAGE};
use mailharvest::domain::models::domain_record::DomainStatus;
use mailharvest::engines::traits::{FetchStrategy, PageSource};
use mailharvest::utils::errors::HarvestError;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn no_deadline() -> BatchOptions {
    BatchOptions {
        deadline: None,
        ..BatchOptions::default()
    }
}

#[tokio::test]
async fn test_end_to_end_acme_and_unreachable_beta() {
    let source = Arc::new(acme_site());
    let coordinator = coordinator(vec![source.clone()], no_deadline());

    let result = coordinator
        .run_batch(&[json!("acme.com"), json!("http://beta.com"), json!("  ")])
        .await
        .unwrap();

    assert_eq!(result.emails, vec!["info@acme.com"]);
    assert_eq!(result.message, SUCCESS_MESSAGE);
    assert_eq!(result.records.len(), 2);

    let acme = &result.records[0];
    assert_eq!(acme.url, "https://acme.com");
    assert_eq!(acme.status, DomainStatus::Success);
    assert_eq!(acme.emails_found, vec!["info@acme.com"]);

    let beta = &result.records[1];
    assert_eq!(beta.url, "https://beta.com");
    assert_eq!(beta.status, DomainStatus::Success);
    assert!(beta.emails_found.is_empty());
    assert!(beta.emails_filtered.is_empty());
    assert!(beta.error.is_none());

    assert_eq!(
        source.requests(),
        vec![
            "https://acme.com/",
            "https://acme.com/contact",
            "https://beta.com/",
            "https://beta.com/contact",
        ]
    );
}

#[tokio::test]
async fn test_no_valid_domains_is_terminal() {
    let source = Arc::new(acme_site());
    let coordinator = coordinator(vec![source.clone()], no_deadline());

    let result = coordinator
        .run_batch(&[json!("   "), json!(42), json!(null)])
        .await;

    assert!(matches!(result, Err(HarvestError::NoValidDomains)));
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn test_emails_are_unique_across_domains_and_pages() {
    let source = Arc::new(
        StubPageSource::new(FetchStrategy::Static, "static")
            .page("https://acme.com/", "Sales: SALES@acme.io", &[])
            .page(
                "https://acme.com/contact",
                "sales@acme.io or info@acme.io",
                &["mailto:Sales@Acme.io"],
            )
            .page("https://partner.com/", "Reach sales@acme.io", &[]),
    );
    let coordinator = coordinator(vec![source], no_deadline());

    let result = coordinator
        .run_batch(&[json!("acme.com"), json!("partner.com")])
        .await
        .unwrap();

    assert_eq!(result.emails, vec!["sales@acme.io", "info@acme.io"]);
    assert_eq!(result.records[0].emails_found.len(), 4);
    assert_eq!(result.records[1].emails_found, vec!["sales@acme.io"]);
}

#[tokio::test]
async fn test_filtered_candidates_are_reported() {
    let source = Arc::new(StubPageSource::new(FetchStrategy::Static, "static").page(
        "https://acme.com/contact",
        "foo@example.com someone@gmail.com logo@2x.png",
        &[],
    ));
    let coordinator = coordinator(vec![source], no_deadline());

    let result = coordinator.run_batch(&[json!("acme.com")]).await.unwrap();

    assert!(result.emails.is_empty());
    assert_eq!(result.message, NO_EMAILS_MESSAGE);
    assert_eq!(
        result.records[0].emails_filtered,
        vec!["foo@example.com", "someone@gmail.com", "logo@2x.png"]
    );
}

#[tokio::test]
async fn test_rendered_source_is_used_as_fallback() {
    let fast: Arc<dyn PageSource> = Arc::new(StubPageSource::new(FetchStrategy::Static, "static"));
    let slow = Arc::new(StubPageSource::new(FetchStrategy::Rendered, "rendered").page(
        "https://spa.io/",
        "Contact hello@spa.io",
        &[],
    ));
    let coordinator = coordinator(vec![fast, slow.clone()], no_deadline());

    let result = coordinator.run_batch(&[json!("spa.io")]).await.unwrap();

    assert_eq!(result.emails, vec!["hello@spa.io"]);
    assert_eq!(
        slow.requests(),
        vec!["https://spa.io/", "https://spa.io/contact"]
    );
}

#[tokio::test]
async fn test_running_twice_yields_same_email_set() {
    let source = Arc::new(
        acme_site().page("https://beta.com/contact", "team@beta.com", &[]),
    );
    let coordinator = coordinator(
        vec![source],
        BatchOptions {
            max_concurrent_domains: 2,
            deadline: None,
            ..BatchOptions::default()
        },
    );
    let input = [json!("acme.com"), json!("beta.com")];

    let first = coordinator.run_batch(&input).await.unwrap();
    let second = coordinator.run_batch(&input).await.unwrap();

    let first: HashSet<_> = first.emails.into_iter().collect();
    let second: HashSet<_> = second.emails.into_iter().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn test_concurrent_workers_keep_input_order() {
    let source = Arc::new(
        acme_site()
            .page("https://beta.com/", "one@beta.com", &[])
            .page("https://gamma.com/", "two@gamma.com", &[]),
    );
    let coordinator = coordinator(
        vec![source],
        BatchOptions {
            max_concurrent_domains: 3,
            deadline: None,
            ..BatchOptions::default()
        },
    );

    let result = coordinator
        .run_batch(&[json!("gamma.com"), json!("acme.com"), json!("beta.com")])
        .await
        .unwrap();

    let urls: Vec<_> = result.records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec!["https://gamma.com", "https://acme.com", "https://beta.com"]
    );
    assert_eq!(
        result.emails,
        vec!["two@gamma.com", "info@acme.com", "one@beta.com"]
    );
}

#[tokio::test]
async fn test_panicking_domain_does_not_stop_batch() {
    let source = Arc::new(acme_site().panics_on("https://broken.com/", "parser exploded"));
    let coordinator = coordinator(vec![source], no_deadline());

    let result = coordinator
        .run_batch(&[json!("broken.com"), json!("acme.com")])
        .await
        .unwrap();

    let broken = &result.records[0];
    assert_eq!(broken.status, DomainStatus::Failed);
    assert_eq!(broken.error.as_deref(), Some("parser exploded"));
    assert_eq!(result.records[1].status, DomainStatus::Success);
    assert_eq!(result.emails, vec!["info@acme.com"]);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_aborts_unfinished_domains() {
    let source = Arc::new(acme_site().hangs_on("https://slow.com/", Duration::from_secs(600)));
    let coordinator = coordinator(
        vec![source],
        BatchOptions {
            deadline: Some(Duration::from_secs(60)),
            ..BatchOptions::default()
        },
    );

    let result = coordinator
        .run_batch(&[json!("acme.com"), json!("slow.com"), json!("late.com")])
        .await
        .unwrap();

    assert_eq!(result.records[0].status, DomainStatus::Success);
    for record in &result.records[1..] {
        assert_eq!(record.status, DomainStatus::Failed);
        assert_eq!(record.error.as_deref(), Some(DEADLINE_EXCEEDED));
    }
    assert_eq!(result.emails, vec!["info@acme.com"]);
}

#[tokio::test]
async fn test_isolated_batch_reports_crash_as_internal_error() {
    let source = Arc::new(acme_site().with_broken_name());
    let coordinator = Arc::new(coordinator(vec![source], no_deadline()));

    let result = coordinator.run_batch_isolated(vec![json!("acme.com")]).await;

    match result {
        Err(HarvestError::Internal(message)) => assert_eq!(message, "source registry corrupted"),
        other => panic!("expected internal error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_isolated_batch_passes_through_results() {
    let coordinator = Arc::new(coordinator(vec![Arc::new(acme_site())], no_deadline()));

    let result = coordinator
        .run_batch_isolated(vec![json!("acme.com")])
        .await
        .unwrap();

    assert_eq!(result.emails, vec!["info@acme.com"]);
}
