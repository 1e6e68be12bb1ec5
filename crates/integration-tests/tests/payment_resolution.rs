//! Gateway redirect resolution against the mock backend, covering the
//! callback shapes real gateways produce: validated successes, rejected
//! validations, explicit declines, and ambiguous or empty callbacks.

use std::time::Duration;

use rust_decimal::Decimal;
use warium_core::{CurrencyCode, TransactionId};
use warium_integration_tests::{MockBackend, VerdictBehavior, fixtures};
use warium_storefront::payment::{
    GENERIC_FAILURE_MESSAGE, GatewayCallback, Resolution, ResultRoute, StatusResolver,
};
use warium_storefront::services::HistoryService;

fn callback(pairs: &[(&str, &str)]) -> GatewayCallback {
    GatewayCallback::from_pairs(pairs.iter().copied())
}

// ============================================================================
// Validation Round Trips
// ============================================================================

#[tokio::test]
async fn test_validated_success() {
    let backend = MockBackend::new();
    let resolver = StatusResolver::new(backend.clone());

    let resolution = resolver
        .resolve(
            ResultRoute::Success,
            &callback(&[("val_id", "v-81"), ("tran_id", "tx-4481")]),
        )
        .await;

    assert_eq!(
        resolution,
        Resolution::Success {
            transaction_id: Some(TransactionId::new("tx-4481")),
        }
    );
    assert_eq!(backend.validation_calls(), 1);

    let requests = backend.validation_requests();
    let request = requests.first().unwrap();
    assert_eq!(request.val_id, "v-81");
    assert_eq!(request.tran_id, "tx-4481");
}

#[tokio::test]
async fn test_rejected_validation_uses_generic_reason() {
    let backend = MockBackend::new().with_verdict(VerdictBehavior::Reject);
    let resolver = StatusResolver::new(backend.clone());

    let resolution = resolver
        .resolve(
            ResultRoute::Success,
            &callback(&[("val_id", "v-81"), ("tran_id", "tx-4481")]),
        )
        .await;

    assert_eq!(
        resolution,
        Resolution::Failed {
            reason: GENERIC_FAILURE_MESSAGE.to_string(),
            redirect_delay: None,
        }
    );
    assert_eq!(backend.validation_calls(), 1);
}

#[tokio::test]
async fn test_transport_failure_is_terminal_without_retry() {
    let backend = MockBackend::new().with_verdict(VerdictBehavior::Fail);
    let resolver = StatusResolver::new(backend.clone());

    let resolution = resolver
        .resolve(
            ResultRoute::Failure,
            &callback(&[("val_id", "v-81"), ("tran_id", "tx-4481")]),
        )
        .await;

    assert_eq!(
        resolution,
        Resolution::Failed {
            reason: GENERIC_FAILURE_MESSAGE.to_string(),
            redirect_delay: Some(Duration::from_secs(3)),
        }
    );
    // One attempt, no retries.
    assert_eq!(backend.validation_calls(), 1);
}

#[tokio::test]
async fn test_each_resolution_is_at_most_one_call() {
    let backend = MockBackend::new();
    let resolver = StatusResolver::new(backend.clone());
    let cb = callback(&[("val_id", "v-81"), ("tran_id", "tx-4481")]);

    resolver.resolve(ResultRoute::Success, &cb).await;
    resolver.resolve(ResultRoute::Success, &cb).await;

    assert_eq!(backend.validation_calls(), 2);
}

// ============================================================================
// Short Circuits
// ============================================================================

#[tokio::test]
async fn test_gateway_decline_shown_verbatim_without_backend_call() {
    let backend = MockBackend::new();
    let resolver = StatusResolver::new(backend.clone());

    let resolution = resolver
        .resolve(ResultRoute::Failure, &callback(&[("error", "Card declined")]))
        .await;

    assert_eq!(
        resolution,
        Resolution::Failed {
            reason: "Card declined".to_string(),
            redirect_delay: None,
        }
    );
    assert_eq!(backend.validation_calls(), 0);
}

#[tokio::test]
async fn test_ambiguous_single_id_is_unknown() {
    let backend = MockBackend::new();
    let resolver = StatusResolver::new(backend.clone());

    let resolution = resolver
        .resolve(ResultRoute::Success, &callback(&[("tran_id", "tx-4481")]))
        .await;

    assert_eq!(resolution, Resolution::Unknown);
    assert_eq!(backend.validation_calls(), 0);
}

#[tokio::test]
async fn test_bare_redirects_trust_the_route() {
    let backend = MockBackend::new();
    let resolver = StatusResolver::new(backend.clone());

    let success = resolver
        .resolve(ResultRoute::Success, &GatewayCallback::default())
        .await;
    let failure = resolver
        .resolve(ResultRoute::Failure, &GatewayCallback::default())
        .await;

    assert_eq!(
        success,
        Resolution::Success {
            transaction_id: None,
        }
    );
    assert_eq!(
        failure,
        Resolution::Failed {
            reason: GENERIC_FAILURE_MESSAGE.to_string(),
            redirect_delay: None,
        }
    );
    assert_eq!(backend.validation_calls(), 0);
}

// ============================================================================
// After Resolution
// ============================================================================

#[tokio::test]
async fn test_paid_order_shows_up_in_history() {
    let email = fixtures::unique_email();
    let backend = MockBackend::new()
        .with_orders(
            email.as_str(),
            vec![fixtures::order_record(
                "64b1f0aa9c3d2e0001a7b5c4",
                &email,
                Decimal::new(19200, 2),
                "success",
                Some("tx-4481"),
                &["p1"],
            )],
        )
        .with_product(fixtures::product("p1", "Mug", Decimal::new(56, 0)));

    let resolver = StatusResolver::new(backend.clone());
    let resolution = resolver
        .resolve(
            ResultRoute::Success,
            &callback(&[("val_id", "v-81"), ("tran_id", "tx-4481")]),
        )
        .await;
    assert!(matches!(resolution, Resolution::Success { .. }));

    let history = HistoryService::new(backend.clone(), CurrencyCode::USD);
    let entries = history.load(&email).await.unwrap();

    let entry = entries.first().unwrap();
    assert_eq!(entry.reference, "tx-4481");
    assert_eq!(entry.status_label, "Completed");
    assert_eq!(entry.amount, "$192.00");
    assert_eq!(entry.placed_at, "Jan 22, 2024");
    assert_eq!(entry.products.len(), 1);
    assert_eq!(entry.products.first().unwrap().name, "Mug");
}
