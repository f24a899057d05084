//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::AccountId;
use ledger::InMemoryOrderStore;
use metrics_exporter_prometheus::PrometheusHandle;
use services::AccountProfile;
use tower::ServiceExt;

const ALICE: &str = "64ac1f0b9d3e2a7c5b8f0e1d";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (Router, api::Collaborators) {
    let store = InMemoryOrderStore::new();
    let (state, collaborators) = api::create_default_state(store);
    let app = api::create_app(state, get_metrics_handle());
    (app, collaborators)
}

fn checkout_payload(method: &str) -> serde_json::Value {
    serde_json::json!({
        "SanPham": [
            {"MaSanPham": "sku-1", "Gia": 750000, "SoLuong": 2}
        ],
        "TongTien": 1500000,
        "PhuongThucThanhToan": method,
        "DiaChi": {
            "DiaChiChiTiet": "12 Le Loi",
            "PhuongXa": "Ben Nghe",
            "QuanHuyen": "Q1",
            "TinhThanh": "HCM"
        },
        "ThongTinNhanHang": {
            "HoTen": "Nguyen Van A",
            "Email": "a@example.com",
            "SoDienThoai": "0900000001",
            "DiaChiChiTiet": "12 Le Loi",
            "PhuongXa": "Ben Nghe",
            "QuanHuyen": "Q1",
            "TinhThanh": "HCM"
        }
    })
}

fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn place_order(app: &Router, actor: Option<&str>, method: &str) -> serde_json::Value {
    let mut request = json_request("POST", "/checkout", &checkout_payload(method));
    if let Some(actor) = actor {
        request
            .headers_mut()
            .insert("x-user-id", actor.parse().unwrap());
    }
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_checkout_cod() {
    let (app, _) = setup();

    let json = place_order(&app, None, "COD").await;
    assert!(!json["orderId"].as_str().unwrap().is_empty());
    assert_eq!(json["requiresPayment"], false);
    assert_eq!(json["paymentMethod"], "COD");
    assert_eq!(json["order"]["status"], "pending");
    assert_eq!(json["order"]["paymentStatus"], "pending");
    assert_eq!(
        json["order"]["shippingAddress"],
        "12 Le Loi, Ben Nghe, Q1, HCM"
    );
}

#[tokio::test]
async fn test_checkout_vnpay_requires_payment() {
    let (app, _) = setup();

    let json = place_order(&app, None, "VNPAY").await;
    assert_eq!(json["requiresPayment"], true);
    assert_eq!(json["paymentMethod"], "VNPAY");
}

#[tokio::test]
async fn test_checkout_with_registered_actor() {
    let (app, _) = setup();

    let json = place_order(&app, Some(ALICE), "COD").await;
    assert_eq!(json["order"]["customer"], ALICE);
}

#[tokio::test]
async fn test_checkout_rejects_empty_cart() {
    let (app, _) = setup();

    let mut payload = checkout_payload("COD");
    payload["SanPham"] = serde_json::json!([]);
    let response = app
        .oneshot(json_request("POST", "/checkout", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("no items"));
}

#[tokio::test]
async fn test_guest_checkout_mints_token() {
    let (app, _) = setup();

    let response = app
        .oneshot(json_request(
            "POST",
            "/checkout/guest",
            &checkout_payload("COD"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(
        json["order"]["customer"]
            .as_str()
            .unwrap()
            .starts_with("guest-")
    );
}

#[tokio::test]
async fn test_guest_checkout_requires_recipient_fields() {
    let (app, _) = setup();

    let mut payload = checkout_payload("COD");
    payload["ThongTinNhanHang"] = serde_json::json!({"HoTen": "Nguyen Van A"});
    let response = app
        .oneshot(json_request("POST", "/checkout/guest", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("SoDienThoai"));
}

#[tokio::test]
async fn test_my_orders_requires_identity_header() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_my_orders_lists_own_orders_only() {
    let (app, _) = setup();
    place_order(&app, Some(ALICE), "COD").await;
    place_order(&app, None, "COD").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders")
                .header("x-user-id", ALICE)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["customer"], ALICE);
}

#[tokio::test]
async fn test_cancel_pending_then_reject_second_cancel() {
    let (app, _) = setup();
    let placed = place_order(&app, None, "COD").await;
    let id = placed["orderId"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/orders/{id}/cancel"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "cancelled");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/orders/{id}/cancel"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_list_paginates_and_filters() {
    let (app, _) = setup();
    place_order(&app, Some(ALICE), "COD").await;
    place_order(&app, None, "VNPAY").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/orders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["page"], 1);
    assert_eq!(json["limit"], 50);
    assert_eq!(json["items"].as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/orders?status=cancelled")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total"], 0);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/orders?status=bogus")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_list_rejects_out_of_range_pagination() {
    let (app, _) = setup();
    place_order(&app, None, "COD").await;

    for uri in [
        "/admin/orders?page=18446744073709551615",
        "/admin/orders?limit=100000",
    ] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_admin_detail_includes_order_code_and_profile() {
    let (app, collaborators) = setup();
    collaborators.accounts.insert(AccountProfile {
        id: AccountId::parse(ALICE).unwrap(),
        full_name: "Nguyen Van A".to_string(),
        username: "nva".to_string(),
        email: "nva@example.com".to_string(),
    });
    let placed = place_order(&app, Some(ALICE), "COD").await;
    let id = placed["orderId"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/admin/orders/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["orderCode"].as_str().unwrap().len(), 8);
    assert_eq!(json["customerName"], "Nguyen Van A");
    assert_eq!(json["customerEmail"], "nva@example.com");
    assert_eq!(json["requiresPayment"], false);

    // Unknown but well-formed id is a 404; malformed id is a 400.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/admin/orders/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/orders/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_update_enforces_transitions() {
    let (app, _) = setup();
    let placed = place_order(&app, None, "COD").await;
    let id = placed["orderId"].as_str().unwrap().to_string();

    // Skipping confirmation is rejected.
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/admin/orders/{id}"),
            &serde_json::json!({"status": "shipped"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Confirming with a shipping fee works.
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/admin/orders/{id}"),
            &serde_json::json!({"status": "confirmed", "shippingFee": 30000}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "confirmed");
    assert_eq!(json["shippingFee"], 30000);

    // An empty patch is rejected.
    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/admin/orders/{id}"),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_delete_is_idempotent() {
    let (app, _) = setup();
    let placed = place_order(&app, None, "COD").await;
    let id = placed["orderId"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/admin/orders/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/admin/orders/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_summary_and_top_customers() {
    let (app, collaborators) = setup();
    collaborators.accounts.insert(AccountProfile {
        id: AccountId::parse(ALICE).unwrap(),
        full_name: "Nguyen Van A".to_string(),
        username: "nva".to_string(),
        email: "nva@example.com".to_string(),
    });
    collaborators.catalog.insert("sku-1", "Ao thun", 3, 120);

    place_order(&app, Some(ALICE), "COD").await;
    place_order(&app, Some(ALICE), "COD").await;
    place_order(&app, None, "COD").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/stats/summary")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["totalOrders"], 3);
    assert_eq!(json["totalRevenue"], 4_500_000);
    assert_eq!(json["totalProducts"], 1);
    assert_eq!(json["totalCustomers"], 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/stats/top-customers?limit=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    let ranking = json.as_array().unwrap();
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0]["customerId"], ALICE);
    assert_eq!(ranking[0]["orderCount"], 2);
    assert_eq!(ranking[0]["name"], "Nguyen Van A");
    // The guest bucket ranks without decoration.
    assert!(ranking[1]["name"].is_null());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/stats/monthly?months=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    let trend = json.as_array().unwrap();
    assert_eq!(trend.len(), 1);
    assert_eq!(trend[0]["totalOrders"], 3);
}

#[tokio::test]
async fn test_stats_revenue_range() {
    let (app, _) = setup();
    place_order(&app, None, "COD").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/stats/revenue")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["totalOrders"], 1);
    assert_eq!(json["totalRevenue"], 1_500_000);

    // A window in the past excludes the order just placed.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/stats/revenue?start=2000-01-01T00:00:00Z&end=2000-12-31T23:59:59Z")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["totalOrders"], 0);
}

#[tokio::test]
async fn test_insufficient_stock_is_client_error() {
    let (app, collaborators) = setup();
    collaborators.stock.set_stock("sku-1", 1);

    let response = app
        .oneshot(json_request("POST", "/checkout", &checkout_payload("COD")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("stock"));

    assert_eq!(collaborators.stock.stock_of("sku-1"), Some(1));
}

#[tokio::test]
async fn test_stats_low_stock_and_top_selling() {
    let (app, collaborators) = setup();
    collaborators.catalog.insert("p1", "Ao thun", 2, 10);
    collaborators.catalog.insert("p2", "Quan jean", 40, 90);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/stats/low-stock")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["productId"], "p1");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/stats/top-selling?limit=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json[0]["productId"], "p2");
    assert_eq!(json[0]["unitsSold"], 90);
}
