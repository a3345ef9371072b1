use reqwest::StatusCode;
use serde_json::json;

use storefront_api::app::build_app;
use storefront_api::app::services::AppServices;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let app = build_app(AppServices::in_memory());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_category(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
) -> serde_json::Value {
    let res = client
        .post(format!("{}/categories", base_url))
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn create_product(
    client: &reqwest::Client,
    base_url: &str,
    category_id: &str,
    name: &str,
    price_cents: i64,
) -> serde_json::Value {
    let res = client
        .post(format!("{}/products", base_url))
        .json(&json!({
            "category_id": category_id,
            "name": name,
            "price_cents": price_cents,
            "stock_quantity": 5,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn healthz_is_open() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/healthz", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn catalog_lifecycle_create_update_list_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let category = create_category(&client, &srv.base_url, "Lighting").await;
    let category_id = category["id"].as_str().unwrap().to_string();

    let product = create_product(&client, &srv.base_url, &category_id, "Desk Lamp", 2500).await;
    let product_id = product["id"].as_str().unwrap().to_string();
    assert_eq!(product["status"], "active");
    assert_eq!(product["is_available"], true);

    // Update the price.
    let res = client
        .put(format!("{}/products/{}", srv.base_url, product_id))
        .json(&json!({ "price_cents": 1999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["price_cents"], 1999);

    // Listing under the category filter returns exactly the updated record.
    let res = client
        .get(format!(
            "{}/products?category_id={}",
            srv.base_url, category_id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["total_count"], 1);
    assert_eq!(page["items"][0]["id"], product_id.as_str());
    assert_eq!(page["items"][0]["price_cents"], 1999);

    // An order pins the product in place.
    let res = client
        .post(format!("{}/orders", srv.base_url))
        .json(&json!({ "product_id": product_id, "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let order: serde_json::Value = res.json().await.unwrap();
    let order_id = order["id"].as_str().unwrap().to_string();
    assert_eq!(order["status"], "pending");

    let res = client
        .delete(format!("{}/products/{}", srv.base_url, product_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .delete(format!("{}/categories/{}", srv.base_url, category_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Tear down bottom-up; each delete then succeeds.
    for url in [
        format!("{}/orders/{}", srv.base_url, order_id),
        format!("{}/products/{}", srv.base_url, product_id),
        format!("{}/categories/{}", srv.base_url, category_id),
    ] {
        let res = client.delete(&url).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    let res = client
        .get(format!("{}/products/{}", srv.base_url, product_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_category_name_conflicts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_category(&client, &srv.base_url, "Lighting").await;
    let res = client
        .post(format!("{}/categories", srv.base_url))
        .json(&json!({ "name": "Lighting" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn validation_errors_are_bad_requests() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let category = create_category(&client, &srv.base_url, "Lighting").await;
    let category_id = category["id"].as_str().unwrap();

    let res = client
        .post(format!("{}/products", srv.base_url))
        .json(&json!({
            "category_id": category_id,
            "name": "Lamp",
            "price_cents": -1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    // A product referencing an unknown category is also a validation error.
    let res = client
        .post(format!("{}/products", srv.base_url))
        .json(&json!({
            "category_id": uuid::Uuid::now_v7().to_string(),
            "name": "Lamp",
            "price_cents": 100,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_ids_are_rejected_up_front() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/products/not-a-uuid", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");

    let res = client
        .get(format!(
            "{}/categories/{}",
            srv.base_url,
            uuid::Uuid::now_v7()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inverted_price_range_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/products?min_price=1000&max_price=500",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_range");
}

#[tokio::test]
async fn unknown_sort_field_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/products?sort=-weight", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_sort_field");
}

#[tokio::test]
async fn pagination_envelope_is_consistent() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let category = create_category(&client, &srv.base_url, "Lighting").await;
    let category_id = category["id"].as_str().unwrap().to_string();
    for i in 0..12 {
        create_product(
            &client,
            &srv.base_url,
            &category_id,
            &format!("Lamp {i:02}"),
            1000 + i,
        )
        .await;
    }

    let res = client
        .get(format!(
            "{}/products?sort=name&page=3&page_size=5",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["page"], 3);
    assert_eq!(page["page_size"], 5);
    assert_eq!(page["total_count"], 12);
    assert_eq!(page["total_pages"], 3);
    assert_eq!(page["has_next"], false);
    assert_eq!(page["has_previous"], true);
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Lamp 10");
    assert_eq!(items[1]["name"], "Lamp 11");
}

#[tokio::test]
async fn page_below_one_clamps_and_oversized_page_size_caps() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_category(&client, &srv.base_url, "Lighting").await;

    let res = client
        .get(format!("{}/categories?page=0", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["page"], 1);
    assert_eq!(page["total_count"], 1);

    let res = client
        .get(format!("{}/categories?page_size=100000", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["page_size"], 100);

    let res = client
        .get(format!("{}/categories?page=two", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_page");
}

#[tokio::test]
async fn empty_listing_reports_page_one() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/orders?page=7", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["items"].as_array().unwrap().len(), 0);
    assert_eq!(page["page"], 1);
    assert_eq!(page["total_count"], 0);
    assert_eq!(page["total_pages"], 0);
    assert_eq!(page["has_next"], false);
    assert_eq!(page["has_previous"], false);
}

#[tokio::test]
async fn unknown_query_params_are_ignored() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_category(&client, &srv.base_url, "Lighting").await;
    let res = client
        .get(format!(
            "{}/categories?flavor=strawberry&name=Lighting",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["total_count"], 1);
}

#[tokio::test]
async fn contains_filter_matches_case_insensitively() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let category = create_category(&client, &srv.base_url, "Lighting").await;
    let category_id = category["id"].as_str().unwrap().to_string();
    create_product(&client, &srv.base_url, &category_id, "Desk Lamp", 2500).await;
    create_product(&client, &srv.base_url, &category_id, "Floor Lamp", 4500).await;
    create_product(&client, &srv.base_url, &category_id, "Ceiling Fan", 8900).await;

    let res = client
        .get(format!("{}/products?name_contains=lamp", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["total_count"], 2);
}
