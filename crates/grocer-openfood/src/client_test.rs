use super::*;

fn test_client(base_url: &str) -> OpenFoodClient {
    OpenFoodClient::with_base_url(5, "grocer-test/0.1", base_url)
        .expect("client construction should not fail")
}

#[test]
fn build_url_joins_path_onto_base() {
    let client = test_client("https://world.openfoodfacts.org");
    let url = client
        .build_url("api/v2/product/123.json", &[("fields", "code")])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://world.openfoodfacts.org/api/v2/product/123.json?fields=code"
    );
}

#[test]
fn build_url_keeps_base_path_prefix() {
    let client = test_client("http://localhost:8080/off/");
    let url = client.build_url("cgi/search.pl", &[("json", "1")]).unwrap();
    assert_eq!(url.as_str(), "http://localhost:8080/off/cgi/search.pl?json=1");
}

#[test]
fn build_url_encodes_search_terms() {
    let client = test_client("https://world.openfoodfacts.org");
    let url = client
        .build_url("cgi/search.pl", &[("search_terms", "rice & beans")])
        .unwrap();
    assert!(
        url.as_str().contains("rice+%26+beans") || url.as_str().contains("rice%20%26%20beans"),
        "query param should be percent-encoded: {url}"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = OpenFoodClient::with_base_url(5, "grocer-test/0.1", "not a url");
    assert!(matches!(result, Err(OpenFoodError::InvalidBaseUrl { .. })));
}

#[tokio::test]
async fn non_digit_barcode_is_rejected_without_request() {
    let client = test_client("http://127.0.0.1:1");
    let result = client.get_product("abc-123").await;
    assert!(matches!(result, Err(OpenFoodError::InvalidBarcode(_))));
}

#[tokio::test]
async fn blank_search_returns_empty_without_request() {
    let client = test_client("http://127.0.0.1:1");
    let result = client.search("   ", 5).await.unwrap();
    assert!(result.is_empty());
}
