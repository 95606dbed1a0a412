use super::common::{
    client, content_type_for, image_bytes, spawn_gateway, spawn_upstream, IMAGE_LEN, LARGE_LEN,
};
use serde_json::{json, Value};

async fn download(gateway_url: &str, image_url: &str) -> reqwest::Response {
    client()
        .get(format!("{}/api/download-image", gateway_url))
        .query(&[("url", image_url)])
        .send()
        .await
        .expect("Failed to send request")
}

#[test_log::test(tokio::test)]
async fn test_download_png_round_trip() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway().await;

    let response = download(&gateway.base_url, &format!("{}/image/png", upstream)).await;
    assert_eq!(response.status(), 200);

    let headers = response.headers().clone();
    assert_eq!(headers["content-type"], "image/png");
    assert_eq!(
        headers["content-disposition"],
        "attachment; filename=\"image.png\""
    );
    assert_eq!(headers["x-file-extension"], "png");
    assert!(headers.contains_key("x-request-id"));

    let body = response.bytes().await.expect("Failed to read body");
    assert_eq!(body.as_ref(), image_bytes("png", IMAGE_LEN).as_slice());
}

#[tokio::test]
async fn test_extension_mapping() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway().await;

    let cases = [
        ("jpeg", "jpg"),
        ("jpg", "jpg"),
        ("gif", "gif"),
        ("png", "png"),
        ("webp", "png"),
        ("bin", "png"),
    ];

    for (kind, expected) in cases {
        let response = download(&gateway.base_url, &format!("{}/image/{}", upstream, kind)).await;
        assert_eq!(response.status(), 200, "kind {}", kind);
        assert_eq!(response.headers()["x-file-extension"], expected, "kind {}", kind);
        assert_eq!(
            response.headers()["content-type"],
            content_type_for(kind),
            "kind {}",
            kind
        );
        assert_eq!(
            response.headers()["content-disposition"],
            format!("attachment; filename=\"image.{}\"", expected).as_str()
        );
    }
}

#[tokio::test]
async fn test_missing_url_is_rejected() {
    let gateway = spawn_gateway().await;

    for path in ["/api/download-image", "/api/download-image?url=", "/api/download-image?other=1"] {
        let response = client()
            .get(gateway.url(path))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 400, "{}", path);
        let body: Value = response.json().await.expect("Body should be JSON");
        assert_eq!(body, json!({ "error": "Image URL is required" }));
    }
}

#[test_log::test(tokio::test)]
async fn test_unreachable_host_is_opaque_500() {
    let gateway = spawn_gateway().await;

    for url in ["http://127.0.0.1:1/image.png", "not a url at all"] {
        let response = download(&gateway.base_url, url).await;
        assert_eq!(response.status(), 500, "{}", url);
        let body: Value = response.json().await.expect("Body should be JSON");
        assert_eq!(body, json!({ "error": "Error downloading image" }));
    }
}

#[tokio::test]
async fn test_missing_content_type_is_bad_gateway() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway().await;

    let response = download(&gateway.base_url, &format!("{}/no-content-type", upstream)).await;
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.expect("Body should be JSON");
    assert_eq!(body["error"], "Error downloading image");
}

#[tokio::test]
async fn test_upstream_error_status_is_still_relayed() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway().await;

    let response = download(&gateway.base_url, &format!("{}/not-found", upstream)).await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["x-file-extension"], "png");
    assert_eq!(response.text().await.unwrap(), "<h1>gone</h1>");
}

#[tokio::test]
async fn test_large_streamed_body_is_byte_exact() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway().await;

    let response = download(&gateway.base_url, &format!("{}/large", upstream)).await;
    assert_eq!(response.status(), 200);
    let body = response.bytes().await.expect("Failed to read body");
    assert_eq!(body.len(), LARGE_LEN);
    assert!(body.as_ref() == image_bytes("large", LARGE_LEN).as_slice());

    let metrics = gateway.wait_for_metrics("/api/download-image").await;
    assert_eq!(metrics.response_size, LARGE_LEN);
    assert_eq!(metrics.status_code, 200);
    assert_eq!(metrics.file_extension.as_deref(), Some("png"));
}

#[test_log::test(tokio::test)]
async fn test_stream_error_before_first_byte_is_500() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway().await;

    let response = download(&gateway.base_url, &format!("{}/first-error", upstream)).await;
    assert_eq!(response.status(), 500);
    assert!(response.headers().get("content-disposition").is_none());
    let body: Value = response.json().await.expect("Body should be JSON");
    assert_eq!(body, json!({ "error": "Error downloading image" }));
}

#[test_log::test(tokio::test)]
async fn test_broken_upstream_stream_truncates_body() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway().await;

    // The first chunk arrives intact, so headers are committed before the failure.
    let response = download(&gateway.base_url, &format!("{}/broken", upstream)).await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["x-file-extension"], "gif");
    assert!(
        response.bytes().await.is_err(),
        "truncated transfer should surface as an error"
    );
}

#[tokio::test]
async fn test_error_bodies_keep_content_length() {
    let gateway = spawn_gateway().await;

    let response = client()
        .get(gateway.url("/api/download-image"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let content_length: usize = response.headers()["content-length"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    let body = response.bytes().await.unwrap();
    assert_eq!(content_length, body.len());

    let metrics = gateway.wait_for_metrics("/api/download-image").await;
    assert_eq!(metrics.status_code, 400);
    assert_eq!(metrics.response_size, body.len());
}

#[tokio::test]
async fn test_cors_exposes_download_headers() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway().await;

    let response = client()
        .get(gateway.url("/api/download-image"))
        .query(&[("url", format!("{}/image/gif", upstream))])
        .header("origin", "http://studio.example")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    let exposed = response.headers()["access-control-expose-headers"]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("content-disposition"), "{}", exposed);
    assert!(exposed.contains("x-file-extension"), "{}", exposed);
}

#[tokio::test]
async fn test_concurrent_downloads_do_not_interfere() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway().await;

    let kinds = ["jpeg", "gif", "png", "webp", "jpg", "gif", "jpeg", "png"];
    let handles: Vec<_> = kinds
        .iter()
        .map(|kind| {
            let gateway_url = gateway.base_url.clone();
            let image_url = format!("{}/image/{}", upstream, kind);
            let kind = kind.to_string();
            tokio::spawn(async move {
                let response = download(&gateway_url, &image_url).await;
                let extension = response.headers()["x-file-extension"]
                    .to_str()
                    .unwrap()
                    .to_string();
                let content_type = response.headers()["content-type"]
                    .to_str()
                    .unwrap()
                    .to_string();
                let body = response.bytes().await.unwrap();
                (kind, extension, content_type, body)
            })
        })
        .collect();

    for handle in handles {
        let (kind, extension, content_type, body) = handle.await.unwrap();
        let expected_extension = match kind.as_str() {
            "jpeg" | "jpg" => "jpg",
            "gif" => "gif",
            _ => "png",
        };
        assert_eq!(extension, expected_extension, "kind {}", kind);
        assert_eq!(content_type, content_type_for(&kind));
        assert!(body.as_ref() == image_bytes(&kind, IMAGE_LEN).as_slice(), "kind {}", kind);
    }
}
