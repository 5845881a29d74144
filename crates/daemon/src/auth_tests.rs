// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use axum::body::Body;
use axum::http::Request;

async fn extract(req: Request<Body>) -> OwnerId {
    let (mut parts, _) = req.into_parts();
    ExtractOwner::from_request_parts(&mut parts, &()).await.unwrap().0
}

#[tokio::test]
async fn x_owner_header_wins() {
    let req = Request::builder()
        .header("X-Owner", "acme")
        .header("authorization", "Bearer whatever")
        .body(Body::empty())
        .unwrap();
    assert_eq!(extract(req).await.as_str(), "acme");
}

#[tokio::test]
async fn bearer_alone_falls_back_to_default_owner() {
    let req = Request::builder().header("authorization", "Bearer some-token").body(Body::empty()).unwrap();
    assert_eq!(extract(req).await.as_str(), OwnerId::DEFAULT);
}

#[tokio::test]
async fn no_headers_defaults_to_default_owner() {
    let req = Request::builder().body(Body::empty()).unwrap();
    assert_eq!(extract(req).await.as_str(), OwnerId::DEFAULT);
}

#[tokio::test]
async fn empty_x_owner_header_falls_back_to_default() {
    let req = Request::builder().header("X-Owner", "").body(Body::empty()).unwrap();
    assert_eq!(extract(req).await.as_str(), OwnerId::DEFAULT);
}
