//! Milestone stage table handler

use axum::response::IntoResponse;
use serde::Serialize;
use sm_milestones::{stage_table, StageInfo};

use crate::extractors::{HalResponse, Link};

#[derive(Serialize)]
struct StageCollection {
    #[serde(rename = "_type")]
    type_name: &'static str,
    total: usize,
    count: usize,
    elements: Vec<StageInfo>,
    #[serde(rename = "_links")]
    links: StageCollectionLinks,
}

#[derive(Serialize)]
struct StageCollectionLinks {
    #[serde(rename = "self")]
    self_link: Link,
}

/// GET /api/v1/milestones/stages
pub async fn list_stages() -> impl IntoResponse {
    let elements = stage_table();
    HalResponse(StageCollection {
        type_name: "Collection",
        total: elements.len(),
        count: elements.len(),
        elements,
        links: StageCollectionLinks {
            self_link: Link::new("/api/v1/milestones/stages"),
        },
    })
}
