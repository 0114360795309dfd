use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use ruleboard_core::rules::{self, CatalogStats, RuleFilter};
use ruleboard_core::{FlatFileStore, Rule, RuleType, Section, StoreError};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::with_store;
use crate::error::ApiError;
use crate::SharedState;

/// Catalog filters. Unrecognised section or type values (such as `All`) do not filter.
#[derive(Debug, Default, Deserialize)]
pub struct RuleQuery {
    #[serde(default)]
    pub search: String,
    pub section: Option<String>,
    #[serde(rename = "type")]
    pub rule_type: Option<String>,
}

impl From<RuleQuery> for RuleFilter {
    fn from(q: RuleQuery) -> Self {
        RuleFilter {
            search: q.search,
            section: q.section.as_deref().and_then(Section::parse),
            rule_type: q.rule_type.as_deref().and_then(RuleType::parse),
        }
    }
}

/// GET /api/rules
pub async fn list(
    State(state): State<SharedState>,
    Query(query): Query<RuleQuery>,
) -> Result<Json<Vec<Rule>>, ApiError> {
    let all = with_store(&state, FlatFileStore::load_rules).await?;
    let filter = RuleFilter::from(query);
    Ok(Json(rules::filter(&all, &filter).into_iter().cloned().collect()))
}

/// POST /api/rules
pub async fn replace_all(
    State(state): State<SharedState>,
    Json(rules): Json<Vec<Rule>>,
) -> Result<impl IntoResponse, ApiError> {
    let count = rules.len();
    with_store(&state, move |store| store.save_rules(&rules))
        .await?
        .map_err(ApiError::Save)?;
    info!(count, "rules catalog replaced");
    Ok(Json(json!({ "success": true })))
}

/// PUT /api/rules/:id
pub async fn update_one(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(mut rule): Json<Rule>,
) -> Result<Json<Rule>, ApiError> {
    rule.id = id;
    let update = rule.clone();
    match with_store(&state, move |store| rules::save_one(store, update)).await? {
        Ok(_) => Ok(Json(rule)),
        Err(StoreError::UnknownRule(id)) => Err(ApiError::RuleNotFound(id)),
        Err(e) => Err(ApiError::Save(e)),
    }
}

/// GET /api/rules/stats
pub async fn stats(State(state): State<SharedState>) -> Result<Json<CatalogStats>, ApiError> {
    let all = with_store(&state, FlatFileStore::load_rules).await?;
    Ok(Json(rules::stats(&all)))
}
