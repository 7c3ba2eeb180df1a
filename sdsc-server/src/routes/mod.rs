//! Route table for the REST surface (§6, §6.1).

pub mod controllers;
pub mod filters;
pub mod object_types;
pub mod policies;
pub mod storage_nodes;
pub mod tenants_groups;
pub mod workload_metrics;

// Layer 2: Third-party crate imports
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

// Layer 3: Internal module imports
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/filters/dsl",
            get(filters::list_aliases).post(filters::create_alias),
        )
        .route(
            "/filters/dsl/{name}",
            get(filters::get_alias)
                .put(filters::update_alias)
                .delete(filters::delete_alias),
        )
        .route(
            "/modules/workload_metrics",
            get(workload_metrics::list).post(workload_metrics::upload),
        )
        .route(
            "/modules/workload_metrics/{id}",
            get(workload_metrics::get_one)
                .put(workload_metrics::toggle)
                .delete(workload_metrics::delete),
        )
        .route(
            "/nodes",
            get(storage_nodes::list).post(storage_nodes::create),
        )
        .route(
            "/nodes/{id}",
            get(storage_nodes::get_one)
                .put(storage_nodes::update)
                .delete(storage_nodes::delete),
        )
        .route(
            "/tenants_groups",
            get(tenants_groups::list).post(tenants_groups::create),
        )
        .route(
            "/tenants_groups/{gid}",
            get(tenants_groups::get_one)
                .put(tenants_groups::replace)
                .delete(tenants_groups::delete),
        )
        .route(
            "/tenants_groups/{gid}/{tid}",
            axum::routing::delete(tenants_groups::remove_member),
        )
        .route(
            "/object_types",
            get(object_types::list).post(object_types::create),
        )
        .route(
            "/object_types/{name}",
            get(object_types::get_one)
                .put(object_types::replace)
                .delete(object_types::delete),
        )
        .route(
            "/object_types/{name}/{ext}",
            axum::routing::delete(object_types::remove_extension),
        )
        .route(
            "/policies",
            get(policies::list).post(policies::submit),
        )
        .route(
            "/policies/static/{tenant}/{policy_id}",
            get(policies::get_static)
                .put(policies::put_static)
                .delete(policies::delete_static),
        )
        .route(
            "/policies/dynamic/{id}",
            axum::routing::delete(policies::delete_dynamic),
        )
        .route(
            "/controllers",
            get(controllers::list).post(controllers::create),
        )
        .route(
            "/controllers/{id}",
            get(controllers::get_one)
                .put(controllers::update)
                .delete(controllers::delete),
        )
        .route(
            "/controllers/{id}/data",
            post(controllers::tick),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
