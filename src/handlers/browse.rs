// src/handlers/browse.rs
//
// Leituras simples para conferir o resultado de uma importação.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{common::error::AppError, config::AppState};

pub async fn list_clients(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let clients = app_state.clients.list_all().await?;
    Ok((StatusCode::OK, Json(clients)))
}

pub async fn list_vehicles(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let vehicles = app_state.vehicles.list_all().await?;
    Ok((StatusCode::OK, Json(vehicles)))
}

pub async fn list_service_orders(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.orders.list_all().await?;
    Ok((StatusCode::OK, Json(orders)))
}

pub async fn list_inventory_items(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.inventory.list_all().await?;
    Ok((StatusCode::OK, Json(items)))
}
