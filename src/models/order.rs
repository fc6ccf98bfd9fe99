use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum OrderStatus {
    Processed,
    Delivering,
    Delivered,
    Cancelled,
}

/// Which step of route resolution failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteFailureKind {
    GeocodeMiss,
    GeocodeTimeout,
    GraphFetch,
    NoPathFound,
}

/// Shortest walking path between the snapped endpoints. `path` runs from
/// the node nearest the origin to the node nearest the destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSummary {
    pub nodes: Vec<i64>,
    pub path: Vec<GeoPoint>,
    pub length_m: f64,
}

/// Resolution state carried on the order. Orders are stored immediately
/// with `Pending`; the route worker moves them to `Resolved` or `Failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RouteResolution {
    Pending,
    Resolved(RouteSummary),
    Failed {
        kind: RouteFailureKind,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// Sending establishment.
    pub sender: Uuid,
    pub recipient: String,
    pub status: OrderStatus,
    pub origin: String,
    pub destination: String,
    pub route_link: Option<String>,
    pub route: RouteResolution,
    pub courier: Option<Uuid>,
    pub courier_position: Option<GeoPoint>,
    /// Set once at creation, never updated.
    pub created_at: DateTime<Utc>,
    pub comment: Option<String>,
}

/// Broadcast whenever the route worker finishes an order, one way or the
/// other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEvent {
    pub order_id: Uuid,
    pub route_link: Option<String>,
    pub resolution: RouteResolution,
}
