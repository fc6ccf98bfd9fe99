use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::engine::queue::RouteJob;
use crate::geo::cache::GraphCache;
use crate::geo::geocode::Geocode;
use crate::models::courier::Courier;
use crate::models::establishment::{EstCourier, Establishment};
use crate::models::order::{Order, RouteEvent};
use crate::models::workforce::{Penalty, Salary, Schedule};
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub establishments: DashMap<Uuid, Establishment>,
    pub couriers: DashMap<Uuid, Courier>,
    pub est_couriers: DashMap<Uuid, EstCourier>,
    pub orders: DashMap<Uuid, Order>,
    pub penalties: DashMap<Uuid, Penalty>,
    pub schedules: DashMap<Uuid, Schedule>,
    pub salaries: DashMap<Uuid, Salary>,
    pub route_tx: mpsc::Sender<RouteJob>,
    pub route_events_tx: broadcast::Sender<RouteEvent>,
    pub metrics: Metrics,
    pub geocoder: Arc<dyn Geocode>,
    pub graph: GraphCache,
    /// Administrative area whose street network routes are computed on.
    pub area: String,
}

impl AppState {
    pub fn new(
        geocoder: Arc<dyn Geocode>,
        graph: GraphCache,
        area: impl Into<String>,
        route_queue_size: usize,
        event_buffer_size: usize,
    ) -> (Self, mpsc::Receiver<RouteJob>) {
        let (route_tx, route_rx) = mpsc::channel(route_queue_size);
        let (route_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        (
            Self {
                establishments: DashMap::new(),
                couriers: DashMap::new(),
                est_couriers: DashMap::new(),
                orders: DashMap::new(),
                penalties: DashMap::new(),
                schedules: DashMap::new(),
                salaries: DashMap::new(),
                route_tx,
                route_events_tx,
                metrics: Metrics::new(),
                geocoder,
                graph,
                area: area.into(),
            },
            route_rx,
        )
    }

    pub fn username_taken(&self, username: &str) -> bool {
        self.couriers
            .iter()
            .any(|entry| entry.value().username == username)
    }

    /// Removes the establishment together with its staffing links, sent
    /// orders, and schedules. Returns false when the id is unknown.
    pub fn delete_establishment(&self, id: Uuid) -> bool {
        if self.establishments.remove(&id).is_none() {
            return false;
        }

        self.est_couriers
            .retain(|_, link| link.establishment_id != id);
        self.orders.retain(|_, order| order.sender != id);
        self.schedules
            .retain(|_, schedule| schedule.establishment_id != id);
        true
    }

    /// Removes the courier together with its staffing links, assigned
    /// orders, penalties, schedules, and salary records.
    pub fn delete_courier(&self, id: Uuid) -> bool {
        if self.couriers.remove(&id).is_none() {
            return false;
        }

        self.est_couriers
            .retain(|_, link| link.courier_id != Some(id));
        self.orders.retain(|_, order| order.courier != Some(id));
        self.penalties
            .retain(|_, penalty| penalty.courier_id != id);
        self.schedules
            .retain(|_, schedule| schedule.courier_id != id);
        self.salaries.retain(|_, salary| salary.courier_id != id);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::AppState;
    use crate::geo::cache::GraphCache;
    use crate::geo::geocode::{Geocode, GeocodeError};
    use crate::geo::graph::StreetGraph;
    use crate::geo::overpass::{FetchGraph, GraphFetchError};
    use crate::geo::GeoPoint;
    use crate::models::courier::Courier;
    use crate::models::establishment::{EstCourier, Establishment};
    use crate::models::order::{Order, OrderStatus, RouteResolution};
    use crate::models::workforce::{Penalty, Salary, Schedule};

    struct NoGeocoder;

    #[async_trait]
    impl Geocode for NoGeocoder {
        async fn geocode(&self, _address: &str) -> Result<GeoPoint, GeocodeError> {
            Err(GeocodeError::NoMatch)
        }
    }

    struct EmptySource;

    #[async_trait]
    impl FetchGraph for EmptySource {
        async fn fetch(&self, _area: &str) -> Result<StreetGraph, GraphFetchError> {
            Ok(StreetGraph::new())
        }
    }

    fn state() -> AppState {
        let cache = GraphCache::new(Arc::new(EmptySource));
        let (state, _rx) = AppState::new(Arc::new(NoGeocoder), cache, "Karaganda", 16, 16);
        state
    }

    fn establishment(id: Uuid) -> Establishment {
        Establishment {
            id,
            name: "Lighthouse Cafe".to_string(),
            photo_path: None,
            address: "Abay Street 10".to_string(),
            phone: "77001234567".to_string(),
            verified: true,
            business_id: "123456789012".to_string(),
            work_schedule: "09:00-21:00".to_string(),
            legal_info: "LLP Lighthouse".to_string(),
            documentation_path: None,
        }
    }

    fn courier(id: Uuid, username: &str) -> Courier {
        Courier {
            id,
            full_name: "Aslan Bekov".to_string(),
            email: "aslan@example.com".to_string(),
            phone: "77007654321".to_string(),
            photo_path: None,
            username: username.to_string(),
            password: "secret".to_string(),
            user_account: None,
            active: true,
        }
    }

    fn order(id: Uuid, sender: Uuid, courier: Option<Uuid>) -> Order {
        Order {
            id,
            sender,
            recipient: "B. Receiver".to_string(),
            status: OrderStatus::Processed,
            origin: "Abay Street 10".to_string(),
            destination: "Bukhar-Zhyrau Avenue 45".to_string(),
            route_link: None,
            route: RouteResolution::Pending,
            courier,
            courier_position: None,
            created_at: Utc::now(),
            comment: None,
        }
    }

    #[test]
    fn deleting_establishment_cascades() {
        let state = state();
        let est_id = Uuid::from_u128(1);
        let other_est = Uuid::from_u128(2);
        let courier_id = Uuid::from_u128(3);

        state.establishments.insert(est_id, establishment(est_id));
        state
            .establishments
            .insert(other_est, establishment(other_est));
        state.couriers.insert(courier_id, courier(courier_id, "aslan"));

        let link = EstCourier {
            id: Uuid::from_u128(10),
            establishment_id: est_id,
            courier_id: Some(courier_id),
        };
        state.est_couriers.insert(link.id, link);

        let kept_link = EstCourier {
            id: Uuid::from_u128(11),
            establishment_id: other_est,
            courier_id: None,
        };
        state.est_couriers.insert(kept_link.id, kept_link);

        let sent = order(Uuid::from_u128(20), est_id, None);
        state.orders.insert(sent.id, sent);
        let kept_order = order(Uuid::from_u128(21), other_est, None);
        state.orders.insert(kept_order.id, kept_order);

        let shift = Schedule {
            id: Uuid::from_u128(30),
            courier_id,
            establishment_id: est_id,
            date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            skip: false,
        };
        state.schedules.insert(shift.id, shift);

        assert!(state.delete_establishment(est_id));

        assert!(state.establishments.get(&est_id).is_none());
        assert_eq!(state.est_couriers.len(), 1);
        assert_eq!(state.orders.len(), 1);
        assert!(state.schedules.is_empty());
        // The courier itself survives.
        assert!(state.couriers.get(&courier_id).is_some());
    }

    #[test]
    fn deleting_courier_cascades() {
        let state = state();
        let est_id = Uuid::from_u128(1);
        let courier_id = Uuid::from_u128(3);
        let other_courier = Uuid::from_u128(4);

        state.establishments.insert(est_id, establishment(est_id));
        state.couriers.insert(courier_id, courier(courier_id, "aslan"));
        state
            .couriers
            .insert(other_courier, courier(other_courier, "dina"));

        let link = EstCourier {
            id: Uuid::from_u128(10),
            establishment_id: est_id,
            courier_id: Some(courier_id),
        };
        state.est_couriers.insert(link.id, link);

        let assigned = order(Uuid::from_u128(20), est_id, Some(courier_id));
        state.orders.insert(assigned.id, assigned);
        let unassigned = order(Uuid::from_u128(21), est_id, None);
        state.orders.insert(unassigned.id, unassigned);

        let penalty = Penalty {
            id: Uuid::from_u128(40),
            courier_id,
            penalty_type: "late delivery".to_string(),
            amount: Decimal::new(150_000, 2),
            reason: "order #20 delivered 40 minutes late".to_string(),
        };
        state.penalties.insert(penalty.id, penalty);

        let salary = Salary {
            id: Uuid::from_u128(50),
            courier_id,
            working_hours: 160,
            rate_per_hour: 1500,
        };
        state.salaries.insert(salary.id, salary);

        assert!(state.delete_courier(courier_id));

        assert!(state.couriers.get(&courier_id).is_none());
        assert!(state.est_couriers.is_empty());
        assert_eq!(state.orders.len(), 1);
        assert!(state.penalties.is_empty());
        assert!(state.salaries.is_empty());
        assert!(state.couriers.get(&other_courier).is_some());
    }

    #[test]
    fn deleting_unknown_ids_is_a_no_op() {
        let state = state();
        assert!(!state.delete_establishment(Uuid::from_u128(99)));
        assert!(!state.delete_courier(Uuid::from_u128(99)));
    }

    #[test]
    fn username_lookup_sees_existing_couriers() {
        let state = state();
        let id = Uuid::from_u128(1);
        state.couriers.insert(id, courier(id, "aslan"));

        assert!(state.username_taken("aslan"));
        assert!(!state.username_taken("dina"));
    }
}
