use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Restaurant or shop that places delivery orders. Photos and documentation
/// are stored as reference paths under the media root; uploads are handled
/// elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Establishment {
    pub id: Uuid,
    pub name: String,
    pub photo_path: Option<String>,
    pub address: String,
    pub phone: String,
    pub verified: bool,
    pub business_id: String,
    pub work_schedule: String,
    pub legal_info: String,
    pub documentation_path: Option<String>,
}

/// "This courier works for this establishment." The courier side is
/// nullable: a staffing slot can exist before anyone fills it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstCourier {
    pub id: Uuid,
    pub establishment_id: Uuid,
    pub courier_id: Option<Uuid>,
}
