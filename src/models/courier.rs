use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Courier {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub photo_path: Option<String>,
    /// Unique login name. Credentials are opaque here; the auth flow lives
    /// in the surrounding platform.
    pub username: String,
    pub password: String,
    /// Optional one-to-one link to an external user account.
    pub user_account: Option<Uuid>,
    pub active: bool,
}
