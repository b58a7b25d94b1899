use serde::{Deserialize, Serialize};

/// The signed-in traveler's profile, persisted as its own store record.
///
/// Authentication itself is external; the engine only keeps the profile so
/// the trip collection can be attributed to a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub token: Option<String>,
}

impl User {
    pub fn new(id: String, name: String, email: String) -> Self {
        Self {
            id,
            name,
            email,
            token: None,
        }
    }
}
