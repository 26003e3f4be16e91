use serde::{Deserialize, Serialize};

/// Who the session belongs to. `id == None` is the logged-out identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub id: Option<i64>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub display_name: String,
}

impl SessionIdentity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(id: i64, username: impl Into<String>) -> Self {
        let username = username.into();
        SessionIdentity {
            id: Some(id),
            display_name: username.clone(),
            username,
            role: "user".to_string(),
            email: String::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }
}
