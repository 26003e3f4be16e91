use serde::{Deserialize, Serialize};

/// User-facing notices raised by identity changes. Emitted as `session.notice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notice {
    /// A genuine new login kept the local carts instead of the account's copy.
    #[serde(rename_all = "camelCase")]
    LocalCartsPreserved {
        hand_items: usize,
        print_items: usize,
        /// Entries in the account's stored hand that were not loaded.
        account_hand_items: usize,
    },
    SignedOut,
}

impl Notice {
    pub const EVENT: &'static str = "session.notice";

    pub fn message(&self) -> String {
        match self {
            Notice::LocalCartsPreserved {
                hand_items,
                print_items,
                ..
            } => format!(
                "Kept your current hand ({} cards) and print list ({} cards) from this session.",
                hand_items, print_items
            ),
            Notice::SignedOut => "Signed out. Your hand and print list are still here.".to_string(),
        }
    }
}
