use coinshop_core::AccountId;

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware; handlers pass it explicitly to services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountContext {
    account_id: AccountId,
}

impl AccountContext {
    pub fn new(account_id: AccountId) -> Self {
        Self { account_id }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }
}
