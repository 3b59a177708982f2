//! Ledger domain models: accounts (money containers) and categories
//! (transaction classifiers). Every record is owned by exactly one user.

/// Default category colour when the client sends none.
pub const DEFAULT_CATEGORY_COLOR: &str = "red";

/// Default category symbol when the client sends none.
pub const DEFAULT_CATEGORY_SYMBOL: &str = "Bank Symbol";

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub currency: String,
    pub description: String,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub name: String,
    pub currency: String,
    pub description: String,
    pub balance: f64,
}

impl NewAccount {
    /// Attach ids assigned by the store.
    pub fn into_account(self, id: String, owner_id: String) -> Account {
        Account {
            id,
            owner_id,
            name: self.name,
            currency: self.currency,
            description: self.description,
            balance: self.balance,
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub balance: Option<f64>,
}

impl AccountUpdate {
    pub fn apply(&self, account: &mut Account) {
        if let Some(name) = &self.name {
            account.name = name.clone();
        }
        if let Some(currency) = &self.currency {
            account.currency = currency.clone();
        }
        if let Some(description) = &self.description {
            account.description = description.clone();
        }
        if let Some(balance) = self.balance {
            account.balance = balance;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub category_type: String,
    pub description: String,
    pub color: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub category_type: String,
    pub description: String,
    pub color: String,
    pub symbol: String,
}

impl NewCategory {
    /// Attach ids assigned by the store.
    pub fn into_category(self, id: String, owner_id: String) -> Category {
        Category {
            id,
            owner_id,
            name: self.name,
            category_type: self.category_type,
            description: self.description,
            color: self.color,
            symbol: self.symbol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_only_touches_given_fields() {
        let mut account = NewAccount {
            name: "Wallet".into(),
            currency: "$".into(),
            description: String::new(),
            balance: 10.0,
        }
        .into_account("a1".into(), "u1".into());

        AccountUpdate {
            balance: Some(25.5),
            ..Default::default()
        }
        .apply(&mut account);

        assert_eq!(account.name, "Wallet");
        assert_eq!(account.currency, "$");
        assert_eq!(account.balance, 25.5);
    }
}
