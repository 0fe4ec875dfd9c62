//! Query descriptors used to locate records in the secure store.
//!
//! A descriptor is the (service, account, access group) tuple plus the
//! record class, along with the lookup flags a read needs. Lookups return
//! the first matching record. Descriptors are derived from configuration on
//! every call and never persisted.

/// Record class marker. Only generic passwords are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemClass {
    GenericPassword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub class: ItemClass,
    pub service: Option<String>,
    pub account: Option<String>,
    pub access_group: Option<String>,
    pub return_attributes: bool,
    pub return_data: bool,
}

impl Query {
    /// Descriptor for a single record of the generic-password class.
    pub fn for_item(
        service: impl Into<String>,
        account: Option<&str>,
        access_group: Option<&str>,
    ) -> Self {
        Self {
            class: ItemClass::GenericPassword,
            service: Some(service.into()),
            account: account.map(str::to_string),
            access_group: access_group.map(str::to_string),
            return_attributes: false,
            return_data: false,
        }
    }

    /// Descriptor matching every record of `class`, used for store-wide deletes.
    pub fn class_only(class: ItemClass) -> Self {
        Self {
            class,
            service: None,
            account: None,
            access_group: None,
            return_attributes: false,
            return_data: false,
        }
    }

    pub fn returning_attributes(mut self) -> Self {
        self.return_attributes = true;
        self
    }

    pub fn returning_data(mut self) -> Self {
        self.return_data = true;
        self
    }

    /// True when the record described by `attrs` satisfies this query.
    ///
    /// Attributes absent from the query match anything.
    pub fn matches(&self, attrs: &Attributes) -> bool {
        fn field_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
            match wanted {
                Some(w) => actual.as_deref() == Some(w.as_str()),
                None => true,
            }
        }

        self.class == attrs.class
            && field_matches(&self.service, &attrs.service)
            && field_matches(&self.account, &attrs.account)
            && field_matches(&self.access_group, &attrs.access_group)
    }

    /// The identifying attributes of this query, for building a new record.
    pub fn attributes(&self) -> Attributes {
        Attributes {
            class: self.class,
            service: self.service.clone(),
            account: self.account.clone(),
            access_group: self.access_group.clone(),
        }
    }
}

/// Identifying attributes of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Attributes {
    pub class: ItemClass,
    pub service: Option<String>,
    pub account: Option<String>,
    pub access_group: Option<String>,
}
