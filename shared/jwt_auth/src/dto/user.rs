use std::{ops::Deref, sync::Arc};

///
/// Struct with user information.
///
/// To make sure cloning does not take too long
/// all fields are stored in InnerUser behind an Arc.
///
/// InnerUser fields are accessible thanks to Deref trait.
///
#[derive(Debug, Clone)]
pub struct User {
    inner: Arc<InnerUser>,
}

///
/// User information retrieved from a verified token.
///
#[derive(Debug)]
pub struct InnerUser {
    /// `sub` claim
    pub id: String,

    /// `realm_access.roles` claim
    pub roles: Vec<String>,
}

impl User {
    pub fn new(id: String, roles: Vec<String>) -> Self {
        Self {
            inner: Arc::new(InnerUser { id, roles }),
        }
    }
}

impl Deref for User {
    type Target = InnerUser;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
