use std::fmt;

/// Credentials of the signed in driver.
///
/// Owned by the credential store of the embedding application, the tracking
/// core only ever reads it.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub auth_token: String,
    pub driver_id: i32,
}

impl Session {
    pub fn new<S: Into<String>>(auth_token: S, driver_id: i32) -> Self {
        Self {
            auth_token: auth_token.into(),
            driver_id,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.auth_token.is_empty()
    }
}

// keep the token out of logs
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Session")
            .field("auth_token", &"***")
            .field("driver_id", &self.driver_id)
            .finish()
    }
}
