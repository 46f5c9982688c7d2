//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod registration_command;
mod user_store;

#[cfg(test)]
pub use registration_command::MockRegistrationCommand;
pub use registration_command::{FixtureRegistrationCommand, RegistrationCommand};
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::{UserStore, UserStoreError};
