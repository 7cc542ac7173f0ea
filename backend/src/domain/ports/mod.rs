//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Query`, `*Command`, `*Service`) are called by inbound
//! adapters. Driven ports (`*Repository`, [`PasswordHasher`],
//! [`PaymentProcessor`]) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod login_service;
mod master_profile_repository;
mod master_profiles;
mod order_repository;
mod orders;
mod password_hasher;
mod payment_processor;
mod payments;
mod user_repository;
mod users_command;
mod users_query;

pub use login_service::{LoginService, RegistrationService};
#[cfg(test)]
pub use login_service::{MockLoginService, MockRegistrationService};
#[cfg(test)]
pub use master_profile_repository::MockMasterProfileRepository;
pub use master_profile_repository::{MasterProfileRepository, MasterProfileRepositoryError};
pub use master_profiles::{MasterProfilesCommand, MasterProfilesQuery};
#[cfg(test)]
pub use master_profiles::{MockMasterProfilesCommand, MockMasterProfilesQuery};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderRepository, OrderRepositoryError};
pub use orders::{CreateOrderRequest, OrdersCommand, OrdersQuery};
#[cfg(test)]
pub use orders::{MockOrdersCommand, MockOrdersQuery};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use payment_processor::MockPaymentProcessor;
pub use payment_processor::{PaymentProcessor, PaymentProcessorError};
#[cfg(test)]
pub use payments::MockPaymentsCommand;
pub use payments::{
    CreatedPaymentIntent, PaymentConfirmation, PaymentConfirmationRequest, PaymentIntentRequest,
    PaymentsCommand,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserAccount, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_command::MockUsersCommand;
pub use users_command::{CreateUserRequest, UsersCommand};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
