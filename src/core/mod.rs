pub mod authorizer;
pub mod repository;
pub mod resolver;
pub mod selector;

pub use authorizer::OwnershipAuthorizer;
pub use repository::ConfigRepository;
pub use resolver::{MockRequest, MockResolver, ResolvedMock};
pub use selector::{select_status, select_status_with, SeededRolls, ThreadRolls};
