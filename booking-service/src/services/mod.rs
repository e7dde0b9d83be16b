pub mod metrics;
pub mod mongo;
pub mod store;
pub mod token;

pub use metrics::{get_metrics, init_metrics, record_auth_rejection, record_token_issued};
pub use mongo::MongoStore;
pub use store::{Collection, DeleteAck, DocumentStore, InsertAck, StoreError, UpdateAck};
pub use token::{CookiePolicy, TokenIssuer, TOKEN_COOKIE};
