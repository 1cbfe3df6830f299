//! Application services sitting between the HTTP handlers and the store.
//!
//! 1. **Loading** (`loading`): search, order and paginate any collection
//! 2. **Product saving** (`product_saving`): product, child and categories
//!    saved as one unit
//! 3. **Record saving** (`records`): create/update for every other kind
//! 4. **Deletion** (`deletion`): explicit cascades and restrictions
//! 5. **Storefront** (`storefront`): the public home page sections

pub mod config;
pub mod deletion;
pub mod error;
pub mod loading;
pub mod product_saving;
pub mod product_view;
pub mod productable;
pub mod records;
pub mod storefront;

pub use config::ServiceConfig;
pub use deletion::{DeletionService, DEPENDENT_GAMES_EXIST, DEPENDENT_PRODUCT_EXISTS};
pub use error::ServiceError;
pub use loading::ModelLoadingService;
pub use product_saving::{ProductSaveRequest, ProductSavingService};
pub use product_view::ProductView;
pub use records::RecordSavingService;
pub use storefront::{StorefrontHome, StorefrontHomeService, StorefrontProduct};
