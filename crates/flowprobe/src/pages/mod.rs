//! Concrete page objects for the storefront's cart and checkout pages.
//!
//! Pages are the single source of locator constants. Each page is a thin,
//! stateless view over a borrowed document: construct one per operation.

mod cart;
mod checkout;
mod inventory;

pub use cart::CartPage;
pub use checkout::{CheckoutCompletePage, CheckoutInfoPage, CheckoutOverviewPage};
pub use inventory::InventoryPage;
