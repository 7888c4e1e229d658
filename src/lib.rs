//! # usbinfo
//!
//! USB vendor and product names from the `usb.ids` database.
//!
//! The database is parsed by [`usb_ids_parser`] the first time it is
//! queried and kept in memory for the rest of the process. Concurrent first
//! queries wait on the same parse.
//!
//! ## Example
//!
//! ```no_run
//! # async fn run() -> Result<(), usbinfo::UsbIdsError> {
//! // ids are padded to four characters, "46d" is "046d"
//! if let Some(vendor) = usbinfo::get_vendor("46d").await? {
//!     println!("{}", vendor.vendor);
//! }
//!
//! if let Some(product) = usbinfo::get_product("46d", "c52b").await? {
//!     println!("{} {}", product.vendor, product.product.unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The default database reads the snapshot bundled with this crate, or the
//! file named by `USB_IDS_PATH`. Use [`UsbIds`] directly for other sources.

mod config;
mod error;
mod lookup;
mod source;

use std::fmt::Display;
use std::sync::Arc;

use once_cell::sync::Lazy;

pub use config::{default_path, initialize_config, Config, GLOBAL_CONFIG, PATH_ENV};
pub use error::UsbIdsError;
pub use lookup::{normalize_id, Product, UsbIds, Vendor};
pub use source::{FileSource, LineSource};
pub use usb_ids_parser::{Record, RecordCollection, RecordType};

static DEFAULT_DATABASE: Lazy<UsbIds> = Lazy::new(|| UsbIds::from_config(&GLOBAL_CONFIG.read()));

/// The process-wide database behind [`get_vendor`] and [`get_product`].
pub fn default_database() -> &'static UsbIds {
    &DEFAULT_DATABASE
}

/// Look up a vendor in the default database.
pub async fn get_vendor(vendor_id: impl Display) -> Result<Option<Vendor>, UsbIdsError> {
    DEFAULT_DATABASE.get_vendor(vendor_id).await
}

/// Look up a product in the default database.
pub async fn get_product(
    vendor_id: impl Display,
    product_id: impl Display,
) -> Result<Option<Product>, UsbIdsError> {
    DEFAULT_DATABASE.get_product(vendor_id, product_id).await
}

/// All records of the default database, including the auxiliary sections.
pub async fn records() -> Result<Arc<RecordCollection>, UsbIdsError> {
    DEFAULT_DATABASE.records().await
}
