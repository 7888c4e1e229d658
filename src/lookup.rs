//! Vendor and product lookups over a lazily parsed usb.ids database.

use std::fmt::Display;
use std::sync::Arc;

use moka::future::Cache;
use serde::Serialize;
use tracing::{debug, error, trace};
use usb_ids_parser::{parse_reader, Record, RecordCollection};

use crate::config::Config;
use crate::error::UsbIdsError;
use crate::source::{FileSource, LineSource};

/// Width of a canonical vendor or product id.
const ID_WIDTH: usize = 4;

/// Left-pad an id with `0` to four characters. Longer ids are kept as is.
///
/// Numbers are formatted in decimal, so pass hex ids as strings
/// (`"46d"`, not `0x46d`).
pub fn normalize_id(id: impl Display) -> String {
    format!("{:0>width$}", id.to_string(), width = ID_WIDTH)
}

/// A vendor found in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub vendor_id: String,
    pub vendor: String,
}

/// A product lookup whose vendor exists.
///
/// `product` is `None` when the vendor has no such product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub vendor_id: String,
    pub product_id: String,
    pub vendor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

/// A usb.ids database that is parsed on first use and kept afterwards.
///
/// Concurrent first queries share a single parse. A failed parse is handed
/// to every caller waiting on it and is not kept, so the next query reads
/// the source again.
pub struct UsbIds<S: LineSource = FileSource> {
    source: S,
    records: Cache<(), Arc<RecordCollection>>,
}

impl UsbIds<FileSource> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(FileSource::new(config.path.clone()))
    }
}

impl<S: LineSource> UsbIds<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            records: Cache::builder().initial_capacity(1).build(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Whether the records have been parsed already.
    pub fn is_loaded(&self) -> bool {
        self.records.contains_key(&())
    }

    /// The parsed records, reading the source if this is the first call.
    pub async fn records(&self) -> Result<Arc<RecordCollection>, UsbIdsError> {
        self.records
            .try_get_with((), load(&self.source))
            .await
            .map_err(|e| (*e).clone())
    }

    /// Look up a vendor by id. `Ok(None)` if the database has no such vendor.
    ///
    /// The last matching line in source order wins.
    pub async fn get_vendor(&self, vendor_id: impl Display) -> Result<Option<Vendor>, UsbIdsError> {
        let vendor_id = normalize_id(vendor_id);
        let records = self.records().await?;
        Ok(find_vendor(&records, &vendor_id))
    }

    /// Look up a product of a vendor.
    ///
    /// `Ok(None)` if the vendor is unknown. A known vendor without the product
    /// yields a [`Product`] whose `product` is `None`.
    ///
    /// Any device line whose path starts with the vendor and product ids
    /// matches, and the last one in source order wins.
    pub async fn get_product(
        &self,
        vendor_id: impl Display,
        product_id: impl Display,
    ) -> Result<Option<Product>, UsbIdsError> {
        let vendor_id = normalize_id(vendor_id);
        let product_id = normalize_id(product_id);
        let records = self.records().await?;

        let Some(vendor) = find_vendor(&records, &vendor_id) else {
            trace!("vendor {} not found, skipping product {}", vendor_id, product_id);
            return Ok(None);
        };

        let product = records
            .devices()
            .iter()
            .rev()
            .find(|record| is_product_of(record, &vendor_id, &product_id))
            .map(|record| record.value.clone());

        Ok(Some(Product {
            vendor_id,
            product_id,
            vendor: vendor.vendor,
            product,
        }))
    }
}

#[tracing::instrument(name = "usb_ids_load", level = "debug", skip_all, fields(source = %source.describe()))]
async fn load<S: LineSource>(source: &S) -> Result<Arc<RecordCollection>, UsbIdsError> {
    let reader = source.open().await.map_err(|e| {
        error!("failed to open usb ids source: {}", e);
        UsbIdsError::source_read(source.describe(), e)
    })?;

    let records = parse_reader(reader).await.map_err(|e| {
        error!("failed to read usb ids source: {}", e);
        UsbIdsError::source_read(source.describe(), e)
    })?;

    debug!(
        "loaded {} records, {} device records",
        records.len(),
        records.devices().len()
    );

    Ok(Arc::new(records))
}

fn find_vendor(records: &RecordCollection, vendor_id: &str) -> Option<Vendor> {
    records
        .devices()
        .iter()
        .rev()
        .find(|record| record.is_root() && record.path[0] == vendor_id)
        .map(|record| Vendor {
            vendor_id: record.path[0].clone(),
            vendor: record.value.clone(),
        })
}

fn is_product_of(record: &Record, vendor_id: &str, product_id: &str) -> bool {
    matches!(
        record.path.as_slice(),
        [vendor, product, ..] if vendor == vendor_id && product == product_id
    )
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};

    use tokio::io::{AsyncRead, BufReader, ReadBuf};

    use super::*;

    const LOGITECH: &str = "# comment\n\n046d  Logitech, Inc.\n\t0a44  Headset H390\n\t2131  Webcam\n";

    /// Serves `data`, then either ends or fails.
    struct TestReader {
        data: Vec<u8>,
        truncated: bool,
    }

    impl AsyncRead for TestReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.data.is_empty() {
                if self.truncated {
                    return Poll::Ready(Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "stream closed early",
                    )));
                }
                return Poll::Ready(Ok(()));
            }
            let n = buf.remaining().min(self.data.len());
            buf.put_slice(&self.data[..n]);
            self.data.drain(..n);
            Poll::Ready(Ok(()))
        }
    }

    #[derive(Default)]
    struct TestSource {
        text: String,
        failing_opens: usize,
        truncated: bool,
        opens: AtomicUsize,
    }

    impl TestSource {
        fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                ..Default::default()
            }
        }

        fn opens(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }
    }

    impl LineSource for TestSource {
        type Reader = BufReader<TestReader>;

        fn describe(&self) -> String {
            "test".to_string()
        }

        async fn open(&self) -> io::Result<Self::Reader> {
            let attempt = self.opens.fetch_add(1, Ordering::SeqCst);
            // yield so concurrent callers overlap with the build
            tokio::task::yield_now().await;
            if attempt < self.failing_opens {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such file"));
            }
            Ok(BufReader::new(TestReader {
                data: self.text.clone().into_bytes(),
                truncated: self.truncated,
            }))
        }
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id(1), "0001");
        assert_eq!(normalize_id("12"), "0012");
        assert_eq!(normalize_id("46d"), "046d");
        assert_eq!(normalize_id("1234"), "1234");
        assert_eq!(normalize_id("123456"), "123456");
        assert_eq!(normalize_id(""), "0000");
    }

    #[tokio::test]
    async fn test_get_vendor() {
        let db = UsbIds::new(TestSource::new(LOGITECH));

        let vendor = db.get_vendor("46d").await.unwrap().unwrap();
        assert_eq!(
            vendor,
            Vendor {
                vendor_id: "046d".to_string(),
                vendor: "Logitech, Inc.".to_string(),
            }
        );

        assert_eq!(db.get_vendor("dead").await.unwrap(), None);
        // product keys are never vendors
        assert_eq!(db.get_vendor("2131").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_product() {
        let db = UsbIds::new(TestSource::new(LOGITECH));

        let product = db.get_product("46d", "2131").await.unwrap().unwrap();
        assert_eq!(
            product,
            Product {
                vendor_id: "046d".to_string(),
                product_id: "2131".to_string(),
                vendor: "Logitech, Inc.".to_string(),
                product: Some("Webcam".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_get_product_unknown_product_keeps_vendor() {
        let db = UsbIds::new(TestSource::new(LOGITECH));

        let product = db.get_product("46d", "9999").await.unwrap().unwrap();
        assert_eq!(product.vendor, "Logitech, Inc.");
        assert_eq!(product.product, None);

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "vendorId": "046d",
                "productId": "9999",
                "vendor": "Logitech, Inc.",
            })
        );
    }

    #[tokio::test]
    async fn test_get_product_unknown_vendor() {
        let db = UsbIds::new(TestSource::new(LOGITECH));
        assert_eq!(db.get_product("beef", "2131").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_product_after_interface_line() {
        // the interface line leaves the depth counter at 2, so 6010 is read
        // as ["0403", "6001", "6010"]
        let text = "0403  FTDI\n\t6001  FT232\n\t\t00  Iface\n\t6010  FT2232\n";
        let db = UsbIds::new(TestSource::new(text));

        let records = db.records().await.unwrap();
        let chained = records.devices().last().unwrap();
        assert_eq!(chained.path, ["0403", "6001", "6010"]);
        assert_eq!(chained.depth(), 3);

        let product = db.get_product("403", "6001").await.unwrap().unwrap();
        assert_eq!(product.product.as_deref(), Some("FT2232"));

        let product = db.get_product("403", "6010").await.unwrap().unwrap();
        assert_eq!(product.vendor, "FTDI");
        assert_eq!(product.product, None);
    }

    #[tokio::test]
    async fn test_last_vendor_line_wins() {
        let text = "1234  Old Name\n\t0001  Gadget\n1234  New Name\n";
        let db = UsbIds::new(TestSource::new(text));

        let vendor = db.get_vendor("1234").await.unwrap().unwrap();
        assert_eq!(vendor.vendor, "New Name");

        let product = db.get_product("1234", "1").await.unwrap().unwrap();
        assert_eq!(product.vendor, "New Name");
        assert_eq!(product.product.as_deref(), Some("Gadget"));
    }

    #[tokio::test]
    async fn test_parses_once() {
        let db = UsbIds::new(TestSource::new(LOGITECH));
        assert!(!db.is_loaded());

        let first = db.get_vendor("46d").await.unwrap();
        let second = db.get_vendor("46d").await.unwrap();
        assert_eq!(first, second);

        let first = db.get_product("46d", "2131").await.unwrap();
        let second = db.get_product("46d", "2131").await.unwrap();
        assert_eq!(first, second);

        assert!(db.is_loaded());
        assert_eq!(db.source().opens(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_queries_share_one_parse() {
        let db = UsbIds::new(TestSource::new(LOGITECH));

        let queries = (0..16).map(|_| db.get_vendor("046d"));
        let results = futures::future::join_all(queries).await;

        for result in results {
            assert_eq!(result.unwrap().unwrap().vendor, "Logitech, Inc.");
        }
        assert_eq!(db.source().opens(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let db = UsbIds::new(TestSource {
            failing_opens: 1,
            ..TestSource::new(LOGITECH)
        });

        let err = db.get_vendor("46d").await.unwrap_err();
        assert!(matches!(err, UsbIdsError::SourceRead { .. }));
        assert!(!db.is_loaded());

        let vendor = db.get_vendor("46d").await.unwrap();
        assert!(vendor.is_some());
        assert_eq!(db.source().opens(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_failure() {
        let db = UsbIds::new(TestSource {
            failing_opens: 1,
            ..TestSource::new(LOGITECH)
        });

        let queries = (0..4).map(|_| db.get_vendor("046d"));
        let results = futures::future::join_all(queries).await;

        assert!(results.iter().all(Result::is_err));
        assert_eq!(db.source().opens(), 1);
    }

    #[tokio::test]
    async fn test_truncated_source_exposes_no_records() {
        let db = UsbIds::new(TestSource {
            truncated: true,
            ..TestSource::new(LOGITECH)
        });

        let err = db.get_product("46d", "2131").await.unwrap_err();
        assert!(err.to_string().contains("stream closed early"));
        assert!(!db.is_loaded());
    }
}
