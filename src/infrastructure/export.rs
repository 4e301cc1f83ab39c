//! CSV and JSON export of normalized products

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::product::{PRODUCT_COLUMNS, ProductRecord};
use crate::domain::site_profile::Supermarket;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Files written by one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
}

impl ExportPaths {
    /// `<dir>/<stem>.csv` and `<dir>/<stem>.json` for `supermarket`
    pub fn for_site(output_dir: &Path, supermarket: Supermarket) -> Self {
        let stem = supermarket.export_stem();
        Self {
            csv: output_dir.join(format!("{stem}.csv")),
            json: output_dir.join(format!("{stem}.json")),
        }
    }
}

/// Write both export files for `supermarket`.
///
/// Returns `None` without touching the filesystem when there is nothing to
/// write.
pub fn export_products(
    products: &[ProductRecord],
    output_dir: &Path,
    supermarket: Supermarket,
) -> Result<Option<ExportPaths>, ExportError> {
    if products.is_empty() {
        warn!("No {} products to save", supermarket);
        return Ok(None);
    }

    fs::create_dir_all(output_dir).map_err(|source| ExportError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let paths = ExportPaths::for_site(output_dir, supermarket);
    write_csv(products, &paths.csv)?;
    write_json(products, &paths.json)?;
    info!(
        "💾 Saved {} products to {} and {}",
        products.len(),
        paths.csv.display(),
        paths.json.display()
    );
    Ok(Some(paths))
}

/// CSV with a header row in `PRODUCT_COLUMNS` order
///
/// `embedding` is written as a JSON array, or left empty.
pub fn write_csv(products: &[ProductRecord], path: &Path) -> Result<(), ExportError> {
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    wtr.write_record(PRODUCT_COLUMNS).map_err(csv_err)?;

    for product in products {
        let embedding = match &product.embedding {
            Some(vector) => serde_json::to_string(vector).map_err(|source| ExportError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            None => String::new(),
        };
        wtr.write_record([
            product.name.as_str(),
            product.supermarket.as_str(),
            product.quantity.as_str(),
            product.price.as_str(),
            product.promotion_description.as_str(),
            product.promotion_end_date_text.as_str(),
            product.product_url.as_str(),
            product.image_url.as_str(),
            embedding.as_str(),
        ])
        .map_err(csv_err)?;
    }

    wtr.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-printed JSON array
pub fn write_json(products: &[ProductRecord], path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(products).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a JSON array file, e.g. exported records or raw extractor output
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ExportError> {
    let content = fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })
}
