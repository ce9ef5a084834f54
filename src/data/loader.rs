//! CSV Data Loader Module
//! Reads the transaction CSV with Polars and keeps the loaded dataset for the process.

use crate::config::DashboardConfig;
use crate::data::Dataset;
use crate::error::DataLoadError;
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// CSV reader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub infer_schema_length: usize,
    pub ignore_parse_errors: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            infer_schema_length: 10000,
            ignore_parse_errors: false,
        }
    }
}

impl From<&DashboardConfig> for LoadOptions {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            infer_schema_length: config.infer_schema_length,
            ignore_parse_errors: config.ignore_parse_errors,
        }
    }
}

/// Loads the dataset once per path and hands out shared references to it.
#[derive(Debug, Default)]
pub struct DataLoader {
    options: LoadOptions,
    cached: Option<Arc<Dataset>>,
}

impl DataLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            cached: None,
        }
    }

    pub fn options(&self) -> LoadOptions {
        self.options
    }

    /// Load a CSV file, reusing the cached dataset when `path` was loaded before.
    ///
    /// A different path replaces the cache.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Dataset>, DataLoadError> {
        if let Some(dataset) = &self.cached {
            if dataset.source() == path {
                tracing::debug!("Using cached dataset for {}", path.display());
                return Ok(Arc::clone(dataset));
            }
        }

        // a failed read of another file must not leave the old dataset behind
        self.cached = None;
        let dataset = Arc::new(Self::read(path, self.options)?);
        self.cached = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Read and validate a CSV file without touching any cache.
    pub fn read(path: &Path, options: LoadOptions) -> Result<Dataset, DataLoadError> {
        let started = Instant::now();

        // polars reports a missing file as a generic compute error
        std::fs::metadata(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(options.infer_schema_length))
            .with_ignore_errors(options.ignore_parse_errors)
            .finish()?
            .collect()?;

        let dataset = Dataset::from_frame(df, path)?;
        tracing::info!(
            "Loaded {} rows, {} columns from {} in {:?}",
            dataset.height(),
            dataset.columns().len(),
            path.display(),
            started.elapsed()
        );
        for warning in dataset.degraded_warnings() {
            tracing::warn!("{}", warning);
        }

        Ok(dataset)
    }

    /// Currently cached dataset, if any.
    pub fn cached(&self) -> Option<Arc<Dataset>> {
        self.cached.clone()
    }

    /// Forget the cached dataset.
    pub fn clear(&mut self) {
        self.cached = None;
    }

    /// Install a dataset read elsewhere (used by background loading).
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.cached = Some(dataset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{DIST_NAME, TOTAL_ITEMS};
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const SHOPS: &str = "\
distName,noOfTrans,totalAmount,itemName,salt,wheat,rgdal,kerosene,sugar
A,5,100.0,rice,1,2,3,4,5
B,3,50.0,rice,0,1,0,1,0
A,2,20.0,oil,,1,1,1,1
";

    #[test]
    fn load_reads_every_row() {
        let file = write_csv(SHOPS);
        let mut loader = DataLoader::default();

        let ds = loader.load(file.path()).unwrap();
        assert_eq!(ds.height(), 3);
        assert!(ds.features().has_item_columns);
        assert!(ds.has_columns(&[DIST_NAME, TOTAL_ITEMS]));
    }

    #[test]
    fn second_load_hits_the_cache() {
        let file = write_csv(SHOPS);
        let mut loader = DataLoader::default();

        let first = loader.load(file.path()).unwrap();
        let second = loader.load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn uncached_reads_are_identical() {
        let file = write_csv(SHOPS);

        let first = DataLoader::read(file.path(), LoadOptions::default()).unwrap();
        let second = DataLoader::read(file.path(), LoadOptions::default()).unwrap();
        assert!(first.frame().equals_missing(second.frame()));
        assert_eq!(first.records().unwrap(), second.records().unwrap());
    }

    #[test]
    fn different_path_replaces_the_cache() {
        let a = write_csv(SHOPS);
        let b = write_csv("distName,noOfTrans,totalAmount\nC,1,1.5\n");
        let mut loader = DataLoader::default();

        loader.load(a.path()).unwrap();
        let ds = loader.load(b.path()).unwrap();
        assert_eq!(ds.height(), 1);
        assert_eq!(loader.cached().unwrap().source(), b.path());
    }

    #[test]
    fn failed_load_of_another_path_drops_the_cache() {
        let good = write_csv(SHOPS);
        let bad = write_csv("distName,totalAmount\nA,1.0\n");
        let mut loader = DataLoader::default();

        loader.load(good.path()).unwrap();
        assert!(loader.load(bad.path()).is_err());
        assert!(loader.cached().is_none());
    }

    #[test]
    fn clear_forgets_the_dataset() {
        let file = write_csv(SHOPS);
        let mut loader = DataLoader::default();

        let first = loader.load(file.path()).unwrap();
        loader.clear();
        assert!(loader.cached().is_none());

        let second = loader.load(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut loader = DataLoader::default();
        let err = loader
            .load(Path::new("/nonexistent/shop-wise.csv"))
            .unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }));
        assert!(loader.cached().is_none());
    }

    #[test]
    fn missing_required_column_is_reported() {
        let file = write_csv("distName,totalAmount\nA,1.0\n");
        let err = DataLoader::read(file.path(), LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumns(ref cols) if cols == &["noOfTrans"]));
    }

    #[test]
    fn fractional_counts_fail_the_load() {
        let file = write_csv("distName,noOfTrans,totalAmount\nA,2.5,1.0\nA,2.5,1.0\n");
        let err = DataLoader::read(file.path(), LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DataLoadError::Malformed { ref column, .. } if column == "noOfTrans"));
    }

    #[test]
    fn malformed_rows_fail_unless_ignored() {
        let file = write_csv("distName,noOfTrans,totalAmount\nA,1,1.0\nB,2,1.0\nC,many,2.0\n");
        let strict = LoadOptions {
            infer_schema_length: 2,
            ignore_parse_errors: false,
        };
        assert!(DataLoader::read(file.path(), strict).is_err());

        let lenient = LoadOptions {
            infer_schema_length: 2,
            ignore_parse_errors: true,
        };
        let ds = DataLoader::read(file.path(), lenient).unwrap();
        assert_eq!(ds.height(), 3);
    }
}
