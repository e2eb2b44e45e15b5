use std::sync::{Mutex, PoisonError};

use transport::{ListError, ListedObject, ObjectLister};

/// [`ObjectLister`] serving a fixed listing or a fixed failure.
#[derive(Debug)]
pub struct FakeLister {
    objects: Vec<ListedObject>,
    failure: Option<String>,
    requests: Mutex<Vec<(String, String)>>,
}

impl FakeLister {
    /// Serves `(key, size)` pairs.
    pub fn new<I, K>(objects: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        Self {
            objects: objects
                .into_iter()
                .map(|(key, size)| ListedObject::new(key, size))
                .collect(),
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fails every listing with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            objects: Vec::new(),
            failure: Some(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// `(bucket, prefix)` pairs requested so far.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ObjectLister for FakeLister {
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ListedObject>, ListError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((bucket.to_owned(), prefix.to_owned()));
        match &self.failure {
            Some(message) => Err(ListError::Failed {
                uri: format!("s3://{bucket}/{prefix}"),
                status: Some(255),
                message: message.clone(),
            }),
            None => Ok(self.objects.clone()),
        }
    }
}
