//! In-memory multipart store for tests

use async_trait::async_trait;
use cirrus_client::{ClientError, MultipartStore};
use cirrus_core::domain::multipart::CompletedPart;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct State {
    next_id: u32,
    /// upload id -> (key, part number -> (token, body))
    open: HashMap<String, (String, BTreeMap<i32, (String, Vec<u8>)>)>,
    objects: HashMap<String, Vec<u8>>,
    aborted: Vec<String>,
    upload_order: Vec<i32>,
    complete_calls: usize,
    in_flight: usize,
    /// part requests still running when each abort arrived
    in_flight_at_abort: Vec<usize>,
}

/// Counts a part request as running until it returns or is cancelled
struct InFlight<'a>(&'a Mutex<State>);

impl<'a> InFlight<'a> {
    fn enter(state: &'a Mutex<State>) -> Self {
        state.lock().unwrap().in_flight += 1;
        Self(state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.lock().unwrap().in_flight -= 1;
    }
}

/// Behaves like the object store: parts are kept per upload, completion
/// checks the ascending list and its tokens, then reassembles the object
#[derive(Default)]
pub(crate) struct MemoryStore {
    state: Mutex<State>,
    fail_part: Option<i32>,
    delays: HashMap<i32, Duration>,
    reject_completion: bool,
}

fn rejected(operation: &'static str, code: &str, message: String) -> ClientError {
    ClientError::Service {
        operation,
        code: Some(code.to_string()),
        message,
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every upload of the given part number
    pub fn fail_on_part(mut self, number: i32) -> Self {
        self.fail_part = Some(number);
        self
    }

    /// Delays the acknowledgement of the given part number
    pub fn delay_part(mut self, number: i32, delay: Duration) -> Self {
        self.delays.insert(number, delay);
        self
    }

    /// Rejects every completion request
    pub fn reject_completion(mut self) -> Self {
        self.reject_completion = true;
        self
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().objects.get(key).cloned()
    }

    pub fn aborted(&self) -> Vec<String> {
        self.state.lock().unwrap().aborted.clone()
    }

    pub fn is_open(&self, upload_id: &str) -> bool {
        self.state.lock().unwrap().open.contains_key(upload_id)
    }

    /// Part numbers in the order their upload finished
    pub fn upload_order(&self) -> Vec<i32> {
        self.state.lock().unwrap().upload_order.clone()
    }

    pub fn complete_calls(&self) -> usize {
        self.state.lock().unwrap().complete_calls
    }

    pub fn in_flight_at_abort(&self) -> Vec<usize> {
        self.state.lock().unwrap().in_flight_at_abort.clone()
    }
}

#[async_trait]
impl MultipartStore for MemoryStore {
    async fn create_upload(&self, key: &str) -> cirrus_client::Result<String> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let upload_id = format!("upload-{}", state.next_id);
        state
            .open
            .insert(upload_id.clone(), (key.to_string(), BTreeMap::new()));
        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        _key: &str,
        upload_id: &str,
        number: i32,
        body: Vec<u8>,
    ) -> cirrus_client::Result<CompletedPart> {
        let _in_flight = InFlight::enter(&self.state);

        if let Some(delay) = self.delays.get(&number) {
            tokio::time::sleep(*delay).await;
        }

        if self.fail_part == Some(number) {
            return Err(rejected(
                "UploadPart",
                "InternalError",
                format!("part {} could not be stored", number),
            ));
        }

        let mut state = self.state.lock().unwrap();
        let token = format!("\"etag-{}-{}\"", upload_id, number);
        let (_, parts) = state.open.get_mut(upload_id).ok_or_else(|| {
            rejected("UploadPart", "NoSuchUpload", upload_id.to_string())
        })?;
        parts.insert(number, (token.clone(), body));
        state.upload_order.push(number);

        Ok(CompletedPart::new(number, token))
    }

    async fn complete_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> cirrus_client::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.complete_calls += 1;

        if self.reject_completion {
            return Err(rejected(
                "CompleteMultipartUpload",
                "InternalError",
                "completion refused".to_string(),
            ));
        }

        let (_, stored) = state.open.get(upload_id).ok_or_else(|| {
            rejected("CompleteMultipartUpload", "NoSuchUpload", upload_id.to_string())
        })?;

        let mut object = Vec::new();
        for (index, part) in parts.iter().enumerate() {
            if part.number != index as i32 + 1 {
                return Err(rejected(
                    "CompleteMultipartUpload",
                    "InvalidPartOrder",
                    format!("part {} out of order", part.number),
                ));
            }
            match stored.get(&part.number) {
                Some((token, body)) if *token == part.token => object.extend_from_slice(body),
                _ => {
                    return Err(rejected(
                        "CompleteMultipartUpload",
                        "InvalidPart",
                        format!("part {} was not uploaded", part.number),
                    ));
                }
            }
        }

        state.open.remove(upload_id);
        state.objects.insert(key.to_string(), object);
        Ok(())
    }

    async fn abort_upload(&self, _key: &str, upload_id: &str) -> cirrus_client::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.open.remove(upload_id);
        state.aborted.push(upload_id.to_string());
        let in_flight = state.in_flight;
        state.in_flight_at_abort.push(in_flight);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_rejects_gaps_and_disorder() {
        let store = MemoryStore::new();
        let upload_id = store.create_upload("gappy.bin").await.unwrap();
        let first = store
            .upload_part("gappy.bin", &upload_id, 1, b"one".to_vec())
            .await
            .unwrap();
        let second = store
            .upload_part("gappy.bin", &upload_id, 2, b"two".to_vec())
            .await
            .unwrap();
        let third = store
            .upload_part("gappy.bin", &upload_id, 3, b"three".to_vec())
            .await
            .unwrap();

        let err = store
            .complete_upload("gappy.bin", &upload_id, &[first.clone(), third.clone()])
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("InvalidPartOrder"));

        let err = store
            .complete_upload("gappy.bin", &upload_id, &[second.clone(), first.clone()])
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("InvalidPartOrder"));

        assert!(store.is_open(&upload_id));
        assert!(store.object("gappy.bin").is_none());

        store
            .complete_upload("gappy.bin", &upload_id, &[first, second, third])
            .await
            .unwrap();
        assert_eq!(store.object("gappy.bin").unwrap(), b"onetwothree".to_vec());
    }

    #[tokio::test]
    async fn test_store_rejects_unknown_tokens() {
        let store = MemoryStore::new();
        let upload_id = store.create_upload("forged.bin").await.unwrap();
        store
            .upload_part("forged.bin", &upload_id, 1, b"body".to_vec())
            .await
            .unwrap();

        let err = store
            .complete_upload(
                "forged.bin",
                &upload_id,
                &[CompletedPart::new(1, "\"not-the-etag\"")],
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("InvalidPart"));
    }
}
