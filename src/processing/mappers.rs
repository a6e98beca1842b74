//! Typed materialization of store hits.

use crate::{accounts::UserAccount, processing::types::ContentRecord, store::StoredDocument};

/// Decode a single post hit; the document id wins over any `id` stored in the body.
pub(crate) fn decode_post(document: StoredDocument) -> Result<ContentRecord, serde_json::Error> {
    let StoredDocument { id, source } = document;
    let mut record: ContentRecord = serde_json::from_value(source)?;
    record.id = id;
    Ok(record)
}

/// Decode a single account hit.
pub(crate) fn decode_account(document: StoredDocument) -> Result<UserAccount, serde_json::Error> {
    serde_json::from_value(document.source)
}

/// Decode every hit with `decode`, dropping (and logging) the ones that fail.
///
/// Returns the decoded values in store order plus the number of dropped hits.
pub(crate) fn materialize<T, F>(
    entity: &'static str,
    documents: Vec<StoredDocument>,
    decode: F,
) -> (Vec<T>, u64)
where
    F: Fn(StoredDocument) -> Result<T, serde_json::Error>,
{
    let mut decoded = Vec::with_capacity(documents.len());
    let mut dropped = 0;

    for document in documents {
        let id = document.id.clone();
        match decode(document) {
            Ok(value) => decoded.push(value),
            Err(error) => {
                dropped += 1;
                tracing::warn!(entity, id = %id, error = %error, "Dropping undecodable search hit");
            }
        }
    }

    (decoded, dropped)
}
