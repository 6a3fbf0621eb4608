//! Share links and document download

use crate::fields::SigningField;

/// Build a shareable viewer link for a document
pub fn share_link(origin: &str, document_id: &str) -> String {
    format!("{}/document/{}?share=true", origin.trim_end_matches('/'), document_id)
}

/// Token-bearing variant. The token is an opaque capability; validating it
/// is the caller's job, not the engine's.
pub fn share_link_with_token(origin: &str, document_id: &str, issued_at_millis: i64) -> String {
    format!(
        "{}/document/{}?token=share_{}_{}",
        origin.trim_end_matches('/'),
        document_id,
        document_id,
        issued_at_millis
    )
}

/// Prepare a document for download. Signature embedding is a passthrough:
/// compositing images into the file format belongs to a real PDF
/// collaborator, so the original bytes are returned unchanged.
pub fn prepare_download(title: &str, blob: &[u8], _fields: &[SigningField]) -> (String, Vec<u8>) {
    (format!("{}.pdf", title), blob.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_link_format() {
        assert_eq!(
            share_link("https://housesign.app", "doc-1"),
            "https://housesign.app/document/doc-1?share=true"
        );
        // Trailing slash on the origin does not double up
        assert_eq!(
            share_link("https://housesign.app/", "doc-1"),
            "https://housesign.app/document/doc-1?share=true"
        );
    }

    #[test]
    fn test_share_token_format() {
        let url = share_link_with_token("https://housesign.app", "doc-1", 1_743_580_800_000);
        assert_eq!(
            url,
            "https://housesign.app/document/doc-1?token=share_doc-1_1743580800000"
        );
    }

    #[test]
    fn test_download_is_a_passthrough() {
        let blob = b"%PDF-1.4 sample";
        let field = SigningField::new(1, 0.0, 0.0, 200.0, 50.0);
        let (filename, bytes) = prepare_download("Purchase Agreement", blob, &[field]);
        assert_eq!(filename, "Purchase Agreement.pdf");
        assert_eq!(bytes, blob);
    }
}
