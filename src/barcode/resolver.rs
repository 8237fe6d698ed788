use lazy_static::lazy_static;
use regex::Regex;

use super::decoder::BarcodeDecoder;
use crate::bot::message::InboundMessage;

/// Finds the first run of 8 to 14 digits in `text`; spaces and hyphens
/// between digits are allowed and stripped.
pub fn extract_barcode_from_text(text: &str) -> Option<String> {
    lazy_static! {
        static ref DIGIT_RUN_RE: Regex = Regex::new(r"(?:[0-9][\s-]*){8,14}").unwrap();
    }

    DIGIT_RUN_RE.find_iter(text).find_map(|m| {
        let digits: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
        (8..=14).contains(&digits.len()).then_some(digits)
    })
}

/// Turns a message into a candidate product identifier.
///
/// Images go to the decoder only; there is no text fallback for them.
pub async fn resolve(
    decoder: &dyn BarcodeDecoder,
    message: &InboundMessage,
) -> anyhow::Result<Option<String>> {
    match message.image() {
        Some(bytes) => decoder.decode(bytes).await,
        None => Ok(extract_barcode_from_text(message.text())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{image_message, text_message, FakeDecoder};

    #[test]
    fn finds_barcode_in_sentence() {
        assert_eq!(
            extract_barcode_from_text("barcode 737628064502").as_deref(),
            Some("737628064502")
        );
    }

    #[test]
    fn strips_spaces_and_hyphens() {
        assert_eq!(
            extract_barcode_from_text("code: 5 060128-612345 thanks").as_deref(),
            Some("5060128612345")
        );
    }

    #[test]
    fn rejects_short_runs() {
        assert_eq!(extract_barcode_from_text("call 1234567 now"), None);
        assert_eq!(extract_barcode_from_text("no digits here"), None);
        assert_eq!(extract_barcode_from_text(""), None);
    }

    #[test]
    fn long_runs_yield_first_fourteen_digits() {
        assert_eq!(
            extract_barcode_from_text("12345678901234567890").as_deref(),
            Some("12345678901234")
        );
    }

    #[test]
    fn ignores_non_ascii_digits() {
        assert_eq!(extract_barcode_from_text("٠١٢٣٤٥٦٧٨٩"), None);
    }

    #[tokio::test]
    async fn image_path_uses_decoder_without_text_fallback() {
        let decoder = FakeDecoder::returning(None);
        let mut msg = image_message(1, vec![1, 2, 3]);
        msg.text = Some("caption 737628064502".into());
        assert_eq!(resolve(&decoder, &msg).await.unwrap(), None);

        let decoder = FakeDecoder::returning(Some("5060128612345"));
        assert_eq!(
            resolve(&decoder, &msg).await.unwrap().as_deref(),
            Some("5060128612345")
        );
    }

    #[tokio::test]
    async fn text_path_never_touches_decoder() {
        let decoder = FakeDecoder::failing();
        let msg = text_message(1, "barcode 737628064502");
        assert_eq!(
            resolve(&decoder, &msg).await.unwrap().as_deref(),
            Some("737628064502")
        );
    }
}
