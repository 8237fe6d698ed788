use anyhow::Context;
use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{error, info, instrument};

use crate::bot::message::InboundMessage;
use crate::catalog::dto::NAME_FIELDS;
use crate::products::repo::SavedProduct;
use crate::state::AppState;

const NO_IMAGE: &str = "Send an image with caption starting with pic_save.";
const NO_BARCODE: &str = "No barcode detected in this image.";
const SAVE_FAILED: &str = "Failed to save this image.";

/// Whether the message text or caption asks for `pic_save`.
pub fn is_pic_save(message: &InboundMessage) -> bool {
    lazy_static! {
        static ref PIC_SAVE_RE: Regex = Regex::new(r"(?i)^pic_save\b").unwrap();
    }
    PIC_SAVE_RE.is_match(message.text())
}

/// Reads a barcode from the attached image, remembers the product it names
/// and keeps the image. Replies in the order they should be sent.
#[instrument(skip_all, fields(conversation_id = message.conversation_id, message_id = ?message.message_id))]
pub async fn pic_save(state: &AppState, message: &InboundMessage) -> Vec<String> {
    let Some(image) = message.image() else {
        return vec![NO_IMAGE.into()];
    };

    let mut replies = Vec::with_capacity(2);
    if let Err(e) = detect_and_store(state, message, image, &mut replies).await {
        error!(error = ?e, "pic_save failed");
        replies.push(SAVE_FAILED.into());
    }
    replies
}

async fn detect_and_store(
    state: &AppState,
    message: &InboundMessage,
    image: &[u8],
    replies: &mut Vec<String>,
) -> anyhow::Result<()> {
    match state.decoder.decode(image).await.context("decode barcode")? {
        Some(barcode) => {
            info!(%barcode, "barcode detected");
            replies.push(describe_barcode(state, message, &barcode).await?);
        }
        None => replies.push(NO_BARCODE.into()),
    }

    let content_type = sniff_content_type(image);
    let key = format!(
        "photo_{}_{}.{}",
        message.message_id.unwrap_or_default(),
        OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000,
        ext_from_mime(content_type).unwrap_or("jpg")
    );
    let location = state
        .images
        .put_object(&key, Bytes::copy_from_slice(image), content_type)
        .await
        .with_context(|| format!("put_object {key}"))?;

    info!(%location, "image saved");
    replies.push(format!("Saved image to {location}"));
    Ok(())
}

async fn describe_barcode(state: &AppState, message: &InboundMessage, barcode: &str) -> anyhow::Result<String> {
    let product = state
        .catalog
        .get_product(barcode, NAME_FIELDS)
        .await
        .with_context(|| format!("look up {barcode}"))?;
    let Some(product_name) = product.as_ref().and_then(|p| p.display_name()).map(str::to_string) else {
        return Ok(format!("Detected barcode: {barcode}, but product was not found."));
    };

    state
        .products
        .save_product(&SavedProduct {
            product_id: barcode.to_string(),
            product_name: product_name.clone(),
            author: message.author(),
            date: OffsetDateTime::now_utc(),
        })
        .await?;

    Ok(format!("Detected barcode: {barcode}\nProduct: {product_name}"))
}

fn sniff_content_type(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xff, 0xd8, 0xff, ..] => "image/jpeg",
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "application/octet-stream",
    }
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}
